//! Request routing.
//!
//! [`Router::dispatch`] resolves a capability, validates the arguments against
//! its schema, invokes the handler and wraps the outcome. Failures at any step
//! come back as [`InvocationResponse::Failure`]; dispatch never panics or
//! returns a transport-level error.

use std::sync::Arc;

use serde_json::Value;

use crate::error::CapabilityResult;
use crate::mcp::envelope::{ErrorDescriptor, InvocationResponse, Payload};
use crate::mcp::registry::{CapabilityKind, CapabilityRegistry};
use crate::mcp::schema::validate_arguments;

/// Routes invocations to registered handlers.
///
/// Cloning is cheap; clones share the same read-only registry.
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<CapabilityRegistry>,
}

impl Router {
    /// Creates a router over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Dispatches one invocation.
    pub fn dispatch(&self, kind: CapabilityKind, key: &str, args: Option<&Value>) -> InvocationResponse {
        match self.try_dispatch(kind, key, args) {
            Ok(payload) => {
                tracing::debug!(%kind, key, "Invocation succeeded");
                InvocationResponse::Success(payload)
            }
            Err(err) => {
                tracing::warn!(%kind, key, error = %err, "Invocation failed");
                InvocationResponse::Failure(ErrorDescriptor::from(&err))
            }
        }
    }

    fn try_dispatch(
        &self,
        kind: CapabilityKind,
        key: &str,
        args: Option<&Value>,
    ) -> CapabilityResult<Payload> {
        let entry = self.registry.resolve(kind, key)?;
        let args = validate_arguments(&entry.descriptor.params, args)?;
        entry.handler.invoke(&args)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::error::{CapabilityError, ErrorKind};
    use crate::mcp::envelope::ToolCallResult;
    use crate::mcp::registry::CapabilityDescriptor;
    use crate::mcp::schema::{Arguments, ParamSpec, ParamType};

    fn counting_router(calls: &Arc<AtomicUsize>) -> Router {
        let mut registry = CapabilityRegistry::new();
        let counter = Arc::clone(calls);
        registry
            .register(
                CapabilityDescriptor::tool(
                    "greet",
                    "Greets someone",
                    vec![
                        ParamSpec::required("name", ParamType::String, "Who to greet"),
                        ParamSpec::optional("greeting", ParamType::String, "Greeting word")
                            .with_default(json!("Hello")),
                    ],
                ),
                move |args: &Arguments| -> CapabilityResult<Payload> {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let text = format!(
                        "{}, {}!",
                        args.get_str("greeting").unwrap_or_default(),
                        args.require_str("name")?
                    );
                    Ok(Payload::Tool(ToolCallResult::text(text)))
                },
            )
            .unwrap();
        registry
            .register(
                CapabilityDescriptor::tool("explode", "Always fails", Vec::new()),
                |_: &Arguments| -> CapabilityResult<Payload> {
                    Err(CapabilityError::DataUnavailable {
                        message: "backend down".to_string(),
                    })
                },
            )
            .unwrap();
        Router::new(Arc::new(registry))
    }

    #[test]
    fn dispatch_applies_defaults() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = counting_router(&calls);

        let response = router.dispatch(CapabilityKind::Tool, "greet", Some(&json!({"name": "Ada"})));
        let InvocationResponse::Success(Payload::Tool(result)) = response else {
            panic!("expected tool success");
        };
        assert_eq!(result.text_content(), "Hello, Ada!");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_key_never_invokes_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = counting_router(&calls);

        let response = router.dispatch(CapabilityKind::Tool, "wave", Some(&json!({"name": "Ada"})));
        assert_eq!(response.error_kind(), Some(ErrorKind::CapabilityNotFound));

        // Right key, wrong kind.
        let response = router.dispatch(CapabilityKind::Prompt, "greet", None);
        assert_eq!(response.error_kind(), Some(ErrorKind::CapabilityNotFound));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_required_never_invokes_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = counting_router(&calls);

        let response = router.dispatch(CapabilityKind::Tool, "greet", Some(&json!({})));
        let InvocationResponse::Failure(err) = response else {
            panic!("expected failure");
        };
        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert_eq!(err.parameter.as_deref(), Some("name"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_failure_becomes_error_response() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = counting_router(&calls);

        let response = router.dispatch(CapabilityKind::Tool, "explode", None);
        let InvocationResponse::Failure(err) = response else {
            panic!("expected failure");
        };
        assert_eq!(err.kind, ErrorKind::DataUnavailable);
        assert!(err.message.contains("backend down"));
    }

    #[test]
    fn clones_share_registry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = counting_router(&calls);
        let clone = router.clone();

        assert!(clone
            .dispatch(CapabilityKind::Tool, "greet", Some(&json!({"name": "Bo"})))
            .is_success());
        assert!(std::ptr::eq(router.registry(), clone.registry()));
    }
}
