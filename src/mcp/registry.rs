//! Capability registry.
//!
//! Holds the declared resources, tools and prompts together with their
//! handlers. The registry is filled once at startup and then shared read-only
//! behind an `Arc`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{CapabilityError, CapabilityResult};
use crate::mcp::envelope::Payload;
use crate::mcp::schema::{Arguments, ParamSpec};

/// The three kinds of capability an MCP server can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// Read-only data addressed by URI.
    Resource,
    /// Callable operation with parameters.
    Tool,
    /// Generated prompt text.
    Prompt,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resource => "resource",
            Self::Tool => "tool",
            Self::Prompt => "prompt",
        })
    }
}

/// Static description of one capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityDescriptor {
    /// Capability kind.
    pub kind: CapabilityKind,
    /// Lookup key: resource URI, tool name or prompt name.
    pub key: String,
    /// Display name (resources carry a separate human-readable name).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// MIME type of resource contents.
    pub mime_type: Option<String>,
    /// Ordered parameter schema.
    pub params: Vec<ParamSpec>,
}

impl CapabilityDescriptor {
    /// Describes a parameterless resource.
    #[must_use]
    pub fn resource(uri: &str, name: &str, description: &str, mime_type: &str) -> Self {
        Self {
            kind: CapabilityKind::Resource,
            key: uri.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            mime_type: Some(mime_type.to_string()),
            params: Vec::new(),
        }
    }

    /// Describes a tool.
    #[must_use]
    pub fn tool(name: &str, description: &str, params: Vec<ParamSpec>) -> Self {
        Self {
            kind: CapabilityKind::Tool,
            key: name.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            mime_type: None,
            params,
        }
    }

    /// Describes a prompt.
    #[must_use]
    pub fn prompt(name: &str, description: &str, params: Vec<ParamSpec>) -> Self {
        Self {
            kind: CapabilityKind::Prompt,
            key: name.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            mime_type: None,
            params,
        }
    }
}

/// Executes a capability once its arguments have been validated.
pub trait CapabilityHandler: Send + Sync {
    /// Runs the capability.
    ///
    /// # Errors
    ///
    /// Returns any [`CapabilityError`]; the router turns it into an error
    /// response.
    fn invoke(&self, args: &Arguments) -> CapabilityResult<Payload>;
}

impl<F> CapabilityHandler for F
where
    F: Fn(&Arguments) -> CapabilityResult<Payload> + Send + Sync,
{
    fn invoke(&self, args: &Arguments) -> CapabilityResult<Payload> {
        self(args)
    }
}

/// A descriptor bound to its handler.
#[derive(Clone)]
pub struct Registered {
    /// The capability's description and schema.
    pub descriptor: CapabilityDescriptor,
    /// The bound handler.
    pub handler: Arc<dyn CapabilityHandler>,
}

impl fmt::Debug for Registered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registered")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Registry of capabilities, one table per kind, in registration order.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    resources: IndexMap<String, Registered>,
    tools: IndexMap<String, Registered>,
    prompts: IndexMap<String, Registered>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn table(&self, kind: CapabilityKind) -> &IndexMap<String, Registered> {
        match kind {
            CapabilityKind::Resource => &self.resources,
            CapabilityKind::Tool => &self.tools,
            CapabilityKind::Prompt => &self.prompts,
        }
    }

    fn table_mut(&mut self, kind: CapabilityKind) -> &mut IndexMap<String, Registered> {
        match kind {
            CapabilityKind::Resource => &mut self.resources,
            CapabilityKind::Tool => &mut self.tools,
            CapabilityKind::Prompt => &mut self.prompts,
        }
    }

    /// Registers a capability under its descriptor's kind and key.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::DuplicateCapability`] if the key is already
    /// taken for that kind.
    pub fn register(
        &mut self,
        descriptor: CapabilityDescriptor,
        handler: impl CapabilityHandler + 'static,
    ) -> CapabilityResult<()> {
        let kind = descriptor.kind;
        let table = self.table_mut(kind);

        if table.contains_key(&descriptor.key) {
            return Err(CapabilityError::DuplicateCapability {
                kind,
                key: descriptor.key,
            });
        }

        tracing::debug!(%kind, key = %descriptor.key, "Registered capability");
        table.insert(
            descriptor.key.clone(),
            Registered {
                descriptor,
                handler: Arc::new(handler),
            },
        );
        Ok(())
    }

    /// Looks up a capability.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::CapabilityNotFound`] if nothing is
    /// registered under `key` for `kind`.
    pub fn resolve(&self, kind: CapabilityKind, key: &str) -> CapabilityResult<&Registered> {
        self.table(kind)
            .get(key)
            .ok_or_else(|| CapabilityError::CapabilityNotFound {
                kind,
                key: key.to_string(),
            })
    }

    /// Returns the descriptors of one kind in registration order.
    pub fn descriptors(&self, kind: CapabilityKind) -> impl Iterator<Item = &CapabilityDescriptor> {
        self.table(kind).values().map(|r| &r.descriptor)
    }

    /// Returns the number of registered capabilities of all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len() + self.tools.len() + self.prompts.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::envelope::ToolCallResult;
    use crate::mcp::schema::ParamType;

    fn echo(args: &Arguments) -> CapabilityResult<Payload> {
        Ok(Payload::Tool(ToolCallResult::text(
            args.get_str("text").unwrap_or_default(),
        )))
    }

    fn echo_descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::tool(
            "echo",
            "Echo the input",
            vec![ParamSpec::required("text", ParamType::String, "Text to echo")],
        )
    }

    #[test]
    fn register_then_resolve_returns_identical_descriptor() {
        let mut registry = CapabilityRegistry::new();
        registry.register(echo_descriptor(), echo).unwrap();

        let entry = registry.resolve(CapabilityKind::Tool, "echo").unwrap();
        assert_eq!(entry.descriptor, echo_descriptor());
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = CapabilityRegistry::new();
        registry.register(echo_descriptor(), echo).unwrap();

        let err = registry.register(echo_descriptor(), echo).unwrap_err();
        assert_eq!(
            err,
            CapabilityError::DuplicateCapability {
                kind: CapabilityKind::Tool,
                key: "echo".to_string(),
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn same_key_different_kind_is_allowed() {
        let mut registry = CapabilityRegistry::new();
        registry.register(echo_descriptor(), echo).unwrap();
        registry
            .register(CapabilityDescriptor::prompt("echo", "Echo prompt", Vec::new()), echo)
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolve_unknown_key() {
        let registry = CapabilityRegistry::new();
        assert!(registry.is_empty());
        let err = registry.resolve(CapabilityKind::Prompt, "missing").unwrap_err();
        assert!(matches!(err, CapabilityError::CapabilityNotFound { .. }));
    }

    #[test]
    fn descriptors_keep_registration_order() {
        let mut registry = CapabilityRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(CapabilityDescriptor::tool(name, "", Vec::new()), echo)
                .unwrap();
        }
        let names: Vec<_> = registry
            .descriptors(CapabilityKind::Tool)
            .map(|d| d.key.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.descriptors(CapabilityKind::Resource).count(), 0);
    }
}
