//! Response envelopes for resources, tools and prompts.
//!
//! Handlers return a [`Payload`]; the router wraps it (or a failure) in an
//! [`InvocationResponse`]. The listing types render registry descriptors for
//! `resources/list`, `tools/list` and `prompts/list`.

use serde::Serialize;
use serde_json::Value;

use crate::error::{CapabilityError, CapabilityResult, ErrorKind};
use crate::mcp::registry::CapabilityDescriptor;
use crate::mcp::schema::input_schema;

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Serialises `value` as pretty-printed JSON text content.
///
/// # Errors
///
/// Returns [`CapabilityError::DataUnavailable`] if the value cannot be encoded.
pub fn to_json_text<T: Serialize + ?Sized>(value: &T) -> CapabilityResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialise response payload");
        CapabilityError::DataUnavailable {
            message: format!("failed to encode response: {e}"),
        }
    })
}

// === Listings ===

/// A resource entry for the `resources/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    /// Resource URI.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// Description.
    pub description: String,
    /// MIME type of the contents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl From<&CapabilityDescriptor> for ResourceDefinition {
    fn from(d: &CapabilityDescriptor) -> Self {
        Self {
            uri: d.key.clone(),
            name: d.name.clone(),
            description: d.description.clone(),
            mime_type: d.mime_type.clone(),
        }
    }
}

/// A tool definition for the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

impl From<&CapabilityDescriptor> for ToolDefinition {
    fn from(d: &CapabilityDescriptor) -> Self {
        Self {
            name: d.key.clone(),
            description: Some(d.description.clone()).filter(|s| !s.is_empty()),
            input_schema: input_schema(&d.params),
        }
    }
}

/// A prompt argument in the `prompts/list` response.
#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    /// Argument name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Whether the argument must be supplied.
    pub required: bool,
}

/// A prompt entry for the `prompts/list` response.
#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    /// Prompt name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Declared arguments.
    pub arguments: Vec<PromptArgument>,
}

impl From<&CapabilityDescriptor> for PromptDefinition {
    fn from(d: &CapabilityDescriptor) -> Self {
        Self {
            name: d.key.clone(),
            description: d.description.clone(),
            arguments: d
                .params
                .iter()
                .map(|p| PromptArgument {
                    name: p.name.clone(),
                    description: p.description.clone(),
                    required: p.required,
                })
                .collect(),
        }
    }
}

// === Results ===

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates a successful result holding `value` as JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialised.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> CapabilityResult<Self> {
        to_json_text(value).map(Self::text)
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Returns the concatenated text of all content items.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect()
    }
}

/// One item of a `resources/read` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    /// The URI that was read.
    pub uri: String,
    /// MIME type of `text`.
    pub mime_type: String,
    /// The resource body.
    pub text: String,
}

/// The `resources/read` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadResourceResult {
    /// Contents of the resource.
    pub contents: Vec<ResourceContents>,
}

/// Speaker of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    User,
}

/// Content of a prompt message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// A message in a generated prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    /// Speaker.
    pub role: Role,
    /// Message body.
    pub content: PromptContent,
}

/// The `prompts/get` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptResult {
    /// Short description of what was generated.
    pub description: String,
    /// The generated messages.
    pub messages: Vec<PromptMessage>,
}

impl PromptResult {
    /// Creates a result with a single user message.
    #[must_use]
    pub fn user_text(description: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            messages: vec![PromptMessage {
                role: Role::User,
                content: PromptContent::Text { text: text.into() },
            }],
        }
    }
}

/// Successful output of a capability handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Resource contents.
    Resource(ResourceContents),
    /// Tool result.
    Tool(ToolCallResult),
    /// Generated prompt.
    Prompt(PromptResult),
}

/// Kind and message of a failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    /// Error kind.
    #[serde(rename = "error")]
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Offending parameter, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl From<&CapabilityError> for ErrorDescriptor {
    fn from(err: &CapabilityError) -> Self {
        let parameter = match err {
            CapabilityError::ValidationError { parameter, .. } => Some(parameter.clone()),
            _ => None,
        };
        Self {
            kind: err.kind(),
            message: err.to_string(),
            parameter,
        }
    }
}

/// Outcome of routing one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationResponse {
    /// The handler succeeded.
    Success(Payload),
    /// Resolution, validation or the handler failed.
    Failure(ErrorDescriptor),
}

impl InvocationResponse {
    /// Returns `true` for [`InvocationResponse::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the error kind of a failure.
    #[must_use]
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err.kind),
        }
    }
}
