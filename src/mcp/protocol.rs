//! JSON-RPC 2.0 message types for MCP protocol.
//!
//! # Message Types
//!
//! - **Request**: expects a response (has `id`)
//! - **Notification**: one-way (no `id`, never answered)
//! - **Response** / **Error**: the server's reply to a request
//!
//! Request IDs are strings or integers, never `null`.
//!
//! # Error Codes
//!
//! Besides the standard JSON-RPC codes, failed capability invocations use:
//!
//! | Code     | Meaning                           |
//! |----------|-----------------------------------|
//! | `-32002` | unknown resource, tool or prompt  |
//! | `-32003` | catalog data unavailable          |
//! | `-32004` | product or inventory record missing |
//!
//! Validation failures use the standard `-32602` (invalid params).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorKind;
use crate::mcp::envelope::ErrorDescriptor;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "mcp-beproduct";

const JSONRPC_VERSION: &str = "2.0";

/// Code for an unknown resource URI, tool name or prompt name.
pub const CAPABILITY_NOT_FOUND: i32 = -32002;
/// Code for a catalog backend that cannot serve the request.
pub const DATA_UNAVAILABLE: i32 = -32003;
/// Code for a product or inventory record that does not exist.
pub const ENTITY_NOT_FOUND: i32 = -32004;

/// A JSON-RPC 2.0 request ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// String request ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// An incoming request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Request identifier, echoed in the reply.
    pub id: RequestId,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// An incoming notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    /// Notification name.
    pub method: String,
    /// Notification parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// A parsed incoming message.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// A request expecting a response.
    Request(JsonRpcRequest),
    /// A notification (no response expected).
    Notification(JsonRpcNotification),
}

/// A successful JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,
    /// The request ID this response corresponds to.
    pub id: RequestId,
    /// The result of the method call.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// JSON-RPC error codes used by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received.
    ParseError,
    /// The JSON is not a valid request object, or the session is in the
    /// wrong state for it.
    InvalidRequest,
    /// The method does not exist.
    MethodNotFound,
    /// Invalid method parameters or capability arguments.
    InvalidParams,
    /// Internal server error.
    InternalError,
    /// Unknown capability key.
    CapabilityNotFound,
    /// Catalog backend failure.
    DataUnavailable,
    /// Missing product or inventory record.
    EntityNotFound,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::CapabilityNotFound => CAPABILITY_NOT_FOUND,
            Self::DataUnavailable => DATA_UNAVAILABLE,
            Self::EntityNotFound => ENTITY_NOT_FOUND,
        }
    }

    /// Returns the code used to report a failed capability invocation.
    ///
    /// Duplicate registration never happens at request time; it maps to an
    /// internal error.
    #[must_use]
    pub const fn for_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::CapabilityNotFound => Self::CapabilityNotFound,
            ErrorKind::ValidationError => Self::InvalidParams,
            ErrorKind::NotFound => Self::EntityNotFound,
            ErrorKind::DataUnavailable => Self::DataUnavailable,
            ErrorKind::DuplicateCapability => Self::InternalError,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorData {
    /// The error code.
    pub code: i32,
    /// A short description of the error.
    pub message: String,
    /// Structured detail, set for failed capability invocations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorData {
    /// Creates an error with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Always "2.0".
    pub jsonrpc: &'static str,
    /// The request ID, when it could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// The error details.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// Creates a new error response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JsonRpcErrorData contains String
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }

    /// The line was not valid JSON.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::new(
            None,
            JsonRpcErrorData::with_message(ErrorCode::ParseError, "Parse error"),
        )
    }

    /// The message is not a valid JSON-RPC 2.0 request or notification.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>, reason: &str) -> Self {
        Self::new(
            id,
            JsonRpcErrorData::with_message(
                ErrorCode::InvalidRequest,
                format!("Invalid Request: {reason}"),
            ),
        )
    }

    /// Creates a method not found error response.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::with_message(
                ErrorCode::MethodNotFound,
                format!("Method not found: {method}"),
            ),
        )
    }

    /// Creates an invalid params error response.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::with_message(ErrorCode::InvalidParams, message),
        )
    }

    /// Creates an error response for a failed resource read or prompt request.
    ///
    /// The error kind and offending parameter travel in `data`.
    #[must_use]
    pub fn invocation_failed(id: RequestId, failure: &ErrorDescriptor) -> Self {
        let mut error =
            JsonRpcErrorData::with_message(ErrorCode::for_kind(failure.kind), &failure.message);
        error.data = serde_json::to_value(failure).ok();
        Self::new(Some(id), error)
    }

    /// Creates an internal error response.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::with_message(ErrorCode::InternalError, message),
        )
    }
}

/// Parses one line of input into an incoming message.
///
/// A message with an `id` member is a request, anything else a notification.
///
/// # Errors
///
/// Returns a parse error for malformed JSON and an invalid-request error for
/// JSON that is not a JSON-RPC 2.0 message.
pub fn parse_message(line: &str) -> Result<IncomingMessage, JsonRpcError> {
    let value: Value = serde_json::from_str(line).map_err(|_| JsonRpcError::parse_error())?;

    let Value::Object(ref fields) = value else {
        return Err(JsonRpcError::invalid_request(
            None,
            "message must be a JSON object",
        ));
    };

    if fields.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(JsonRpcError::invalid_request(
            readable_id(fields),
            "jsonrpc field must be \"2.0\"",
        ));
    }

    if !fields.contains_key("id") {
        return serde_json::from_value(value)
            .map(IncomingMessage::Notification)
            .map_err(|e| JsonRpcError::invalid_request(None, &e.to_string()));
    }

    let id = readable_id(fields);
    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|e| JsonRpcError::invalid_request(id, &e.to_string()))?;

    if request.method.is_empty() {
        return Err(JsonRpcError::invalid_request(
            Some(request.id),
            "method field cannot be empty",
        ));
    }

    Ok(IncomingMessage::Request(request))
}

/// Returns the message's `id`, if it is a valid request ID.
fn readable_id(fields: &serde_json::Map<String, Value>) -> Option<RequestId> {
    fields
        .get("id")
        .and_then(|id| RequestId::deserialize(id).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(line: &str) -> JsonRpcRequest {
        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => req,
            other => panic!("expected request, got {other:?}"),
        }
    }

    fn rejection(line: &str) -> JsonRpcError {
        match parse_message(line) {
            Err(err) => err,
            Ok(msg) => panic!("expected rejection, got {msg:?}"),
        }
    }

    #[test]
    fn parses_tool_call_request() {
        let req = request(
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"check_inventory","arguments":{"product_id":"AAG001"}}}"#,
        );
        assert_eq!(req.id, RequestId::Number(3));
        assert_eq!(req.method, "tools/call");
        assert_eq!(req.params.unwrap()["arguments"]["product_id"], "AAG001");
    }

    #[test]
    fn parses_string_id() {
        let req = request(r#"{"jsonrpc":"2.0","id":"inv-7","method":"ping"}"#);
        assert_eq!(req.id, RequestId::String("inv-7".to_string()));
        assert!(req.params.is_none());
    }

    #[test]
    fn message_without_id_is_notification() {
        let msg = parse_message(
            r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":3}}"#,
        )
        .unwrap();
        let IncomingMessage::Notification(notif) = msg else {
            panic!("expected notification");
        };
        assert_eq!(notif.method, "notifications/cancelled");
        assert_eq!(notif.params.unwrap()["requestId"], 3);
    }

    #[test]
    fn malformed_json_has_no_id() {
        for line in ["{\"jsonrpc\":", "not json", ""] {
            let err = rejection(line);
            assert_eq!(err.error.code, ErrorCode::ParseError.code(), "{line}");
            assert!(err.id.is_none());
        }
    }

    #[test]
    fn non_object_json_is_invalid_request() {
        for line in ["[1, 2]", "\"text\"", "42"] {
            let err = rejection(line);
            assert_eq!(err.error.code, ErrorCode::InvalidRequest.code(), "{line}");
            assert!(err.id.is_none());
        }
    }

    #[test]
    fn wrong_or_missing_version_is_invalid_request() {
        for line in [
            r#"{"id":1,"method":"ping"}"#,
            r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#,
        ] {
            let err = rejection(line);
            assert_eq!(err.error.code, ErrorCode::InvalidRequest.code());
            assert_eq!(err.id, Some(RequestId::Number(1)));
        }
    }

    #[test]
    fn malformed_request_keeps_its_id() {
        let err = rejection(r#"{"jsonrpc":"2.0","id":"req-9"}"#);
        assert_eq!(err.error.code, ErrorCode::InvalidRequest.code());
        assert_eq!(err.id, Some(RequestId::String("req-9".to_string())));

        let err = rejection(r#"{"jsonrpc":"2.0","id":5,"method":42}"#);
        assert_eq!(err.id, Some(RequestId::Number(5)));
    }

    #[test]
    fn null_id_and_empty_method_are_invalid() {
        let err = rejection(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#);
        assert_eq!(err.error.code, ErrorCode::InvalidRequest.code());

        let err = rejection(r#"{"jsonrpc":"2.0","id":4,"method":""}"#);
        assert_eq!(err.id, Some(RequestId::Number(4)));
    }

    #[test]
    fn error_response_omits_unknown_id() {
        let json = serde_json::to_value(JsonRpcError::parse_error()).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["error"]["code"], -32700);
        assert!(json.get("id").is_none());
        assert!(json["error"].get("data").is_none());
    }

    #[test]
    fn invocation_failure_carries_descriptor() {
        let failure = ErrorDescriptor {
            kind: ErrorKind::NotFound,
            message: "product not found: AAG404".to_string(),
            parameter: None,
        };
        let error = JsonRpcError::invocation_failed(RequestId::Number(7), &failure);
        assert_eq!(error.error.code, ENTITY_NOT_FOUND);
        assert_eq!(error.error.message, "product not found: AAG404");
        assert_eq!(
            error.error.data,
            Some(serde_json::json!({
                "error": "NotFound",
                "message": "product not found: AAG404",
            }))
        );
    }

    #[test]
    fn error_codes_for_kinds() {
        assert_eq!(ErrorCode::for_kind(ErrorKind::ValidationError).code(), -32602);
        assert_eq!(
            ErrorCode::for_kind(ErrorKind::CapabilityNotFound).code(),
            CAPABILITY_NOT_FOUND
        );
        assert_eq!(
            ErrorCode::for_kind(ErrorKind::DataUnavailable).code(),
            DATA_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::for_kind(ErrorKind::DuplicateCapability).code(),
            -32603
        );
    }
}
