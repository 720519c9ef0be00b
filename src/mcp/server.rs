//! MCP server session for the product catalog.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Resource reads, tool calls and prompt requests
//! 3. **Shutdown**: EOF on the transport or SIGINT/SIGTERM
//!
//! Every capability request goes through the [`Router`]; failed invocations
//! are answered with structured errors and the session carries on.

use std::io;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};

use crate::mcp::envelope::{
    to_json_text, InvocationResponse, Payload, PromptDefinition, ReadResourceResult,
    ResourceDefinition, ToolCallResult, ToolDefinition,
};
use crate::mcp::protocol::{
    parse_message, ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION,
    SERVER_NAME,
};
use crate::mcp::registry::CapabilityKind;
use crate::mcp::router::Router;
use crate::mcp::transport::{StdioTransport, Transport};

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    /// Resource-related capabilities.
    pub resources: ResourceCapabilities,
    /// Tool-related capabilities.
    pub tools: ListCapabilities,
    /// Prompt-related capabilities.
    pub prompts: ListCapabilities,
}

/// Resource-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCapabilities {
    /// Whether clients may subscribe to resource updates.
    pub subscribe: bool,
    /// Whether the resource list can change during the session.
    pub list_changed: bool,
}

/// Capabilities of a listable collection (tools, prompts).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCapabilities {
    /// Whether the list can change during the session.
    pub list_changed: bool,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Parameters for `resources/read`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadResourceParams {
    /// URI of the resource to read.
    pub uri: String,
}

/// Parameters for `tools/call` and `prompts/get`.
#[derive(Debug, Clone, Deserialize)]
pub struct InvokeParams {
    /// Name of the tool or prompt.
    pub name: String,
    /// Arguments for the invocation.
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// A message to send back to the client.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A success response.
    Response(JsonRpcResponse),
    /// An error response.
    Error(JsonRpcError),
}

impl From<Result<JsonRpcResponse, JsonRpcError>> for Reply {
    fn from(result: Result<JsonRpcResponse, JsonRpcError>) -> Self {
        match result {
            Ok(response) => Self::Response(response),
            Err(error) => Self::Error(error),
        }
    }
}

/// The MCP server session.
pub struct McpServer<R = BufReader<tokio::io::Stdin>, W = tokio::io::Stdout> {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: Transport<R, W>,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    /// Capability router.
    router: Router,
}

impl McpServer {
    /// Creates a server that talks over stdin/stdout.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self::with_transport(router, StdioTransport::stdio())
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server over an arbitrary transport.
    #[must_use]
    pub const fn with_transport(router: Router, transport: Transport<R, W>) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport,
            protocol_version: None,
            router,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Consumes the server, returning its transport.
    pub fn into_transport(self) -> Transport<R, W> {
        self.transport
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Serves requests until the transport reaches EOF, without installing
    /// signal handlers.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve(&mut self) -> io::Result<()> {
        loop {
            let line_result = self.transport.read_line().await;
            if self.handle_transport_result(line_result).await? {
                return Ok(());
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: io::Result<Option<String>>,
    ) -> io::Result<bool> {
        let Some(line) = line_result? else {
            tracing::info!("Transport closed");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        if let Some(reply) = self.handle_line(&line) {
            match reply {
                Reply::Response(response) => self.transport.write_response(&response).await?,
                Reply::Error(error) => self.transport.write_error(&error).await?,
            }
        }

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles a single line of input, returning the reply to send (if any).
    pub fn handle_line(&mut self, line: &str) -> Option<Reply> {
        match parse_message(line) {
            Ok(msg) => self.handle_message(msg),
            Err(error) => {
                tracing::warn!(code = error.error.code, "Rejected malformed message");
                Some(Reply::Error(error))
            }
        }
    }

    /// Handles a parsed incoming message.
    pub fn handle_message(&mut self, msg: IncomingMessage) -> Option<Reply> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(&req)),
            IncomingMessage::Notification(ref notif) => {
                self.handle_notification(notif);
                None
            }
        }
    }

    /// Handles an incoming request.
    fn handle_request(&mut self, req: &JsonRpcRequest) -> Reply {
        tracing::debug!(id = %req.id, method = %req.method, "Handling request");

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(req),
            "ping" => Ok(Self::handle_ping(req)),
            "resources/list" => self.handle_list(req, CapabilityKind::Resource),
            "resources/templates/list" => self.handle_resource_templates_list(req),
            "resources/read" => self.handle_resources_read(req),
            "tools/list" => self.handle_list(req, CapabilityKind::Tool),
            "tools/call" => self.handle_tools_call(req),
            "prompts/list" => self.handle_list(req, CapabilityKind::Prompt),
            "prompts/get" => self.handle_prompts_get(req),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        response.into()
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" if self.state == ServerState::Initialising => {
                tracing::info!("Client initialised, session running");
                self.state = ServerState::Running;
            }
            "notifications/cancelled" => {
                tracing::debug!(params = ?notif.params, "Request cancelled by client");
            }
            other => {
                tracing::debug!(method = other, "Ignoring notification");
            }
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::new(
                Some(req.id.clone()),
                JsonRpcErrorData::with_message(
                    ErrorCode::InvalidRequest,
                    "Server already initialised",
                ),
            ));
        }

        let params: InitializeParams = parse_params(req, "initialize")?;

        if let Some(ref client) = params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                requested_version = %params.protocol_version,
                "Initialising session"
            );
        }

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();

        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Handles `resources/list`, `tools/list` and `prompts/list`.
    fn handle_list(
        &self,
        req: &JsonRpcRequest,
        kind: CapabilityKind,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let descriptors = self.router.registry().descriptors(kind);
        let result = match kind {
            CapabilityKind::Resource => json!({
                "resources": descriptors.map(ResourceDefinition::from).collect::<Vec<_>>(),
            }),
            CapabilityKind::Tool => json!({
                "tools": descriptors.map(ToolDefinition::from).collect::<Vec<_>>(),
            }),
            CapabilityKind::Prompt => json!({
                "prompts": descriptors.map(PromptDefinition::from).collect::<Vec<_>>(),
            }),
        };

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles `resources/templates/list`. No templated resources are exposed.
    fn handle_resource_templates_list(
        &self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;
        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({ "resourceTemplates": [] }),
        ))
    }

    /// Handles `resources/read`.
    fn handle_resources_read(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;
        let params: ReadResourceParams = parse_params(req, "resource read")?;

        match self.router.dispatch(CapabilityKind::Resource, &params.uri, None) {
            InvocationResponse::Success(Payload::Resource(contents)) => {
                let result = ReadResourceResult {
                    contents: vec![contents],
                };
                success(&req.id, &result)
            }
            InvocationResponse::Success(_) => Err(mismatched_payload(&req.id)),
            InvocationResponse::Failure(failure) => {
                Err(JsonRpcError::invocation_failed(req.id.clone(), &failure))
            }
        }
    }

    /// Handles `tools/call`.
    ///
    /// Tool failures are reported inside the result with `isError: true`, as
    /// MCP expects, rather than as JSON-RPC errors.
    fn handle_tools_call(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;
        let params: InvokeParams = parse_params(req, "tool call")?;

        let result = match self.router.dispatch(
            CapabilityKind::Tool,
            &params.name,
            params.arguments.as_ref(),
        ) {
            InvocationResponse::Success(Payload::Tool(result)) => result,
            InvocationResponse::Success(_) => return Err(mismatched_payload(&req.id)),
            InvocationResponse::Failure(failure) => {
                ToolCallResult::error(to_json_text(&failure).unwrap_or(failure.message))
            }
        };

        success(&req.id, &result)
    }

    /// Handles `prompts/get`.
    fn handle_prompts_get(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;
        let params: InvokeParams = parse_params(req, "prompt")?;

        match self.router.dispatch(
            CapabilityKind::Prompt,
            &params.name,
            params.arguments.as_ref(),
        ) {
            InvocationResponse::Success(Payload::Prompt(result)) => success(&req.id, &result),
            InvocationResponse::Success(_) => Err(mismatched_payload(&req.id)),
            InvocationResponse::Failure(failure) => {
                Err(JsonRpcError::invocation_failed(req.id.clone(), &failure))
            }
        }
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::new(
                Some(id.clone()),
                JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, "Server not initialised"),
            ));
        }
        Ok(())
    }
}

/// Deserialises the request's params.
fn parse_params<T: DeserializeOwned>(req: &JsonRpcRequest, what: &str) -> Result<T, JsonRpcError> {
    req.params
        .as_ref()
        .map(|p| serde_json::from_value(p.clone()))
        .transpose()
        .map_err(|e| JsonRpcError::invalid_params(req.id.clone(), format!("Invalid {what} params: {e}")))?
        .ok_or_else(|| JsonRpcError::invalid_params(req.id.clone(), format!("Missing {what} params")))
}

/// Serialises `result` into a success response.
fn success<T: Serialize>(id: &RequestId, result: &T) -> Result<JsonRpcResponse, JsonRpcError> {
    let value = serde_json::to_value(result).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialise result");
        JsonRpcError::internal_error(id.clone(), "Internal error: failed to serialise result")
    })?;
    Ok(JsonRpcResponse::success(id.clone(), value))
}

fn mismatched_payload(id: &RequestId) -> JsonRpcError {
    tracing::error!(%id, "Handler returned a payload of the wrong kind");
    JsonRpcError::internal_error(id.clone(), "Internal error: unexpected handler output")
}
