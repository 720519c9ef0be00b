//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes registered resources, tools and prompts to AI
//! assistants. The server communicates over stdio transport using JSON-RPC
//! 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌──────────────┐     │
//! │   │  Transport  │───▶│   Server    │───▶│    Router    │     │
//! │   │   (stdio)   │    │ (lifecycle) │    │ (validation) │     │
//! │   └─────────────┘    └─────────────┘    └──────────────┘     │
//! │                                                │             │
//! │                                                ▼             │
//! │                      ┌──────────────────────────────────┐    │
//! │                      │ Registry: resources/tools/prompts│    │
//! │                      └──────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod envelope;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod schema;
pub mod server;
pub mod transport;

pub use envelope::{ErrorDescriptor, InvocationResponse, Payload};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use registry::{CapabilityDescriptor, CapabilityHandler, CapabilityKind, CapabilityRegistry};
pub use router::Router;
pub use schema::{Arguments, ParamSpec, ParamType};
pub use server::McpServer;
pub use transport::{StdioTransport, Transport};
