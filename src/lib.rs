//! mcp-beproduct: MCP server for an apparel product catalog and inventory
//!
//! This library exposes catalog data to AI assistants through the Model
//! Context Protocol.
//!
//! # Architecture
//!
//! Capabilities are registered once at startup and dispatched by key:
//!
//! - **Resources**: `product://catalog`, `product://inventory`
//! - **Tools**: `search_products`, `check_inventory`, `update_product`
//! - **Prompts**: `product_analysis`, `inventory_report`
//!
//! Arguments are checked against each capability's declared parameters
//! before its handler runs, and every failure becomes a structured error
//! response rather than ending the session.
//!
//! # Modules
//!
//! - [`catalog`]: Product and inventory data access
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types
//! - [`handlers`]: Resource, tool and prompt adapters
//! - [`mcp`]: MCP protocol implementation

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mcp;
