//! Model Context Protocol surface.
//!
//! A stateless JSON-RPC 2.0 endpoint: every POST carries one request or a
//! batch, and the reply is written straight back in the HTTP response.

pub mod protocol;
pub mod registry;
pub mod server;
pub mod tools;

use std::sync::Arc;

use crate::service::XhsService;

pub use protocol::{McpError, McpRequest, McpResponse, McpToolResult, RequestId};
pub use registry::{RegistryError, ToolRegistry};
pub use server::McpServer;

/// Build an MCP server exposing every tool over `service`.
pub fn build_server(service: Arc<XhsService>) -> Result<McpServer, RegistryError> {
    let registry = ToolRegistry::default();
    tools::register_all(&registry, service)?;
    Ok(McpServer::new(registry))
}
