//! Application state.

use std::sync::Arc;

use crate::mcp::{build_server, McpServer, RegistryError};
use crate::service::XhsService;

/// State shared by the REST handlers and the MCP endpoint.
pub struct AppState {
    pub service: Arc<XhsService>,
    pub mcp: Arc<McpServer>,
}

impl AppState {
    pub fn new(service: Arc<XhsService>) -> Result<Self, RegistryError> {
        let mcp = Arc::new(build_server(service.clone())?);
        Ok(Self { service, mcp })
    }
}
