//! # rednote-api
//!
//! The external surfaces of rednote-mcp:
//! - **REST**: `/api/v1/...` endpoints wrapped in `{success, data, message}`
//! - **MCP**: a JSON-RPC 2.0 endpoint at `/mcp` exposing the same operations
//!   as tools
//!
//! Both sit on one [`XhsService`], which opens a browser page per operation
//! and releases it before returning.

pub mod error;
pub mod http;
pub mod mcp;
pub mod server;
pub mod service;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ApiError, ErrorResponse, SuccessResponse};
pub use http::routes::create_router;
pub use mcp::{build_server, McpServer, ToolRegistry};
pub use server::ApiServer;
pub use service::{BrowserPages, PageProvider, ServiceError, ServiceSettings, XhsService};
pub use state::AppState;
