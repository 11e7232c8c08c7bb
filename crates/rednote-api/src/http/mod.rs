//! HTTP interface module.
//!
//! - REST endpoints under `/api/v1`
//! - the MCP endpoint at `/mcp`
//! - `/health`

pub mod handlers;
pub mod routes;
