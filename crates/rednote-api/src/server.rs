//! HTTP server hosting the REST API and the MCP endpoint.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::http::routes::create_router;
use crate::state::AppState;

/// The API server.
pub struct ApiServer {
    addr: String,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(addr: impl Into<String>, state: Arc<AppState>) -> Self {
        Self {
            addr: addr.into(),
            state,
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self.addr.parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("API server listening on http://{}", addr);
        info!("MCP endpoint: http://{}/mcp", addr);
        axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

        info!("API server stopped");
        Ok(())
    }
}
