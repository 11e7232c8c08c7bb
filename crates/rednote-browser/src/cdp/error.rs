//! Errors from the DevTools connection and page commands.

use rednote_protocols::PageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Nothing answered `/json/version` on the debug port.
    #[error("Chrome not available at {0}; is it running with --remote-debugging-port?")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Chrome rejected a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<CdpError> for PageError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::NavigationFailed(msg) => PageError::Navigation(msg),
            CdpError::ElementNotFound(msg) => PageError::ElementNotFound(msg),
            CdpError::JavaScript(msg) => PageError::Evaluation(msg),
            CdpError::Timeout(msg) => PageError::Timeout(msg),
            CdpError::SessionClosed | CdpError::WebSocket(_) => PageError::Closed,
            other => PageError::Protocol(other.to_string()),
        }
    }
}
