//! Errors raised at the page boundary.

use thiserror::Error;

/// Failure of a single page operation.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Page operation timed out: {0}")]
    Timeout(String),

    #[error("Page closed")]
    Closed,

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl PageError {
    /// Whether the error means the page can no longer be driven.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PageError::Closed)
    }
}
