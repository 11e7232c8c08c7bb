//! Per-call tool context.

use std::time::{Duration, Instant};

/// Who invoked a tool, and a call id for correlating its log lines.
///
/// Cancellation is not signalled through the context: a caller that gives
/// up drops the `execute` future.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Surface the call arrived on, e.g. `mcp`.
    pub caller: String,

    /// Unique per call.
    pub call_id: String,

    started: Instant,
}

impl ToolContext {
    pub fn new(caller: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            call_id: uuid::Uuid::new_v4().to_string(),
            started: Instant::now(),
        }
    }

    /// Replace the generated call id, e.g. with a JSON-RPC request id.
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = call_id.into();
        self
    }

    /// Time since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
