//! Convenience helpers layered over [`Page`].

use std::time::Duration;

use async_trait::async_trait;
use rednote_protocols::{Page, PageError};
use serde_json::Value;
use tracing::debug;

/// Evaluation helpers that swallow failures into neutral values.
///
/// Heuristic probes (is this tab active, did the click land) treat a failed
/// evaluation the same as a negative answer.
#[async_trait]
pub trait PageExt: Page {
    /// Evaluate `script` and read a boolean; failures read as `false`.
    async fn eval_bool(&self, script: &str) -> bool {
        match self.evaluate(script).await {
            Ok(Value::Bool(b)) => b,
            Ok(_) => false,
            Err(e) => {
                debug!("eval_bool failed: {}", e);
                false
            }
        }
    }

    /// Evaluate `script` and read a string; failures read as empty.
    async fn eval_string(&self, script: &str) -> String {
        match self.evaluate(script).await {
            Ok(Value::String(s)) => s,
            Ok(Value::Null) => String::new(),
            Ok(other) => other.to_string(),
            Err(e) => {
                debug!("eval_string failed: {}", e);
                String::new()
            }
        }
    }

    /// Find and click the first element matching `selector`.
    ///
    /// Returns `Ok(false)` when nothing matches.
    async fn click_selector(&self, selector: &str) -> Result<bool, PageError> {
        match self.find(selector).await? {
            Some(element) => {
                self.click(&element).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Poll for `selector` until it appears or `timeout` elapses.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool, PageError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.find(selector).await?.is_some() {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    /// Scroll the window by `max(innerHeight * factor, min_px)`.
    async fn scroll_window(&self, factor: f64, min_px: u32) -> bool {
        self.eval_bool(&format!(
            "(() => {{ window.scrollBy(0, Math.max(window.innerHeight * {factor}, {min_px})); return true; }})()"
        ))
        .await
    }
}

impl<P: Page + ?Sized> PageExt for P {}

/// Quote `s` as a JavaScript string literal.
pub(crate) fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}
