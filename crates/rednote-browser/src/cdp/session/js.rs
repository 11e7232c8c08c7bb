//! JavaScript execution for CDP page session.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;

impl PageSession {
    /// Evaluate a JavaScript expression, awaiting promises, returning by value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Resolve once the document saw no mutation for `quiescence`.
    ///
    /// The in-page promise resolves at `timeout` on its own; the outer
    /// tokio timeout only covers a page that stops answering.
    pub async fn wait_dom_stable(
        &self,
        timeout: Duration,
        quiescence: Duration,
    ) -> Result<bool, CdpError> {
        let script = stability_script(timeout, quiescence);
        let grace = timeout + Duration::from_secs(2);
        let value = tokio::time::timeout(grace, self.evaluate(&script))
            .await
            .map_err(|_| CdpError::Timeout("stability wait".to_string()))??;
        let settled = value.as_bool().unwrap_or(false);
        debug!("Stability wait finished, settled={}", settled);
        Ok(settled)
    }
}

/// Build the MutationObserver promise used by [`PageSession::wait_dom_stable`].
pub(super) fn stability_script(timeout: Duration, quiescence: Duration) -> String {
    format!(
        r#"new Promise((resolve) => {{
  const quiet = {quiet};
  const deadline = Date.now() + {timeout};
  let last = Date.now();
  const root = document.documentElement || document;
  const observer = new MutationObserver(() => {{ last = Date.now(); }});
  observer.observe(root, {{ subtree: true, childList: true, attributes: true, characterData: true }});
  const tick = () => {{
    const now = Date.now();
    const settled = now - last >= quiet;
    if (settled || now >= deadline) {{
      observer.disconnect();
      resolve(settled);
      return;
    }}
    setTimeout(tick, 100);
  }};
  setTimeout(tick, 100);
}})"#,
        quiet = quiescence.as_millis(),
        timeout = timeout.as_millis(),
    )
}
