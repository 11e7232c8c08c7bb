//! Page navigation and the load wait.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const READY_POLL: Duration = Duration::from_millis(100);

impl PageSession {
    /// Open `url` in this tab and wait until the document is usable.
    pub async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        let reply = self.call("Page.navigate", Some(json!({"url": url}))).await?;
        if let Some(reason) = reply.get("errorText").and_then(|e| e.as_str()) {
            return Err(CdpError::NavigationFailed(format!("{url}: {reason}")));
        }
        self.wait_for_load().await?;
        debug!("Loaded {}", url);
        Ok(())
    }

    /// Wait for `document.readyState` to leave `loading`. Evaluation errors
    /// while the old document is torn down are retried.
    pub async fn wait_for_load(&self) -> Result<(), CdpError> {
        let ready = async {
            loop {
                let state = self.evaluate("document.readyState").await.ok();
                if matches!(state.as_ref().and_then(|v| v.as_str()), Some("interactive" | "complete")) {
                    return;
                }
                tokio::time::sleep(READY_POLL).await;
            }
        };
        tokio::time::timeout(LOAD_TIMEOUT, ready)
            .await
            .map_err(|_| CdpError::Timeout(format!("page not loaded after {}s", LOAD_TIMEOUT.as_secs())))
    }

    pub async fn get_url(&self) -> Result<String, CdpError> {
        let href = self.evaluate("location.href").await?;
        Ok(href.as_str().map(str::to_owned).unwrap_or_default())
    }
}
