//! The per-tab session handle.

use serde_json::{Value, json};
use tracing::debug;

use crate::cdp::client::Transport;
use crate::cdp::error::CdpError;

/// Domains enabled on every new tab.
const DOMAINS: [&str; 3] = ["Page", "DOM", "Runtime"];

/// One attached tab. Commands go over the shared browser socket tagged with
/// this session's id.
pub struct PageSession {
    target_id: String,
    session_id: String,
    transport: Transport,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, transport: Transport) -> Self {
        Self {
            target_id,
            session_id,
            transport,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport.call(method, params, Some(&self.session_id)).await
    }

    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        for domain in DOMAINS {
            self.call(&format!("{domain}.enable"), None).await?;
        }
        debug!(session = %self.session_id, "Tab domains enabled");
        Ok(())
    }

    /// Pin the layout viewport so scroll steps cover a known height.
    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<(), CdpError> {
        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": 1,
                "mobile": false,
            })),
        )
        .await
        .map(drop)
    }
}
