//! Harvest, login and media settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::configured_path;

/// Scroll pagination defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    #[serde(default = "default_saved_feeds_limit")]
    pub saved_feeds_limit: usize,

    #[serde(default = "default_max_scroll_rounds")]
    pub max_scroll_rounds: usize,

    /// Consecutive non-growing rounds before declaring convergence.
    #[serde(default = "default_stable_rounds")]
    pub stable_rounds: usize,

    /// Deadline for one top-level operation.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            saved_feeds_limit: default_saved_feeds_limit(),
            max_scroll_rounds: default_max_scroll_rounds(),
            stable_rounds: default_stable_rounds(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl HarvestConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_saved_feeds_limit() -> usize {
    20
}

fn default_max_scroll_rounds() -> usize {
    20
}

fn default_stable_rounds() -> usize {
    3
}

fn default_request_timeout() -> u64 {
    300
}

/// QR login settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    #[serde(default = "default_qrcode_timeout")]
    pub qrcode_timeout_secs: u64,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            qrcode_timeout_secs: default_qrcode_timeout(),
        }
    }
}

impl LoginConfig {
    pub fn qrcode_timeout(&self) -> Duration {
        Duration::from_secs(self.qrcode_timeout_secs)
    }
}

fn default_qrcode_timeout() -> u64 {
    240
}

/// Where remote images are downloaded before upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub download_dir: String,
}

impl MediaConfig {
    pub fn download_dir(&self) -> PathBuf {
        configured_path(&self.download_dir)
            .unwrap_or_else(|| std::env::temp_dir().join("rednote-mcp").join("images"))
    }
}
