//! Chrome launch options and manager errors.

use std::path::PathBuf;
use std::time::Duration;

use rednote_config::BrowserConfig;
use thiserror::Error;

use crate::cdp::CdpError;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("no Chrome executable found; install Google Chrome or set browser.bin_path")]
    ChromeNotFound,

    #[error("configured Chrome binary {} does not exist", .0.display())]
    MissingBinary(PathBuf),

    #[error("could not start Chrome: {0}")]
    Launch(#[source] std::io::Error),

    #[error("Chrome did not open DevTools port {port} within {waited:?}")]
    DevtoolsTimeout { port: u16, waited: Duration },

    #[error("not connected to Chrome")]
    NotConnected,

    #[error(transparent)]
    Cdp(#[from] CdpError),
}

/// How the manager finds, starts and sizes Chrome.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    pub headless: bool,
    /// Explicit executable; probed from well-known locations when `None`.
    pub chrome_path: Option<PathBuf>,
    /// User data dir holding the persistent xiaohongshu session.
    pub profile_dir: Option<PathBuf>,
    pub debug_port: u16,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self::from(&BrowserConfig::default())
    }
}

impl From<&BrowserConfig> for BrowserManagerConfig {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            headless: config.headless,
            chrome_path: config.bin_path(),
            profile_dir: Some(config.profile_dir()),
            debug_port: config.debug_port,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
        }
    }
}

impl BrowserManagerConfig {
    pub fn profile_dir(&self) -> PathBuf {
        match &self.profile_dir {
            Some(dir) => dir.clone(),
            None => rednote_config::data_dir().join("chrome-profile"),
        }
    }

    /// HTTP base of the DevTools endpoint, used for discovery.
    pub fn devtools_http(&self) -> String {
        format!("http://127.0.0.1:{}", self.debug_port)
    }
}
