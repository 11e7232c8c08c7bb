//! Browser and cookie persistence settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{configured_path, data_dir, default_true};

/// Environment variable overriding the cookie file location.
pub const COOKIES_PATH_ENV: &str = "COOKIES_PATH";

/// Browser launch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Chrome binary; empty means auto-detect.
    #[serde(default)]
    pub bin_path: String,

    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    /// Chrome user data dir; empty means `~/.rednote-mcp/chrome-profile`.
    #[serde(default)]
    pub profile_dir: String,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            bin_path: String::new(),
            debug_port: default_debug_port(),
            profile_dir: String::new(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

impl BrowserConfig {
    pub fn bin_path(&self) -> Option<PathBuf> {
        configured_path(&self.bin_path)
    }

    pub fn profile_dir(&self) -> PathBuf {
        configured_path(&self.profile_dir).unwrap_or_else(|| data_dir().join("chrome-profile"))
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    900
}

/// Cookie file location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookiesConfig {
    #[serde(default)]
    pub path: String,
}

impl CookiesConfig {
    /// `COOKIES_PATH` wins, then the configured path, then the default.
    pub fn resolve_path(&self) -> PathBuf {
        resolve_cookies_path(std::env::var(COOKIES_PATH_ENV).ok(), &self.path)
    }
}

pub(crate) fn resolve_cookies_path(env_value: Option<String>, configured: &str) -> PathBuf {
    env_value
        .as_deref()
        .and_then(configured_path)
        .or_else(|| configured_path(configured))
        .unwrap_or_else(|| data_dir().join("cookies.json"))
}
