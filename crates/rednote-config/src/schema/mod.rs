//! Typed `rednote.toml` sections.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

mod schema_browser;
mod schema_harvest;

pub use schema_browser::*;
pub use schema_harvest::*;

/// Directory holding cookies, logs and the browser profile.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".rednote-mcp")
}

pub(crate) fn default_true() -> bool {
    true
}

/// Expand `~` in a configured path; empty means unset.
pub(crate) fn configured_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(shellexpand::tilde(trimmed).to_string()))
    }
}

/// Everything in `rednote.toml`. Every section and key may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub account: AccountConfig,
    pub cookies: CookiesConfig,
    pub harvest: HarvestConfig,
    pub login: LoginConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18060,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Account shown in health responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub username: String,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
