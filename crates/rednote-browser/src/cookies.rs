//! Cookie file persistence.

use std::path::{Path, PathBuf};

use rednote_protocols::Cookie;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("Cookie file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cookie file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// JSON cookie file read before every operation and written after login.
#[derive(Debug, Clone)]
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load cookies; a missing file means a logged-out browser.
    pub async fn load(&self) -> Result<Vec<Cookie>, CookieError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cookie file at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn save(&self, cookies: &[Cookie]) -> Result<(), CookieError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(cookies)?;
        tokio::fs::write(&self.path, json).await?;
        info!("Saved {} cookies to {}", cookies.len(), self.path.display());
        Ok(())
    }

    /// Remove the cookie file; removing a missing file succeeds.
    pub async fn delete(&self) -> Result<(), CookieError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Deleted cookie file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "cookies_tests.rs"]
mod tests;
