//! Image inputs for publishing: remote URLs are downloaded, local paths
//! are checked.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use url::Url;

use crate::error::HarvestError;
use crate::SITE_ORIGIN;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether `input` looks like an http(s) URL (scheme case-insensitive).
pub fn is_image_url(input: &str) -> bool {
    let lower = input.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether `input` is an http(s) URL with a host.
pub fn is_valid_image_url(input: &str) -> bool {
    match Url::parse(input.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// `img_{hash}.{ext}`, stable per URL.
pub fn file_name_for(url: &str, extension: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    format!("img_{}.{}", &digest[..16], extension)
}

fn extension_for(content_type: Option<&str>, url: &str) -> String {
    let from_mime = content_type.and_then(|ct| {
        let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match mime.as_str() {
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            "image/bmp" => Some("bmp"),
            _ => None,
        }
    });
    if let Some(ext) = from_mime {
        return ext.to_string();
    }
    Url::parse(url)
        .ok()
        .and_then(|u| {
            Path::new(u.path())
                .extension()
                .map(|e| e.to_string_lossy().to_ascii_lowercase())
        })
        .filter(|e| matches!(e.as_str(), "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp"))
        .unwrap_or_else(|| "jpg".to_string())
}

/// Resolves publish image inputs to local files.
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    client: reqwest::Client,
    download_dir: PathBuf,
}

impl ImageProcessor {
    pub fn new(download_dir: impl Into<PathBuf>) -> Result<Self, HarvestError> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| HarvestError::ActionFailed(format!("http client: {e}")))?;
        Ok(Self {
            client,
            download_dir: download_dir.into(),
        })
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Download URLs and verify local paths, preserving order.
    pub async fn process(&self, inputs: &[String]) -> Result<Vec<PathBuf>, HarvestError> {
        if inputs.is_empty() {
            return Err(HarvestError::InvalidInput("at least one image is required".into()));
        }
        let mut paths = Vec::with_capacity(inputs.len());
        for input in inputs {
            let input = input.trim();
            if is_image_url(input) {
                paths.push(self.download(input).await?);
            } else {
                let path = PathBuf::from(input);
                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    return Err(HarvestError::InvalidInput(format!("image not found: {input}")));
                }
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Fetch one image with browser-like headers.
    pub async fn download(&self, url: &str) -> Result<PathBuf, HarvestError> {
        if !is_valid_image_url(url) {
            return Err(HarvestError::InvalidInput(format!("invalid image url: {url}")));
        }
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::REFERER, format!("{SITE_ORIGIN}/"))
            .send()
            .await
            .map_err(|e| HarvestError::ActionFailed(format!("download {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(HarvestError::ActionFailed(format!(
                "download {url}: HTTP {}",
                response.status()
            )));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| HarvestError::ActionFailed(format!("download {url}: {e}")))?;
        if bytes.is_empty() {
            return Err(HarvestError::ActionFailed(format!("download {url}: empty body")));
        }

        let ext = extension_for(content_type.as_deref(), url);
        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| HarvestError::ActionFailed(format!("create {}: {e}", self.download_dir.display())))?;
        let path = self.download_dir.join(file_name_for(url, &ext));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| HarvestError::ActionFailed(format!("write {}: {e}", path.display())))?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);
        info!("Image saved to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
#[path = "media_tests.rs"]
mod tests;
