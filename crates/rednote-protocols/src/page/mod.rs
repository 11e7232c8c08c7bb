//! The browser tab boundary.
//!
//! Everything above this module drives a page only through [`Page`], so the
//! harvesting engine can run against a scripted fake in tests and against a
//! DevTools session in production.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PageError;

/// A resolved DOM element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Backend node id inside the page's current document.
    pub node_id: i64,
    /// Selector the element was found with.
    pub selector: String,
}

/// A browser cookie, serialized in the DevTools `Network.Cookie` shape.
///
/// The cookie file is a JSON array of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

/// One browser tab.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to `url` and wait for the document to load.
    async fn navigate(&self, url: &str) -> Result<(), PageError>;

    /// Wait for `document.readyState` to reach `complete`.
    async fn wait_load(&self) -> Result<(), PageError>;

    /// Evaluate `script` in the page, awaiting promises, returning the value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, PageError>;

    /// Wait until no DOM mutation occurred for `quiescence`, bounded by `timeout`.
    async fn wait_stable(&self, timeout: Duration, quiescence: Duration) -> Result<(), PageError>;

    /// Find the first element matching `selector`.
    async fn find(&self, selector: &str) -> Result<Option<Element>, PageError>;

    /// Click the centre of `element`.
    async fn click(&self, element: &Element) -> Result<(), PageError>;

    /// The current location.
    async fn current_url(&self) -> Result<String, PageError>;

    /// All cookies visible to the browser.
    async fn cookies(&self) -> Result<Vec<Cookie>, PageError>;

    async fn set_cookies(&self, cookies: &[Cookie]) -> Result<(), PageError>;

    /// Insert text at the current focus.
    async fn insert_text(&self, text: &str) -> Result<(), PageError>;

    /// Press and release a named key such as `Enter`.
    async fn press_key(&self, key: &str) -> Result<(), PageError>;

    /// Attach local files to an `<input type=file>` element.
    async fn set_file_input(&self, element: &Element, files: &[PathBuf]) -> Result<(), PageError>;
}

/// An owned page that must be released when the owner is done with it.
///
/// Background tasks (the login watcher) take one of these so the page is
/// closed on every exit path.
#[async_trait]
pub trait PageOwner: Send + Sync + 'static {
    fn page(&self) -> &dyn Page;

    /// Close the underlying tab.
    async fn release(self: Box<Self>);
}
