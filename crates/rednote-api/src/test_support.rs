//! In-memory pages for exercising the service, REST and MCP layers without
//! a browser.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rednote_browser::CookieStore;
use rednote_core::harvest::PaginatorConfig;
use rednote_protocols::{Cookie, Element, Page, PageError, PageOwner};
use serde_json::Value;

use crate::service::{PageProvider, ServiceError, ServiceSettings, XhsService};

/// A page with no rendered state: every script evaluates to `null`.
pub(crate) struct StubPage {
    logged_in: bool,
}

#[async_trait]
impl Page for StubPage {
    async fn navigate(&self, _url: &str) -> Result<(), PageError> {
        Ok(())
    }

    async fn wait_load(&self) -> Result<(), PageError> {
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> Result<Value, PageError> {
        Ok(Value::Null)
    }

    async fn wait_stable(&self, _timeout: Duration, _quiescence: Duration) -> Result<(), PageError> {
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Option<Element>, PageError> {
        if self.logged_in && selector.contains(".channel") {
            return Ok(Some(Element {
                node_id: 1,
                selector: selector.to_string(),
            }));
        }
        Ok(None)
    }

    async fn click(&self, _element: &Element) -> Result<(), PageError> {
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PageError> {
        Ok("https://www.xiaohongshu.com/explore".to_string())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, PageError> {
        Ok(Vec::new())
    }

    async fn set_cookies(&self, _cookies: &[Cookie]) -> Result<(), PageError> {
        Ok(())
    }

    async fn insert_text(&self, _text: &str) -> Result<(), PageError> {
        Ok(())
    }

    async fn press_key(&self, _key: &str) -> Result<(), PageError> {
        Ok(())
    }

    async fn set_file_input(&self, _element: &Element, _files: &[PathBuf]) -> Result<(), PageError> {
        Ok(())
    }
}

struct StubOwner {
    page: StubPage,
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl PageOwner for StubOwner {
    fn page(&self) -> &dyn Page {
        &self.page
    }

    async fn release(self: Box<Self>) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out [`StubPage`]s and counts opens and releases.
#[derive(Default)]
pub(crate) struct StubPages {
    logged_in: bool,
    unavailable: bool,
    opened: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl StubPages {
    pub(crate) fn logged_in() -> Self {
        Self {
            logged_in: true,
            ..Default::default()
        }
    }

    /// Every open fails as if Chrome could not be reached.
    pub(crate) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub(crate) fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageProvider for StubPages {
    async fn open(&self) -> Result<Box<dyn PageOwner>, ServiceError> {
        if self.unavailable {
            return Err(rednote_browser::BrowserError::ChromeNotFound.into());
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubOwner {
            page: StubPage {
                logged_in: self.logged_in,
            },
            released: self.released.clone(),
        }))
    }
}

pub(crate) fn settings(dir: &Path) -> ServiceSettings {
    ServiceSettings {
        account: "ai-report".to_string(),
        request_timeout: Duration::from_secs(30),
        qrcode_timeout: Duration::from_secs(240),
        saved_feeds_limit: 20,
        paginator: PaginatorConfig::default().with_rounds(2, 1),
        download_dir: dir.join("images"),
    }
}

pub(crate) fn service(pages: Arc<StubPages>, dir: &Path) -> XhsService {
    XhsService::new(pages, CookieStore::new(dir.join("cookies.json")), settings(dir))
}
