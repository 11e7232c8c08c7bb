//! QR-code login.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rednote_protocols::{Page, PageOwner};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::HarvestError;
use crate::harvest::StabilityWaiter;
use crate::page_ext::PageExt;
use crate::SITE_ORIGIN;

/// Sidebar element only rendered for a logged-in account.
const LOGGED_IN_SELECTOR: &str = ".main-container .user .link-wrapper .channel";
const QRCODE_SCRIPT: &str = r#"(() => {
  const img = document.querySelector('.login-container .qrcode-img');
  return img ? (img.getAttribute('src') || '') : '';
})()"#;
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A login QR code, or the fact that none is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrCode {
    AlreadyLoggedIn,
    /// The `src` of the QR image, usually a `data:` URL.
    Image(String),
}

/// Render a duration the way Go's `time.Duration` prints: `4m0s`, `0s`.
pub fn format_timeout(d: Duration) -> String {
    let total = d.as_secs();
    if total == 0 {
        return "0s".to_string();
    }
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}

/// Split `data:image/png;base64,AAAA` into `("image/png", "AAAA")`.
pub fn split_data_url(src: &str) -> Option<(&str, &str)> {
    let rest = src.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    Some((if mime.is_empty() { "image/png" } else { mime }, data))
}

pub struct LoginAction<'a> {
    page: &'a dyn Page,
    waiter: StabilityWaiter,
}

impl<'a> LoginAction<'a> {
    pub fn new(page: &'a dyn Page) -> Self {
        Self {
            page,
            waiter: StabilityWaiter::default(),
        }
    }

    async fn open_explore(&self) -> Result<(), HarvestError> {
        self.page.navigate(&format!("{SITE_ORIGIN}/explore")).await?;
        let _ = self.page.wait_load().await;
        self.waiter.await_stable(self.page).await;
        Ok(())
    }

    async fn has_session(&self) -> Result<bool, HarvestError> {
        Ok(self.page.find(LOGGED_IN_SELECTOR).await?.is_some())
    }

    pub async fn check_login_status(&self) -> Result<bool, HarvestError> {
        self.open_explore().await?;
        let logged_in = self.has_session().await?;
        info!("Login status: {}", logged_in);
        Ok(logged_in)
    }

    pub async fn fetch_qrcode(&self) -> Result<QrCode, HarvestError> {
        self.open_explore().await?;
        if self.has_session().await? {
            return Ok(QrCode::AlreadyLoggedIn);
        }
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        loop {
            let src = self.page.eval_string(QRCODE_SCRIPT).await;
            if !src.trim().is_empty() {
                return Ok(QrCode::Image(src));
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(HarvestError::ActionFailed("login qrcode not found".into()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Poll until the logged-in element appears or `timeout` passes.
    pub async fn wait_for_login(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match self.has_session().await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) if e.is_fatal() => {
                    warn!("Login wait aborted: {}", e);
                    return false;
                }
                Err(_) => {}
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        false
    }
}

/// Invoked by the watcher once a scan completes.
#[async_trait]
pub trait LoginCompletion: Send + Sync {
    async fn on_login(&self, page: &dyn Page) -> Result<(), String>;
}

/// Detached task waiting for a QR scan.
pub struct LoginWatcher;

impl LoginWatcher {
    /// Wait up to `timeout` for login on `owner`'s page, run `completion`
    /// on success, then release the page whatever happened.
    pub fn spawn(
        owner: Box<dyn PageOwner>,
        timeout: Duration,
        completion: Arc<dyn LoginCompletion>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let logged_in = LoginAction::new(owner.page()).wait_for_login(timeout).await;
            if logged_in {
                info!("QR login completed");
                if let Err(e) = completion.on_login(owner.page()).await {
                    error!("Failed to persist login: {}", e);
                }
            } else {
                warn!("QR login not completed within {}", format_timeout(timeout));
            }
            owner.release().await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeOwner, FakePage};
    use parking_lot::Mutex;
    use serde_json::json;

    #[test]
    fn test_format_timeout() {
        assert_eq!(format_timeout(Duration::from_secs(240)), "4m0s");
        assert_eq!(format_timeout(Duration::ZERO), "0s");
        assert_eq!(format_timeout(Duration::from_secs(45)), "45s");
        assert_eq!(format_timeout(Duration::from_secs(3661)), "1h1m1s");
    }

    #[test]
    fn test_split_data_url() {
        assert_eq!(
            split_data_url("data:image/png;base64,iVBOR"),
            Some(("image/png", "iVBOR"))
        );
        assert_eq!(split_data_url("https://x/qr.png"), None);
        assert_eq!(split_data_url("data:text/plain,hi"), None);
    }

    #[tokio::test]
    async fn test_check_login_status() {
        let page = FakePage::new();
        assert!(!LoginAction::new(&page).check_login_status().await.unwrap());
        page.add_element(LOGGED_IN_SELECTOR);
        assert!(LoginAction::new(&page).check_login_status().await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_qrcode() {
        let page = FakePage::new();
        page.respond("qrcode-img", json!("data:image/png;base64,QR"));
        assert_eq!(
            LoginAction::new(&page).fetch_qrcode().await.unwrap(),
            QrCode::Image("data:image/png;base64,QR".into())
        );

        page.add_element(LOGGED_IN_SELECTOR);
        assert_eq!(LoginAction::new(&page).fetch_qrcode().await.unwrap(), QrCode::AlreadyLoggedIn);
    }

    struct Recorder(Arc<Mutex<u32>>);

    #[async_trait]
    impl LoginCompletion for Recorder {
        async fn on_login(&self, _page: &dyn Page) -> Result<(), String> {
            *self.0.lock() += 1;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_watcher_completes_and_releases() {
        let page = FakePage::new();
        page.add_element(LOGGED_IN_SELECTOR);
        let released = Arc::new(Mutex::new(false));
        let calls = Arc::new(Mutex::new(0));

        let owner = Box::new(FakeOwner {
            page: page.clone(),
            released: released.clone(),
        });
        LoginWatcher::spawn(owner, Duration::from_secs(240), Arc::new(Recorder(calls.clone())))
            .await
            .unwrap();

        assert_eq!(*calls.lock(), 1);
        assert!(*released.lock());
        assert!(page.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watcher_times_out_and_releases() {
        let page = FakePage::new();
        let released = Arc::new(Mutex::new(false));
        let calls = Arc::new(Mutex::new(0));

        let owner = Box::new(FakeOwner {
            page,
            released: released.clone(),
        });
        LoginWatcher::spawn(owner, Duration::from_secs(5), Arc::new(Recorder(calls.clone())))
            .await
            .unwrap();

        assert_eq!(*calls.lock(), 0);
        assert!(*released.lock());
    }
}
