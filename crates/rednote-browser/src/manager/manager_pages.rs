//! Opening leased pages with the persisted session restored.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{BrowserError, BrowserManager, PageLease};
use crate::cookies::CookieStore;

impl BrowserManager {
    /// Open a fresh tab with the stored cookies installed.
    ///
    /// A broken cookie file is logged and the tab opens logged out.
    pub async fn open_page(&self, cookies: &CookieStore) -> Result<PageLease, BrowserError> {
        self.ensure_connected().await?;
        let client = self.client().await?;

        let session = client.new_page(None).await?;
        let lease = PageLease::new(client, Arc::new(session));

        if let Err(e) = lease
            .session()
            .set_viewport(self.config.viewport_width, self.config.viewport_height)
            .await
        {
            warn!("Failed to set viewport: {}", e);
        }

        match cookies.load().await {
            Ok(stored) if !stored.is_empty() => {
                lease.session().set_cookies(&stored).await?;
            }
            Ok(_) => debug!("No stored cookies to restore"),
            Err(e) => warn!("Ignoring unreadable cookie file {}: {}", cookies.path().display(), e),
        }

        debug!("Opened page {}", lease.session().target_id());
        Ok(lease)
    }
}
