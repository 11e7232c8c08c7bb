//! Scoped ownership of one browser tab.

use std::sync::Arc;

use async_trait::async_trait;
use rednote_protocols::{Page, PageOwner};
use tracing::{debug, warn};

use crate::cdp::{CdpClient, PageSession};

/// One tab owned by one operation.
///
/// Call [`PageLease::close`] on the happy path. If the lease is dropped
/// instead (error, panic, cancelled future) the close is scheduled on the
/// current runtime.
pub struct PageLease {
    client: Arc<CdpClient>,
    session: Arc<PageSession>,
    closed: bool,
}

impl PageLease {
    pub(crate) fn new(client: Arc<CdpClient>, session: Arc<PageSession>) -> Self {
        Self {
            client,
            session,
            closed: false,
        }
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }

    /// Close the tab now.
    pub async fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.client.close_page(&self.session).await {
            warn!("Failed to close page {}: {}", self.session.target_id(), e);
        }
    }
}

impl Drop for PageLease {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let client = self.client.clone();
        let session = self.session.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Scheduling close for dropped page {}", session.target_id());
                handle.spawn(async move {
                    if let Err(e) = client.close_page(&session).await {
                        warn!("Failed to close dropped page {}: {}", session.target_id(), e);
                    }
                });
            }
            Err(_) => warn!(
                "No runtime available to close page {}",
                self.session.target_id()
            ),
        }
    }
}

#[async_trait]
impl PageOwner for PageLease {
    fn page(&self) -> &dyn Page {
        self.session.as_ref()
    }

    async fn release(self: Box<Self>) {
        (*self).close().await;
    }
}
