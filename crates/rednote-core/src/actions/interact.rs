//! Idempotent like / favorite toggles on a note.

use std::time::Duration;

use rednote_protocols::Page;
use tracing::info;

use crate::error::HarvestError;
use crate::feeds::open_detail;
use crate::harvest::StabilityWaiter;
use crate::models::InteractInfo;
use crate::page_ext::PageExt;
use crate::state::capture;

const CLICK_ATTEMPTS: usize = 2;
const VERIFY_DELAY: Duration = Duration::from_millis(1200);

/// A reaction the viewer can set or clear on a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Favorite,
}

impl Reaction {
    fn selector(self) -> &'static str {
        match self {
            Reaction::Like => ".interact-container .left .like-wrapper",
            Reaction::Favorite => ".interact-container .left .collect-wrapper",
        }
    }

    fn is_set(self, info: &InteractInfo) -> bool {
        match self {
            Reaction::Like => info.liked,
            Reaction::Favorite => info.collected,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Favorite => "favorite",
        }
    }
}

pub struct InteractAction<'a> {
    page: &'a dyn Page,
    waiter: StabilityWaiter,
    verify_delay: Duration,
}

impl<'a> InteractAction<'a> {
    pub fn new(page: &'a dyn Page) -> Self {
        Self {
            page,
            waiter: StabilityWaiter::default(),
            verify_delay: VERIFY_DELAY,
        }
    }

    pub async fn like(&self, feed_id: &str, xsec_token: &str) -> Result<(), HarvestError> {
        self.set(Reaction::Like, true, feed_id, xsec_token).await
    }

    pub async fn unlike(&self, feed_id: &str, xsec_token: &str) -> Result<(), HarvestError> {
        self.set(Reaction::Like, false, feed_id, xsec_token).await
    }

    pub async fn favorite(&self, feed_id: &str, xsec_token: &str) -> Result<(), HarvestError> {
        self.set(Reaction::Favorite, true, feed_id, xsec_token).await
    }

    pub async fn unfavorite(&self, feed_id: &str, xsec_token: &str) -> Result<(), HarvestError> {
        self.set(Reaction::Favorite, false, feed_id, xsec_token).await
    }

    /// Bring `reaction` to `desired`, clicking only when needed.
    pub async fn set(
        &self,
        reaction: Reaction,
        desired: bool,
        feed_id: &str,
        xsec_token: &str,
    ) -> Result<(), HarvestError> {
        open_detail(self.page, feed_id, xsec_token, &self.waiter).await?;

        if reaction.is_set(&self.interact_info(feed_id).await?) == desired {
            info!("Note {} already has {}={}, skipping", feed_id, reaction.name(), desired);
            return Ok(());
        }

        for attempt in 1..=CLICK_ATTEMPTS {
            if !self.page.click_selector(reaction.selector()).await? {
                return Err(HarvestError::ActionFailed(format!(
                    "{} button not found",
                    reaction.name()
                )));
            }
            tokio::time::sleep(self.verify_delay).await;
            if reaction.is_set(&self.interact_info(feed_id).await?) == desired {
                info!("Note {}: {}={} after {} click(s)", feed_id, reaction.name(), desired, attempt);
                return Ok(());
            }
        }
        Err(HarvestError::ActionFailed(format!(
            "{} state did not change to {}",
            reaction.name(),
            desired
        )))
    }

    async fn interact_info(&self, feed_id: &str) -> Result<InteractInfo, HarvestError> {
        let state = capture(self.page, "note")
            .await?
            .ok_or_else(|| HarvestError::NoteUnavailable("note state missing".into()))?;
        let info = state
            .get_path(&["noteDetailMap", feed_id, "note", "interactInfo"])
            .ok_or_else(|| HarvestError::NoteUnavailable(format!("note {feed_id} not in page state")))?;
        serde_json::from_value(info.clone())
            .map_err(|e| HarvestError::MalformedRecords(format!("interact info: {e}")))
    }
}
