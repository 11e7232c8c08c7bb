//! The viewer's saved (favorited) notes.

use std::time::Duration;

use rednote_protocols::Page;
use tracing::{info, warn};

use crate::error::HarvestError;
use crate::harvest::postprocess::is_saved_view;
use crate::harvest::{
    CookieFallback, FeedSource, Matcher, NavigationStrategy, PaginatorConfig, RecordExtractor,
    ScrollPaginator, StabilityWaiter, TextMatcher,
};
use crate::models::Feed;

const SETTLE: Duration = Duration::from_millis(1200);

/// Lists saved notes of the logged-in account.
///
/// Reaches the profile through the sidebar (or the cookie fallback),
/// switches to the saved tab and scrolls, dropping the viewer's own
/// notes that lead the list.
pub struct SavedFeedsHarvester<'a> {
    page: &'a dyn Page,
    config: PaginatorConfig,
    navigation: NavigationStrategy,
    waiter: StabilityWaiter,
}

impl<'a> SavedFeedsHarvester<'a> {
    pub fn new(page: &'a dyn Page, config: PaginatorConfig) -> Self {
        Self {
            page,
            config,
            navigation: NavigationStrategy::profile().with_fallback(CookieFallback::default()),
            waiter: StabilityWaiter::with_quiescence(SETTLE),
        }
    }

    fn saved_tab() -> Matcher {
        Matcher::Text(
            TextMatcher::new("button,div,span,a", &["收藏", "saved"])
                .within(&["#userPostedFeeds", ".user-page", "body"])
                .prefix()
                .case_insensitive()
                .visible_only(),
        )
    }

    pub async fn harvest(&self, limit: usize) -> Result<Vec<Feed>, HarvestError> {
        self.navigation.navigate(self.page).await?;
        self.waiter.await_stable(self.page).await;

        if !Self::saved_tab().try_click(self.page).await && !is_saved_view(self.page).await {
            warn!("Saved tab not found");
            return Err(HarvestError::ActionFailed("failed to switch to saved tab".into()));
        }

        self.waiter.await_stable(self.page).await;
        tokio::time::sleep(SETTLE).await;

        let mut source = FeedSource::new(self.page, RecordExtractor::saved_feeds())
            .with_waiter(self.waiter)
            .trim_owner_posts(true);
        let outcome = ScrollPaginator::new(self.config.with_limit(limit))
            .run(&mut source)
            .await?;
        info!(
            "Saved feeds: {} notes ({:?} after {} rounds)",
            outcome.records.len(),
            outcome.stop,
            outcome.rounds
        );
        Ok(outcome.records)
    }
}
