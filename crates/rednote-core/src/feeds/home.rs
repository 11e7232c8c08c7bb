//! Home (explore) feed.

use rednote_protocols::Page;
use tracing::info;

use crate::error::HarvestError;
use crate::harvest::{FeedSource, PaginatorConfig, RecordExtractor, ScrollPaginator, StabilityWaiter};
use crate::models::Feed;
use crate::SITE_ORIGIN;

/// Collects recommended notes from the explore page.
pub struct FeedsHarvester<'a> {
    page: &'a dyn Page,
    config: PaginatorConfig,
    waiter: StabilityWaiter,
}

impl<'a> FeedsHarvester<'a> {
    pub fn new(page: &'a dyn Page, config: PaginatorConfig) -> Self {
        Self {
            page,
            config,
            waiter: StabilityWaiter::default(),
        }
    }

    pub async fn harvest(&self) -> Result<Vec<Feed>, HarvestError> {
        super::open(self.page, &format!("{SITE_ORIGIN}/explore"), &self.waiter).await?;

        let mut source = FeedSource::new(self.page, RecordExtractor::new("feed", &["feeds"]))
            .with_waiter(self.waiter);
        let outcome = ScrollPaginator::new(self.config).run(&mut source).await?;
        info!("Home feed: {} notes", outcome.records.len());
        Ok(outcome.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{feeds, snapshot, FakePage};
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_home_feed_limit() {
        let page = FakePage::new();
        page.respond(
            "__INITIAL_STATE__",
            snapshot(json!({"feeds": {"_value": feeds(&[("a", "u1"), ("b", "u2"), ("c", "u3")])}})),
        );

        let config = PaginatorConfig::default().with_limit(2);
        let records = FeedsHarvester::new(&page, config).harvest().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(page.navigations(), vec!["https://www.xiaohongshu.com/explore".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_home_feed_empty() {
        let page = FakePage::new();
        let err = FeedsHarvester::new(&page, PaginatorConfig::default())
            .harvest()
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::NoFeeds));
    }
}
