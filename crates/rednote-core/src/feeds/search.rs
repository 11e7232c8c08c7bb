//! Keyword search with optional filters.

use rednote_protocols::Page;
use tracing::info;
use url::Url;

use crate::error::HarvestError;
use crate::filter::{FilterOption, FilterTranslator};
use crate::harvest::{FeedSource, PaginatorConfig, RecordExtractor, ScrollPaginator, StabilityWaiter};
use crate::models::Feed;
use crate::SITE_ORIGIN;

/// Search results page for `keyword`.
pub fn search_url(keyword: &str) -> Result<String, HarvestError> {
    Url::parse_with_params(
        &format!("{SITE_ORIGIN}/search_result"),
        &[("keyword", keyword), ("source", "web_explore_feature")],
    )
    .map(String::from)
    .map_err(|e| HarvestError::InvalidInput(format!("bad search url: {e}")))
}

pub struct SearchHarvester<'a> {
    page: &'a dyn Page,
    config: PaginatorConfig,
    waiter: StabilityWaiter,
}

impl<'a> SearchHarvester<'a> {
    pub fn new(page: &'a dyn Page, config: PaginatorConfig) -> Self {
        Self {
            page,
            config,
            waiter: StabilityWaiter::default(),
        }
    }

    /// Search, apply `filter`, and scroll the results.
    ///
    /// Filters are validated before the page is touched.
    pub async fn harvest(&self, keyword: &str, filter: &FilterOption) -> Result<Vec<Feed>, HarvestError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(HarvestError::InvalidInput("keyword is required".into()));
        }
        let directives = FilterTranslator.translate(filter)?;

        super::open(self.page, &search_url(keyword)?, &self.waiter).await?;
        FilterTranslator
            .apply(self.page, &directives, &self.waiter)
            .await?;

        let mut source = FeedSource::new(self.page, RecordExtractor::new("search", &["feeds"]))
            .with_waiter(self.waiter);
        let outcome = ScrollPaginator::new(self.config).run(&mut source).await?;
        info!(
            "Search '{}': {} notes with {} filters",
            keyword,
            outcome.records.len(),
            directives.len()
        );
        Ok(outcome.records)
    }
}
