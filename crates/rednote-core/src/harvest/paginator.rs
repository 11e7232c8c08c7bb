//! Scroll pagination with convergence detection.

use std::time::Duration;

use async_trait::async_trait;
use rednote_protocols::Page;
use tracing::{debug, info, warn};

use super::extract::RecordExtractor;
use super::postprocess;
use super::stability::StabilityWaiter;
use crate::error::HarvestError;
use crate::models::{Feed, HarvestRecord};
use crate::page_ext::PageExt;

pub const DEFAULT_LIMIT: usize = 20;
pub const DEFAULT_MAX_ROUNDS: usize = 20;
pub const DEFAULT_STABLE_ROUNDS: usize = 3;

/// Bounds of one harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatorConfig {
    /// Maximum records returned; at least 1.
    pub limit: usize,
    /// Maximum scroll rounds after the first extraction.
    pub max_rounds: usize,
    /// Consecutive non-growing rounds that count as convergence.
    pub stable_rounds: usize,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            max_rounds: DEFAULT_MAX_ROUNDS,
            stable_rounds: DEFAULT_STABLE_ROUNDS,
        }
    }
}

impl PaginatorConfig {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_rounds(mut self, max_rounds: usize, stable_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self.stable_rounds = stable_rounds.max(1);
        self
    }
}

/// Why a harvest stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    LimitReached,
    Converged,
    RoundBudgetExhausted,
    EndOfContent,
}

/// Records of a finished harvest.
#[derive(Debug, Clone)]
pub struct HarvestOutcome<R> {
    pub records: Vec<R>,
    /// Scroll rounds performed.
    pub rounds: usize,
    pub stop: StopReason,
}

/// Where a paginator reads records from and how it asks for more.
#[async_trait]
pub trait RecordSource: Send {
    type Record: HarvestRecord;

    /// Current full record list, in document order.
    async fn fetch(&mut self) -> Result<Vec<Self::Record>, HarvestError>;

    /// Reveal more content (scroll, settle, wait for stability).
    async fn advance(&mut self) -> Result<(), HarvestError>;

    /// Whether the content announced its own end.
    async fn reached_end(&mut self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaginatorState {
    Extracting,
    Scrolling,
    Done(StopReason),
}

/// Drives a [`RecordSource`] until the limit, the round budget, an end
/// marker or convergence stops it.
///
/// The batch is replaced only when a later extraction is strictly larger,
/// and is truncated to the limit in document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollPaginator {
    config: PaginatorConfig,
}

impl ScrollPaginator {
    pub fn new(config: PaginatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    pub async fn run<S: RecordSource>(
        &self,
        source: &mut S,
    ) -> Result<HarvestOutcome<S::Record>, HarvestError> {
        let PaginatorConfig {
            limit,
            max_rounds,
            stable_rounds,
        } = self.config;
        let limit = limit.max(1);

        let mut state = PaginatorState::Extracting;
        debug!("Paginator state: {:?}", state);
        let mut records = match source.fetch().await {
            Ok(records) if !records.is_empty() => records,
            Ok(_) | Err(HarvestError::NoRecordsFound) => return Err(HarvestError::NoFeeds),
            Err(e) => return Err(e),
        };
        info!("Initial extraction: {} records", records.len());

        let mut last_count: Option<usize> = None;
        let mut non_growing = 0usize;
        let mut rounds = 0usize;

        while rounds < max_rounds && records.len() < limit {
            if last_count == Some(records.len()) {
                non_growing += 1;
            } else {
                non_growing = 0;
            }
            if non_growing >= stable_rounds {
                state = PaginatorState::Done(StopReason::Converged);
                break;
            }
            last_count = Some(records.len());

            if source.reached_end().await {
                state = PaginatorState::Done(StopReason::EndOfContent);
                break;
            }

            state = PaginatorState::Scrolling;
            debug!("Paginator state: {:?} (round {})", state, rounds + 1);
            match source.advance().await {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("Scroll round {} failed: {}", rounds + 1, e),
            }
            rounds += 1;

            state = PaginatorState::Extracting;
            match source.fetch().await {
                Ok(updated) if updated.len() > records.len() => {
                    debug!("Round {}: {} -> {} records", rounds, records.len(), updated.len());
                    records = updated;
                }
                Ok(updated) => debug!("Round {}: no growth ({} records)", rounds, updated.len()),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => debug!("Round {}: extraction skipped: {}", rounds, e),
            }
        }

        let stop = if records.len() >= limit {
            StopReason::LimitReached
        } else if let PaginatorState::Done(reason) = state {
            reason
        } else {
            StopReason::RoundBudgetExhausted
        };
        records.truncate(limit);
        info!(
            "Harvest done: {} records after {} rounds ({:?})",
            records.len(),
            rounds,
            stop
        );

        Ok(HarvestOutcome {
            records,
            rounds,
            stop,
        })
    }
}

/// Scroll pacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettings {
    /// Multiple of the viewport height scrolled per round.
    pub factor: f64,
    pub min_px: u32,
    /// Pause after scrolling before the stability wait.
    pub settle: Duration,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            factor: 1.6,
            min_px: 1200,
            settle: Duration::from_secs(1),
        }
    }
}

/// Feed cards read from page state while scrolling the window.
pub struct FeedSource<'a> {
    page: &'a dyn Page,
    extractor: RecordExtractor,
    scroll: ScrollSettings,
    waiter: StabilityWaiter,
    trim_owner: bool,
}

impl<'a> FeedSource<'a> {
    pub fn new(page: &'a dyn Page, extractor: RecordExtractor) -> Self {
        Self {
            page,
            extractor,
            scroll: ScrollSettings::default(),
            waiter: StabilityWaiter::default(),
            trim_owner: false,
        }
    }

    pub fn with_waiter(mut self, waiter: StabilityWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    pub fn with_scroll(mut self, scroll: ScrollSettings) -> Self {
        self.scroll = scroll;
        self
    }

    /// Drop the viewer's own leading notes when on the saved view.
    pub fn trim_owner_posts(mut self, enabled: bool) -> Self {
        self.trim_owner = enabled;
        self
    }
}

#[async_trait]
impl RecordSource for FeedSource<'_> {
    type Record = Feed;

    async fn fetch(&mut self) -> Result<Vec<Feed>, HarvestError> {
        let records = self.extractor.extract::<Feed>(self.page).await?;
        if self.trim_owner {
            Ok(postprocess::filter_owner_posts(self.page, records).await)
        } else {
            Ok(records)
        }
    }

    async fn advance(&mut self) -> Result<(), HarvestError> {
        self.page.scroll_window(self.scroll.factor, self.scroll.min_px).await;
        tokio::time::sleep(self.scroll.settle).await;
        self.waiter.await_stable(self.page).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "paginator_tests.rs"]
mod tests;
