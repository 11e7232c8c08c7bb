//! Reaching the viewer's own profile.

use std::time::Duration;

use rednote_protocols::Page;
use regex::Regex;
use tracing::{debug, info, warn};

use super::extract::RecordExtractor;
use super::matcher::{Matcher, MatcherChain, TextMatcher};
use super::postprocess::distinct_author_count;
use super::stability::StabilityWaiter;
use crate::error::HarvestError;
use crate::models::Feed;
use crate::SITE_ORIGIN;

const ATTEMPTS: usize = 3;
const RETRY_DELAY: Duration = Duration::from_millis(800);
const CANDIDATE_CAP: usize = 12;
const HEX_ID: &str = r"(?i)[0-9a-f]{24}";

/// A profile URL scored by how plausible it is as the viewer's own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCandidate {
    pub url: String,
    pub score: usize,
}

/// Guesses the viewer's profile from 24-hex user ids in the cookies and
/// keeps the saved list with the most distinct authors.
#[derive(Debug, Clone)]
pub struct CookieFallback {
    url_template: String,
    cap: usize,
    waiter: StabilityWaiter,
    extractor: RecordExtractor,
}

impl Default for CookieFallback {
    fn default() -> Self {
        Self {
            url_template: format!("{SITE_ORIGIN}/user/profile/{{id}}?tab=fav&subTab=note"),
            cap: CANDIDATE_CAP,
            waiter: StabilityWaiter::with_quiescence(Duration::from_millis(900)),
            extractor: RecordExtractor::saved_feeds(),
        }
    }
}

impl CookieFallback {
    pub fn candidate_url(&self, id: &str) -> String {
        self.url_template.replace("{id}", id)
    }

    /// Distinct 24-hex tokens of `text` in order of appearance.
    pub fn candidate_ids(text: &str, cap: usize) -> Vec<String> {
        let re = match Regex::new(HEX_ID) {
            Ok(re) => re,
            Err(e) => {
                warn!("Invalid candidate pattern: {}", e);
                return Vec::new();
            }
        };
        let mut ids: Vec<String> = Vec::new();
        for m in re.find_iter(text) {
            let id = m.as_str().to_string();
            if !ids.contains(&id) {
                ids.push(id);
            }
            if ids.len() >= cap {
                break;
            }
        }
        ids
    }

    /// Highest strictly positive score; ties keep the earlier candidate.
    pub fn select_best(candidates: &[NavigationCandidate]) -> Option<&NavigationCandidate> {
        let mut best: Option<&NavigationCandidate> = None;
        for candidate in candidates {
            if candidate.score > best.map_or(0, |b| b.score) {
                best = Some(candidate);
            }
        }
        best
    }

    pub async fn run(&self, page: &dyn Page) -> Result<(), HarvestError> {
        let cookie_text = page
            .cookies()
            .await?
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        let ids = Self::candidate_ids(&cookie_text, self.cap);
        if ids.is_empty() {
            warn!("Cookie fallback: no candidate ids");
            return Err(HarvestError::NavigationFailed("no profile candidates in cookies".into()));
        }
        info!("Cookie fallback: {} candidates", ids.len());

        let mut scored = Vec::with_capacity(ids.len());
        for id in &ids {
            let url = self.candidate_url(id);
            if let Err(e) = page.navigate(&url).await {
                if e.is_fatal() {
                    return Err(e.into());
                }
                warn!("Cookie fallback: navigate failed for {}: {}", id, e);
                continue;
            }
            let _ = page.wait_load().await;
            self.waiter.await_stable(page).await;

            let score = match self.extractor.extract::<Feed>(page).await {
                Ok(feeds) => {
                    let score = distinct_author_count(&feeds);
                    debug!("Cookie fallback: {} has {} feeds, {} authors", id, feeds.len(), score);
                    score
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!("Cookie fallback: {} yielded nothing: {}", id, e);
                    0
                }
            };
            scored.push(NavigationCandidate { url, score });
        }

        let best = Self::select_best(&scored)
            .ok_or_else(|| HarvestError::NavigationFailed("no cookie candidate had saved notes".into()))?;
        info!("Cookie fallback: chose {} (score {})", best.url, best.score);
        page.navigate(&best.url).await?;
        let _ = page.wait_load().await;
        self.waiter.await_stable(page).await;
        Ok(())
    }
}

/// Gets from the explore page to the viewer's profile.
#[derive(Debug, Clone)]
pub struct NavigationStrategy {
    entry_url: String,
    matchers: MatcherChain,
    expected_segment: String,
    attempts: usize,
    retry_delay: Duration,
    waiter: StabilityWaiter,
    fallback: Option<CookieFallback>,
}

impl NavigationStrategy {
    /// Sidebar "me" link, by selector then by label.
    pub fn profile() -> Self {
        let matchers = MatcherChain::new(vec![
            Matcher::selector("div.main-container li.user.side-bar-component a.link-wrapper span.channel"),
            Matcher::selector("div.main-container li.user.side-bar-component a.link-wrapper"),
            Matcher::selector("li.user.side-bar-component a"),
            Matcher::Text(TextMatcher::new(
                "li.side-bar-component span.channel, li.side-bar-component a",
                &["我", "Me", "Mine"],
            )),
        ]);
        Self {
            entry_url: format!("{SITE_ORIGIN}/explore"),
            matchers,
            expected_segment: "/user/profile/".into(),
            attempts: ATTEMPTS,
            retry_delay: RETRY_DELAY,
            waiter: StabilityWaiter::default(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: CookieFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub async fn navigate(&self, page: &dyn Page) -> Result<(), HarvestError> {
        for attempt in 1..=self.attempts {
            info!("Profile navigation attempt {}", attempt);
            if let Err(e) = page.navigate(&self.entry_url).await {
                if e.is_fatal() {
                    return Err(e.into());
                }
                warn!("Navigate to {} failed: {}", self.entry_url, e);
                continue;
            }
            let _ = page.wait_load().await;
            self.waiter.await_stable(page).await;

            let Some(index) = self.matchers.click_first(page).await else {
                info!("Profile link not found on attempt {}", attempt);
                tokio::time::sleep(self.retry_delay).await;
                continue;
            };
            debug!("Profile link clicked via matcher {}", index);

            let _ = page.wait_load().await;
            self.waiter.await_stable(page).await;
            let url = page.current_url().await.unwrap_or_default();
            if url.contains(&self.expected_segment) {
                info!("Profile page reached on attempt {}", attempt);
                return Ok(());
            }
        }

        match &self.fallback {
            Some(fallback) => fallback.run(page).await,
            None => Err(HarvestError::NavigationFailed(
                "failed to navigate to profile page".into(),
            )),
        }
    }
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod tests;
