//! Note detail with progressively loaded comments.

use std::time::Duration;

use async_trait::async_trait;
use rednote_protocols::Page;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::HarvestError;
use crate::harvest::{
    HarvestOutcome, PaginatorConfig, RecordExtractor, RecordSource, ScrollPaginator,
    StabilityWaiter,
};
use crate::models::{Comment, CommentList, FeedDetail, NoteDetail};
use crate::page_ext::PageExt;
use crate::state::capture;
use crate::SITE_ORIGIN;

pub const DEFAULT_REPLY_THRESHOLD: usize = 10;
pub const DEFAULT_MAX_COMMENT_ITEMS: usize = 20;
/// Reply expansion passes per scroll round.
const REPLY_PASSES: usize = 3;
const BASE_SETTLE: Duration = Duration::from_millis(800);

/// Scroll pacing of the comment loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl ScrollSpeed {
    /// Lenient parse; anything unrecognised is `Normal`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "slow" => ScrollSpeed::Slow,
            "fast" => ScrollSpeed::Fast,
            _ => ScrollSpeed::Normal,
        }
    }

    /// Multiplier applied to settle delays.
    pub fn multiplier(self) -> f64 {
        match self {
            ScrollSpeed::Slow => 2.0,
            ScrollSpeed::Normal => 1.0,
            ScrollSpeed::Fast => 0.5,
        }
    }
}

/// How far a detail request loads comments. Immutable during a harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentLoadConfig {
    pub click_more_replies: bool,
    /// Reply threads announcing more replies than this are not expanded.
    pub max_replies_threshold: usize,
    pub max_comment_items: usize,
    pub scroll_speed: ScrollSpeed,
}

impl Default for CommentLoadConfig {
    fn default() -> Self {
        Self {
            click_more_replies: false,
            max_replies_threshold: DEFAULT_REPLY_THRESHOLD,
            max_comment_items: DEFAULT_MAX_COMMENT_ITEMS,
            scroll_speed: ScrollSpeed::Normal,
        }
    }
}

impl CommentLoadConfig {
    /// Build from caller values; non-positive or absent values default.
    pub fn from_request(
        click_more_replies: bool,
        reply_limit: Option<i64>,
        limit: Option<i64>,
        scroll_speed: Option<&str>,
    ) -> Self {
        let positive = |v: Option<i64>, default: usize| match v {
            Some(n) if n > 0 => n as usize,
            _ => default,
        };
        Self {
            click_more_replies,
            max_replies_threshold: positive(reply_limit, DEFAULT_REPLY_THRESHOLD),
            max_comment_items: positive(limit, DEFAULT_MAX_COMMENT_ITEMS),
            scroll_speed: scroll_speed.map(ScrollSpeed::parse).unwrap_or_default(),
        }
    }
}

/// Indices of "show more replies" buttons worth clicking.
///
/// A button is skipped when the reply count it announces exceeds
/// `threshold`; buttons without a count are clicked.
pub fn plan_reply_expansion(buttons: &[String], threshold: usize) -> Vec<usize> {
    buttons
        .iter()
        .enumerate()
        .filter(|(_, text)| announced_count(text).is_none_or(|n| n <= threshold))
        .map(|(i, _)| i)
        .collect()
}

fn announced_count(text: &str) -> Option<usize> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

pub fn detail_url(feed_id: &str, xsec_token: &str) -> Result<String, HarvestError> {
    let mut url = Url::parse(&format!("{SITE_ORIGIN}/explore/"))
        .and_then(|base| base.join(feed_id))
        .map_err(|e| HarvestError::InvalidInput(format!("bad feed id: {e}")))?;
    url.query_pairs_mut()
        .append_pair("xsec_token", xsec_token)
        .append_pair("xsec_source", "pc_feed");
    Ok(url.into())
}

const UNAVAILABLE_SCRIPT: &str = r#"(() => {
  const markers = ['.access-wrapper', '.error-wrapper', '.not-found-container', '.note-not-found'];
  for (const sel of markers) {
    const el = document.querySelector(sel);
    if (el) return (el.textContent || sel).trim() || sel;
  }
  const text = (document.body && document.body.innerText) || '';
  for (const phrase of ['当前笔记暂时无法浏览', '笔记不存在', '内容已被删除', '该笔记已被删除']) {
    if (text.includes(phrase)) return phrase;
  }
  return '';
})()"#;

const REPLY_BUTTONS_SCRIPT: &str = r#"(() => JSON.stringify(
  Array.from(document.querySelectorAll('.parent-comment .show-more')).map(el => (el.textContent || '').trim())
))()"#;

const END_MARKER_SCRIPT: &str =
    "(() => !!document.querySelector('.comments-container .end-container, .end-container'))()";

const SCROLL_COMMENTS_SCRIPT: &str = r#"(() => {
  const scroller = document.querySelector('.note-scroller');
  const comments = document.querySelectorAll('.parent-comment');
  if (comments.length > 0) {
    comments[comments.length - 1].scrollIntoView({ block: 'center' });
  }
  if (scroller) {
    scroller.scrollBy(0, Math.max(scroller.clientHeight * 0.8, 600));
    return true;
  }
  window.scrollBy(0, Math.max(window.innerHeight * 0.8, 600));
  return true;
})()"#;

fn click_reply_button_script(index: usize) -> String {
    format!(
        "(() => {{ const el = document.querySelectorAll('.parent-comment .show-more')[{index}]; if (!el) return false; el.click(); return true; }})()"
    )
}

/// Validate ids, open the note's detail page and reject unavailable notes.
///
/// Returns the trimmed feed id.
pub(crate) async fn open_detail<'f>(
    page: &dyn Page,
    feed_id: &'f str,
    xsec_token: &str,
    waiter: &StabilityWaiter,
) -> Result<&'f str, HarvestError> {
    let feed_id = feed_id.trim();
    if feed_id.is_empty() || feed_id.contains('/') {
        return Err(HarvestError::InvalidInput("feed_id is required".into()));
    }
    if xsec_token.trim().is_empty() {
        return Err(HarvestError::InvalidInput("xsec_token is required".into()));
    }

    super::open(page, &detail_url(feed_id, xsec_token.trim())?, waiter).await?;

    let reason = page.eval_string(UNAVAILABLE_SCRIPT).await;
    let reason = reason.trim();
    if !reason.is_empty() {
        warn!("Note {} unavailable: {}", feed_id, reason);
        return Err(HarvestError::NoteUnavailable(reason.to_string()));
    }
    Ok(feed_id)
}

/// Top-level comments read from state while scrolling the note panel.
struct CommentSource<'a> {
    page: &'a dyn Page,
    extractor: RecordExtractor,
    config: CommentLoadConfig,
    waiter: StabilityWaiter,
}

impl CommentSource<'_> {
    fn settle(&self) -> Duration {
        BASE_SETTLE.mul_f64(self.config.scroll_speed.multiplier())
    }

    async fn expand_replies(&self) {
        for pass in 0..REPLY_PASSES {
            let raw = self.page.eval_string(REPLY_BUTTONS_SCRIPT).await;
            let buttons: Vec<String> = serde_json::from_str(&raw).unwrap_or_default();
            let plan = plan_reply_expansion(&buttons, self.config.max_replies_threshold);
            if plan.is_empty() {
                break;
            }
            debug!("Reply expansion pass {}: {} of {} threads", pass + 1, plan.len(), buttons.len());
            // Reverse order keeps earlier indices valid as buttons disappear.
            for index in plan.into_iter().rev() {
                self.page.eval_bool(&click_reply_button_script(index)).await;
                tokio::time::sleep(self.settle() / 2).await;
            }
            self.waiter.await_stable(self.page).await;
        }
    }
}

#[async_trait]
impl RecordSource for CommentSource<'_> {
    type Record = Comment;

    async fn fetch(&mut self) -> Result<Vec<Comment>, HarvestError> {
        self.extractor.extract(self.page).await
    }

    async fn advance(&mut self) -> Result<(), HarvestError> {
        if self.config.click_more_replies {
            self.expand_replies().await;
        }
        self.page.eval_bool(SCROLL_COMMENTS_SCRIPT).await;
        tokio::time::sleep(self.settle()).await;
        self.waiter.await_stable(self.page).await;
        Ok(())
    }

    async fn reached_end(&mut self) -> bool {
        self.page.eval_bool(END_MARKER_SCRIPT).await
    }
}

/// Loads a note and its comments.
pub struct CommentHarvester<'a> {
    page: &'a dyn Page,
    paginator: PaginatorConfig,
    waiter: StabilityWaiter,
}

impl<'a> CommentHarvester<'a> {
    /// `paginator` supplies the round budget and convergence window; the
    /// limit comes from each request's [`CommentLoadConfig`].
    pub fn new(page: &'a dyn Page, paginator: PaginatorConfig) -> Self {
        Self {
            page,
            paginator,
            waiter: StabilityWaiter::default(),
        }
    }

    pub async fn load(
        &self,
        feed_id: &str,
        xsec_token: &str,
        load_all: bool,
        config: &CommentLoadConfig,
    ) -> Result<FeedDetail, HarvestError> {
        let feed_id = open_detail(self.page, feed_id, xsec_token, &self.waiter).await?;

        if !load_all {
            return self.detail_from_state(feed_id).await;
        }

        let mut source = CommentSource {
            page: self.page,
            extractor: RecordExtractor::new("note", &["noteDetailMap", feed_id, "comments", "list"]),
            config: *config,
            waiter: self.waiter,
        };
        let paginator = ScrollPaginator::new(self.paginator.with_limit(config.max_comment_items));
        let batch = match paginator.run(&mut source).await {
            Ok(HarvestOutcome { records, rounds, stop }) => {
                info!("Loaded {} comments in {} rounds ({:?})", records.len(), rounds, stop);
                records
            }
            Err(HarvestError::NoFeeds) => {
                debug!("Note {} has no comments", feed_id);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        // The loop stops before scrolling when the end marker is already on
        // screen or the first read meets the limit, so threads loaded on the
        // last screen are expanded here.
        if config.click_more_replies && !batch.is_empty() {
            source.expand_replies().await;
        }

        // Re-read so replies expanded after the last round are included. The
        // harvested batch wins if the list shrank in between.
        let mut detail = self.detail_from_state(feed_id).await?;
        if detail.comments.list.len() < batch.len() {
            detail.comments.list = batch;
        }
        detail.comments.list.truncate(config.max_comment_items);
        Ok(detail)
    }

    async fn detail_from_state(&self, feed_id: &str) -> Result<FeedDetail, HarvestError> {
        let state = capture(self.page, "note")
            .await?
            .ok_or_else(|| HarvestError::NoteUnavailable("note state missing".into()))?;
        let entry = state
            .get_path(&["noteDetailMap", feed_id])
            .ok_or_else(|| HarvestError::NoteUnavailable(format!("note {feed_id} not in page state")))?;

        let note_value = entry.get("note").cloned().unwrap_or_default();
        if note_value.is_null() {
            return Err(HarvestError::NoteUnavailable(format!("note {feed_id} has no body")));
        }
        let note: NoteDetail = serde_json::from_value(note_value)
            .map_err(|e| HarvestError::MalformedRecords(format!("note detail: {e}")))?;
        let comments: CommentList = match entry.get("comments") {
            Some(v) if !v.is_null() => serde_json::from_value(v.clone())
                .map_err(|e| HarvestError::MalformedRecords(format!("comments: {e}")))?,
            _ => CommentList::default(),
        };

        Ok(FeedDetail { note, comments })
    }
}

#[cfg(test)]
#[path = "comments_tests.rs"]
mod tests;
