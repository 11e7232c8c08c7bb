//! Publishing image and video notes through the creator center.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, TimeDelta};
use rednote_protocols::Page;
use tracing::{debug, info};

use crate::error::HarvestError;
use crate::harvest::{Matcher, StabilityWaiter, TextMatcher};
use crate::page_ext::{js_string, PageExt};

pub const MAX_TITLE_LENGTH: usize = 20;

const PUBLISH_URL: &str = "https://creator.xiaohongshu.com/publish/publish?source=official";
const FILE_INPUT: &str = ".upload-input";
const TITLE_INPUT: &str = "div.d-input input";
const CONTENT_EDITOR: &str = "div.ql-editor";
const TOPIC_ITEM: &str = "#creator-editor-topic-container .item";
const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M";
const IMAGE_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const VIDEO_UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Displayed title length: each non-ASCII character counts 1, ASCII
/// characters count half, rounded up.
pub fn title_length(title: &str) -> usize {
    let (ascii, wide) = title
        .chars()
        .fold((0usize, 0usize), |(a, w), c| if c.is_ascii() { (a + 1, w) } else { (a, w + 1) });
    wide + ascii.div_ceil(2)
}

pub fn validate_title(title: &str) -> Result<(), HarvestError> {
    if title.trim().is_empty() {
        return Err(HarvestError::InvalidInput("标题不能为空".into()));
    }
    if title_length(title) > MAX_TITLE_LENGTH {
        return Err(HarvestError::InvalidInput("标题长度超过限制".into()));
    }
    Ok(())
}

/// Parse an optional RFC 3339 schedule, requiring `[now+1h, now+14d]`.
pub fn validate_schedule(
    raw: Option<&str>,
    now: DateTime<Local>,
) -> Result<Option<DateTime<FixedOffset>>, HarvestError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let at = DateTime::parse_from_rfc3339(raw).map_err(|e| {
        HarvestError::InvalidInput(format!("定时发布时间格式错误，请使用 ISO8601 格式: {e}"))
    })?;
    let earliest = now + TimeDelta::hours(1);
    let latest = now + TimeDelta::days(14);
    if at < earliest {
        return Err(HarvestError::InvalidInput(format!(
            "定时发布时间必须至少在1小时后，当前设置: {}，最早可选: {}",
            at.format(SCHEDULE_FORMAT),
            earliest.format(SCHEDULE_FORMAT)
        )));
    }
    if at > latest {
        return Err(HarvestError::InvalidInput(format!(
            "定时发布时间不能超过14天，当前设置: {}，最晚可选: {}",
            at.format(SCHEDULE_FORMAT),
            latest.format(SCHEDULE_FORMAT)
        )));
    }
    Ok(Some(at))
}

/// An image note ready to publish; images are local files.
#[derive(Debug, Clone)]
pub struct PublishImageContent {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub image_paths: Vec<PathBuf>,
    pub schedule_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone)]
pub struct PublishVideoContent {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub video_path: PathBuf,
    pub schedule_at: Option<DateTime<FixedOffset>>,
}

/// Drives the creator-center publish form.
pub struct PublishAction<'a> {
    page: &'a dyn Page,
    waiter: StabilityWaiter,
}

impl<'a> PublishAction<'a> {
    pub fn new(page: &'a dyn Page) -> Self {
        Self {
            page,
            waiter: StabilityWaiter::default(),
        }
    }

    pub async fn publish_images(&self, note: &PublishImageContent) -> Result<(), HarvestError> {
        validate_title(&note.title)?;
        if note.image_paths.is_empty() {
            return Err(HarvestError::InvalidInput("at least one image is required".into()));
        }
        self.open_tab("上传图文").await?;
        self.upload(&note.image_paths).await?;
        self.wait_for(
            &format!(
                "(() => document.querySelectorAll('.img-preview-area .pr').length >= {})()",
                note.image_paths.len()
            ),
            IMAGE_UPLOAD_TIMEOUT,
            "image upload",
        )
        .await?;
        self.fill_and_submit(&note.title, &note.content, &note.tags, note.schedule_at)
            .await?;
        info!("Published image note '{}' ({} images)", note.title, note.image_paths.len());
        Ok(())
    }

    pub async fn publish_video(&self, note: &PublishVideoContent) -> Result<(), HarvestError> {
        validate_title(&note.title)?;
        if !tokio::fs::try_exists(&note.video_path).await.unwrap_or(false) {
            return Err(HarvestError::InvalidInput(format!(
                "视频文件不存在或不可访问: {}",
                note.video_path.display()
            )));
        }
        self.open_tab("上传视频").await?;
        self.upload(std::slice::from_ref(&note.video_path)).await?;
        self.wait_for(VIDEO_READY_SCRIPT, VIDEO_UPLOAD_TIMEOUT, "video processing")
            .await?;
        self.fill_and_submit(&note.title, &note.content, &note.tags, note.schedule_at)
            .await?;
        info!("Published video note '{}'", note.title);
        Ok(())
    }

    async fn open_tab(&self, label: &str) -> Result<(), HarvestError> {
        self.page.navigate(PUBLISH_URL).await?;
        let _ = self.page.wait_load().await;
        self.waiter.await_stable(self.page).await;

        let tab = Matcher::Text(
            TextMatcher::new("div.creator-tab, .creator-tab span", &[label])
                .visible_only(),
        );
        if !tab.try_click(self.page).await {
            return Err(HarvestError::ActionFailed(format!("publish tab '{label}' not found")));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(())
    }

    async fn upload(&self, files: &[PathBuf]) -> Result<(), HarvestError> {
        let input = self
            .page
            .find(FILE_INPUT)
            .await?
            .ok_or_else(|| HarvestError::ActionFailed("upload input not found".into()))?;
        self.page.set_file_input(&input, files).await?;
        debug!("Attached {} file(s)", files.len());
        Ok(())
    }

    async fn wait_for(&self, script: &str, timeout: Duration, what: &str) -> Result<(), HarvestError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.page.eval_bool(script).await {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(HarvestError::ActionFailed(format!("{what} timed out")));
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    async fn fill_and_submit(
        &self,
        title: &str,
        content: &str,
        tags: &[String],
        schedule_at: Option<DateTime<FixedOffset>>,
    ) -> Result<(), HarvestError> {
        if !self.page.click_selector(TITLE_INPUT).await? {
            return Err(HarvestError::ActionFailed("title input not found".into()));
        }
        self.page.insert_text(title).await?;

        if !self.page.click_selector(CONTENT_EDITOR).await? {
            return Err(HarvestError::ActionFailed("content editor not found".into()));
        }
        self.page.insert_text(content).await?;

        for tag in tags.iter().map(|t| t.trim().trim_start_matches('#')).filter(|t| !t.is_empty()) {
            self.page.insert_text(&format!(" #{tag}")).await?;
            tokio::time::sleep(Duration::from_millis(800)).await;
            if !self.page.click_selector(TOPIC_ITEM).await? {
                self.page.press_key("Space").await?;
            }
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        if let Some(at) = schedule_at {
            self.set_schedule(at).await?;
        }

        let submit = Matcher::Text(
            TextMatcher::new("div.submit button, div.submit .d-button-content", &["发布", "定时发布"])
                .visible_only(),
        );
        if !submit.try_click(self.page).await {
            return Err(HarvestError::ActionFailed("publish button not found".into()));
        }
        self.wait_for(PUBLISHED_SCRIPT, Duration::from_secs(15), "publish confirmation")
            .await
    }

    async fn set_schedule(&self, at: DateTime<FixedOffset>) -> Result<(), HarvestError> {
        let toggle = Matcher::Text(TextMatcher::new("label, span, div.d-checkbox", &["定时发布"]).prefix());
        if !toggle.try_click(self.page).await {
            return Err(HarvestError::ActionFailed("schedule switch not found".into()));
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
        let value = at.with_timezone(&Local).format(SCHEDULE_FORMAT).to_string();
        let script = format!(
            r#"(() => {{
  const input = document.querySelector('.date-picker input, input[placeholder*="时间"]');
  if (!input) return false;
  const setter = Object.getOwnPropertyDescriptor(HTMLInputElement.prototype, 'value').set;
  setter.call(input, {value});
  input.dispatchEvent(new Event('input', {{ bubbles: true }}));
  input.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return true;
}})()"#,
            value = js_string(&value)
        );
        if !self.page.eval_bool(&script).await {
            return Err(HarvestError::ActionFailed("schedule input not found".into()));
        }
        info!("Scheduled for {}", value);
        Ok(())
    }
}

const VIDEO_READY_SCRIPT: &str = r#"(() => {
  const btn = document.querySelector('div.submit button');
  const uploading = document.querySelector('.upload-video .progress, .uploading');
  return !!btn && !btn.disabled && !uploading;
})()"#;

const PUBLISHED_SCRIPT: &str = r#"(() => location.href.includes('published=true')
  || (document.body && document.body.innerText.includes('发布成功')))()"#;

#[cfg(test)]
#[path = "publish_tests.rs"]
mod tests;
