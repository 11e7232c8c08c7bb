//! Search filter translation.
//!
//! Human-readable option values map to directives naming the panel group
//! and tag to click. Groups and tags are 1-based, matching the order in
//! which the search page lays them out.

use std::time::Duration;

use rednote_protocols::Page;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::HarvestError;
use crate::harvest::StabilityWaiter;
use crate::page_ext::PageExt;

/// Filters accepted by a search; empty fields are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FilterOption {
    /// 排序依据: 综合|最新|最多点赞|最多评论|最多收藏,默认为'综合'
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sort_by: String,
    /// 笔记类型: 不限|视频|图文,默认为'不限'
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note_type: String,
    /// 发布时间: 不限|一天内|一周内|半年内,默认为'不限'
    #[serde(skip_serializing_if = "String::is_empty")]
    pub publish_time: String,
    /// 搜索范围: 不限|已看过|未看过|已关注,默认为'不限'
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search_scope: String,
    /// 位置距离: 不限|同城|附近,默认为'不限'
    #[serde(skip_serializing_if = "String::is_empty")]
    pub location: String,
}

impl FilterOption {
    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|(_, v)| v.trim().is_empty())
    }

    fn values(&self) -> [(FilterCategory, &str); 5] {
        [
            (FilterCategory::SortBy, self.sort_by.as_str()),
            (FilterCategory::NoteType, self.note_type.as_str()),
            (FilterCategory::PublishTime, self.publish_time.as_str()),
            (FilterCategory::SearchScope, self.search_scope.as_str()),
            (FilterCategory::Location, self.location.as_str()),
        ]
    }
}

/// A filter group on the search page, in panel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    SortBy,
    NoteType,
    PublishTime,
    SearchScope,
    Location,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 5] = [
        FilterCategory::SortBy,
        FilterCategory::NoteType,
        FilterCategory::PublishTime,
        FilterCategory::SearchScope,
        FilterCategory::Location,
    ];

    /// Request field carrying this category.
    pub fn field(self) -> &'static str {
        match self {
            FilterCategory::SortBy => "sort_by",
            FilterCategory::NoteType => "note_type",
            FilterCategory::PublishTime => "publish_time",
            FilterCategory::SearchScope => "search_scope",
            FilterCategory::Location => "location",
        }
    }

    pub fn options(self) -> &'static [&'static str] {
        match self {
            FilterCategory::SortBy => &["综合", "最新", "最多点赞", "最多评论", "最多收藏"],
            FilterCategory::NoteType => &["不限", "视频", "图文"],
            FilterCategory::PublishTime => &["不限", "一天内", "一周内", "半年内"],
            FilterCategory::SearchScope => &["不限", "已看过", "未看过", "已关注"],
            FilterCategory::Location => &["不限", "同城", "附近"],
        }
    }

    pub fn group_index(self) -> usize {
        match self {
            FilterCategory::SortBy => 1,
            FilterCategory::NoteType => 2,
            FilterCategory::PublishTime => 3,
            FilterCategory::SearchScope => 4,
            FilterCategory::Location => 5,
        }
    }
}

/// One validated filter click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalFilterDirective {
    pub category: FilterCategory,
    pub value: String,
    pub group_index: usize,
    pub tag_index: usize,
}

impl InternalFilterDirective {
    /// Selector of the tag this directive clicks.
    pub fn selector(&self) -> String {
        format!(
            "div.filter-panel div.filters:nth-child({}) div.tags:nth-child({})",
            self.group_index, self.tag_index
        )
    }
}

/// Maps [`FilterOption`] to [`InternalFilterDirective`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterTranslator;

impl FilterTranslator {
    /// Directives in the fixed order sort, kind, recency, scope, proximity.
    ///
    /// The first unknown value aborts with
    /// [`HarvestError::FilterValueNotFound`].
    pub fn translate(&self, option: &FilterOption) -> Result<Vec<InternalFilterDirective>, HarvestError> {
        let mut directives = Vec::new();
        for (category, raw) in option.values() {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }
            let tag_index = category
                .options()
                .iter()
                .position(|o| *o == value)
                .ok_or_else(|| HarvestError::FilterValueNotFound {
                    field: category.field().to_string(),
                    value: value.to_string(),
                })?;
            directives.push(InternalFilterDirective {
                category,
                value: value.to_string(),
                group_index: category.group_index(),
                tag_index: tag_index + 1,
            });
        }
        Ok(directives)
    }

    /// Check a directive's coordinates against its category.
    pub fn validate(&self, directive: &InternalFilterDirective) -> Result<(), HarvestError> {
        let options = directive.category.options();
        let in_range = directive.group_index == directive.category.group_index()
            && (1..=options.len()).contains(&directive.tag_index);
        if !in_range || options[directive.tag_index - 1] != directive.value {
            return Err(HarvestError::InvalidInput(format!(
                "filter directive {}={} out of range (group {}, tag {})",
                directive.category.field(),
                directive.value,
                directive.group_index,
                directive.tag_index
            )));
        }
        Ok(())
    }

    /// Open the filter panel and click each directive's tag.
    pub async fn apply(
        &self,
        page: &dyn Page,
        directives: &[InternalFilterDirective],
        waiter: &StabilityWaiter,
    ) -> Result<(), HarvestError> {
        if directives.is_empty() {
            return Ok(());
        }
        if !page.eval_bool(OPEN_PANEL_SCRIPT).await {
            return Err(HarvestError::ActionFailed("filter panel not found".into()));
        }
        if !page.wait_for_selector("div.filter-panel", Duration::from_secs(5)).await? {
            return Err(HarvestError::ActionFailed("filter panel did not open".into()));
        }

        for directive in directives {
            self.validate(directive)?;
            let selector = directive.selector();
            debug!("Applying filter {}={}", directive.category.field(), directive.value);
            if !page.click_selector(&selector).await? {
                return Err(HarvestError::ActionFailed(format!(
                    "filter tag not found: {}",
                    selector
                )));
            }
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        waiter.await_stable(page).await;
        info!("Applied {} search filters", directives.len());
        Ok(())
    }
}

const OPEN_PANEL_SCRIPT: &str = r#"(() => {
  const trigger = document.querySelector('div.filter');
  if (!trigger) return false;
  trigger.dispatchEvent(new MouseEvent('mouseenter', { bubbles: true }));
  trigger.dispatchEvent(new MouseEvent('mouseover', { bubbles: true }));
  return true;
})()"#;

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
