//! Heuristics applied to extracted batches. None of these fail.

use std::collections::HashSet;

use rednote_protocols::Page;
use tracing::debug;
use url::Url;

use crate::models::HarvestRecord;
use crate::page_ext::PageExt;
use crate::state::string_probe;

/// Remove the viewer's own records from the head of a saved list.
///
/// Only the leading contiguous run is removed. A run covering the whole
/// batch, or a blank viewer id, leaves the batch untouched.
pub fn trim_leading_self_authored<R: HarvestRecord>(mut records: Vec<R>, viewer_id: &str) -> Vec<R> {
    let viewer_id = viewer_id.trim();
    if records.is_empty() || viewer_id.is_empty() {
        return records;
    }

    let run = records
        .iter()
        .take_while(|r| r.author_id().trim() == viewer_id)
        .count();
    if run > 0 && run < records.len() {
        debug!("Trimmed {} leading self-authored records", run);
        records.drain(..run);
    }
    records
}

/// Number of distinct non-blank authors.
pub fn distinct_author_count<R: HarvestRecord>(records: &[R]) -> usize {
    records
        .iter()
        .map(|r| r.author_id().trim())
        .filter(|id| !id.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// The `{id}` of a `/user/profile/{id}` URL.
pub fn profile_user_id_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    match (segments.next(), segments.next(), segments.next()) {
        (Some("user"), Some("profile"), Some(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
        _ => None,
    }
}

/// Whether the page shows the saved tab of a profile.
pub async fn is_saved_view(page: &dyn Page) -> bool {
    let url = page.current_url().await.unwrap_or_default();
    if url.contains("tab=fav") {
        return true;
    }
    page.eval_string(&string_probe("user", &["activeTab"]))
        .await
        .trim()
        .eq_ignore_ascii_case("fav")
}

/// Id of the profile being viewed, else of the logged-in user.
pub async fn viewer_id(page: &dyn Page) -> Option<String> {
    let url = page.current_url().await.unwrap_or_default();
    if let Some(id) = profile_user_id_from_url(&url) {
        return Some(id);
    }
    for field in ["userId", "userid"] {
        let id = page.eval_string(&string_probe("user", &["userInfo", field])).await;
        let id = id.trim();
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }
    None
}

/// Apply [`trim_leading_self_authored`] when the page is the saved view.
pub async fn filter_owner_posts<R: HarvestRecord>(page: &dyn Page, records: Vec<R>) -> Vec<R> {
    if records.is_empty() || !is_saved_view(page).await {
        return records;
    }
    match viewer_id(page).await {
        Some(id) => trim_leading_self_authored(records, &id),
        None => records,
    }
}

#[cfg(test)]
#[path = "postprocess_tests.rs"]
mod tests;
