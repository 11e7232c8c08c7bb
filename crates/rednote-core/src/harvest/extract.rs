//! Record extraction from a state subtree.

use rednote_protocols::Page;
use serde_json::Value;
use tracing::debug;

use crate::error::HarvestError;
use crate::models::HarvestRecord;
use crate::state::{capture, flatten_one, KeyPattern, StateAccessor};

/// Locates and decodes a record list inside `window.__INITIAL_STATE__`.
///
/// The list is read from `primary` under `root`; when that is missing or
/// empty, top-level keys of `root` matching `synonyms` are tried in order.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    root: String,
    primary: Vec<String>,
    synonyms: Option<KeyPattern>,
}

impl RecordExtractor {
    pub fn new(root: impl Into<String>, primary: &[&str]) -> Self {
        Self {
            root: root.into(),
            primary: primary.iter().map(|s| s.to_string()).collect(),
            synonyms: None,
        }
    }

    pub fn with_synonyms(mut self, pattern: KeyPattern) -> Self {
        self.synonyms = Some(pattern);
        self
    }

    /// `user.notes`, falling back to saved-looking keys of `user`.
    pub fn saved_feeds() -> Self {
        Self::new("user", &["notes"]).with_synonyms(KeyPattern::saved())
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Snapshot the configured root from the page and decode its records.
    pub async fn extract<R: HarvestRecord>(&self, page: &dyn Page) -> Result<Vec<R>, HarvestError> {
        let state = capture(page, &self.root)
            .await?
            .ok_or(HarvestError::NoRecordsFound)?;
        self.records_from_state(&state)
    }

    /// Decode records from an already captured subtree.
    pub fn records_from_state<R: HarvestRecord>(
        &self,
        state: &StateAccessor,
    ) -> Result<Vec<R>, HarvestError> {
        let primary: Vec<&str> = self.primary.iter().map(String::as_str).collect();
        let mut malformed = None;

        if let Some(located) = state.get_path(&primary) {
            match decode_list::<R>(located) {
                Ok(records) if !records.is_empty() => return Ok(records),
                Ok(_) => {}
                Err(e) => malformed = Some(e),
            }
        }

        if let Some(pattern) = &self.synonyms {
            let exclude = primary.first().copied().unwrap_or_default();
            for (key, located) in state.find_keys(pattern, exclude) {
                match decode_list::<R>(located) {
                    Ok(records) if !records.is_empty() => {
                        debug!("Records located under synonym key '{}'", key);
                        return Ok(records);
                    }
                    Ok(_) => {}
                    Err(e) => malformed = malformed.or(Some(e)),
                }
            }
        }

        Err(malformed.unwrap_or(HarvestError::NoRecordsFound))
    }
}

/// Decode a located value as a record list.
///
/// `Ok(empty)` for null or empty arrays; `MalformedRecords` for a non-empty
/// value that yields no usable record.
fn decode_list<R: HarvestRecord>(located: &Value) -> Result<Vec<R>, HarvestError> {
    match located {
        Value::Null => return Ok(Vec::new()),
        Value::Array(_) => {}
        Value::Object(map) if map.is_empty() => return Ok(Vec::new()),
        other => {
            return Err(HarvestError::MalformedRecords(format!(
                "expected a record list, found {}",
                kind_of(other)
            )));
        }
    }

    let items = flatten_one(located);
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let total = items.len();
    let mut last_error = None;
    let records: Vec<R> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<R>(item) {
            Ok(record) if !record.id().trim().is_empty() => Some(record),
            Ok(_) => None,
            Err(e) => {
                last_error = Some(e.to_string());
                None
            }
        })
        .collect();

    if records.is_empty() {
        return Err(HarvestError::MalformedRecords(format!(
            "none of {total} items decoded{}",
            last_error.map(|e| format!(": {e}")).unwrap_or_default()
        )));
    }
    if records.len() < total {
        debug!("Dropped {} of {} undecodable records", total - records.len(), total);
    }
    Ok(records)
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
