//! Harvest errors.

use rednote_protocols::PageError;
use thiserror::Error;

/// Failure of a harvest or account action.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Extraction found no record array, or an empty one.
    #[error("no records found in page state")]
    NoRecordsFound,

    /// Extraction found records that could not be decoded.
    #[error("malformed records: {0}")]
    MalformedRecords(String),

    /// The first extraction of a harvest yielded nothing.
    #[error("no feeds found")]
    NoFeeds,

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("筛选项 {field} 未找到文本 \"{value}\"")]
    FilterValueNotFound { field: String, value: String },

    #[error("note unavailable: {0}")]
    NoteUnavailable(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A UI step of an account action did not take effect.
    #[error("action failed: {0}")]
    ActionFailed(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Page(#[from] PageError),
}

impl HarvestError {
    /// Errors that end a harvest even inside a retrying round.
    pub fn is_fatal(&self) -> bool {
        match self {
            HarvestError::Cancelled => true,
            HarvestError::Page(e) => e.is_fatal(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_error_names_field_and_value() {
        let err = HarvestError::FilterValueNotFound {
            field: "note_type".into(),
            value: "不存在的类型".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("未找到文本"));
        assert!(msg.contains("note_type"));
        assert!(msg.contains("不存在的类型"));
    }

    #[test]
    fn test_is_fatal() {
        assert!(HarvestError::Cancelled.is_fatal());
        assert!(HarvestError::Page(PageError::Closed).is_fatal());
        assert!(!HarvestError::Page(PageError::Evaluation("x".into())).is_fatal());
        assert!(!HarvestError::NoRecordsFound.is_fatal());
    }

    #[test]
    fn test_page_error_is_transparent() {
        let err: HarvestError = PageError::Timeout("Runtime.evaluate".into()).into();
        assert_eq!(err.to_string(), "Page operation timed out: Runtime.evaluate");
    }
}
