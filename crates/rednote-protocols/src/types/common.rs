//! Common utility types.

use serde::{Deserialize, Serialize};

/// Risk level for operations.
///
/// Read-only tools are `Low`; anything that writes to the account
/// (publishing, commenting, liking, deleting cookies) is `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    High,
}

impl RiskLevel {
    /// Whether a tool at this level changes remote state.
    pub fn is_destructive(&self) -> bool {
        matches!(self, RiskLevel::High)
    }
}
