use async_trait::async_trait;
use serde_json::Value;

use super::{ToolContext, ToolDefinition, ToolResult};
use crate::error::ToolError;
use crate::types::RiskLevel;

/// One operation an MCP client can call by name.
///
/// Implementations decode `params` themselves; the registry only runs the
/// shape check in [`Tool::validate`] first.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    async fn execute(&self, params: Value, ctx: ToolContext) -> Result<ToolResult, ToolError>;

    /// Reject arguments that cannot match an object schema. `null` passes,
    /// since clients send it for tools without arguments.
    fn validate(&self, params: &Value) -> Result<(), ToolError> {
        let wants_object = self
            .definition()
            .parameters_schema
            .as_ref()
            .and_then(|schema| schema.get("type"))
            .and_then(Value::as_str)
            == Some("object");

        if wants_object && !matches!(params, Value::Object(_) | Value::Null) {
            return Err(ToolError::ValidationFailed("arguments must be an object".to_string()));
        }
        Ok(())
    }

    fn risk_level(&self) -> RiskLevel {
        self.definition().risk_level
    }
}
