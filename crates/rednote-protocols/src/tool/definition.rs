use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::types::RiskLevel;

/// What a tool advertises to MCP clients in `tools/list`.
///
/// `id` is the wire name clients call; `name` becomes the annotation title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    /// JSON Schema for `arguments`. Absent means the tool takes none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters_schema: Option<Value>,
    #[serde(default)]
    pub risk_level: RiskLevel,
}

impl ToolDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            parameters_schema: None,
            risk_level: RiskLevel::default(),
        }
    }

    pub fn with_parameters_schema(self, schema: Value) -> Self {
        Self {
            parameters_schema: Some(schema),
            ..self
        }
    }

    pub fn with_risk_level(self, risk_level: RiskLevel) -> Self {
        Self { risk_level, ..self }
    }

    /// MCP requires an object schema even for argument-less tools.
    pub fn input_schema(&self) -> Value {
        match &self.parameters_schema {
            Some(schema) => schema.clone(),
            None => json!({"type": "object", "properties": {}}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tool_is_low_risk_without_schema() {
        let def = ToolDefinition::new("search_feeds", "Search Feeds", "Search notes by keyword");
        assert_eq!(def.id, "search_feeds");
        assert_eq!(def.risk_level, RiskLevel::Low);
        assert!(def.parameters_schema.is_none());
    }

    #[test]
    fn test_argumentless_tool_advertises_empty_object() {
        let schema = ToolDefinition::new("list_feeds", "List Feeds", "Home feed").input_schema();
        assert_eq!(schema, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn test_builders_keep_other_fields() {
        let schema = json!({
            "type": "object",
            "properties": {"keyword": {"type": "string"}},
            "required": ["keyword"]
        });
        let def = ToolDefinition::new("publish_content", "Publish Content", "Publish")
            .with_parameters_schema(schema.clone())
            .with_risk_level(RiskLevel::High);
        assert_eq!(def.input_schema(), schema);
        assert_eq!(def.risk_level, RiskLevel::High);
        assert_eq!(def.name, "Publish Content");
    }

    #[test]
    fn test_serialized_form() {
        let json = serde_json::to_value(ToolDefinition::new("a", "A", "desc")).unwrap();
        assert!(json.get("parameters_schema").is_none());
        assert_eq!(json["risk_level"], "low");
    }
}
