use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A base64 image shipped next to a tool's text output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolImage {
    pub data: String,
    pub mime_type: String,
}

/// Outcome of one tool call.
///
/// A failed call still carries `content`, so MCP clients that only render
/// text see the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ToolImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    fn text(success: bool, content: String, error: Option<String>) -> Self {
        Self {
            success,
            content,
            images: Vec::new(),
            error,
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::text(true, content.into(), None)
    }

    /// Pretty-printed JSON, which is how MCP clients show structured output.
    pub fn success_json(output: Value) -> Self {
        let content = serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string());
        Self::text(true, content, None)
    }

    pub fn error(error: impl Into<String>) -> Self {
        let error = error.into();
        Self::text(false, error.clone(), Some(error))
    }

    pub fn with_image(mut self, data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.images.push(ToolImage {
            data: data.into(),
            mime_type: mime_type.into(),
        });
        self
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
