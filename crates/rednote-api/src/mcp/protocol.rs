//! JSON-RPC 2.0 messages as this MCP server reads and writes them.

use rednote_protocols::ToolResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// An incoming message. Without an `id` it is a notification and gets no
/// reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl McpRequest {
    fn build(id: Option<RequestId>, method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            method: method.into(),
            params: None,
        }
    }

    pub fn new(id: impl Into<RequestId>, method: impl Into<String>) -> Self {
        Self::build(Some(id.into()), method)
    }

    pub fn notification(method: impl Into<String>) -> Self {
        Self::build(None, method)
    }

    pub fn with_params(self, params: Value) -> Self {
        Self {
            params: Some(params),
            ..self
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// A reply. Exactly one of `result` and `error` is set; `id` stays `null`
/// when the request itself could not be read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    pub fn success(id: impl Into<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id: Some(id.into()),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RequestId>, error: McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

/// Reserved JSON-RPC error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
}

impl ErrorCode {
    fn message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<ErrorCode> for McpError {
    fn from(code: ErrorCode) -> Self {
        Self {
            code: code as i32,
            message: code.message().into(),
            data: None,
        }
    }
}

impl McpError {
    /// Attach detail, usually the underlying error text.
    pub fn with_data(self, data: impl Into<Value>) -> Self {
        Self {
            data: Some(data.into()),
            ..self
        }
    }

    pub fn parse_error() -> Self {
        ErrorCode::ParseError.into()
    }

    pub fn invalid_request() -> Self {
        ErrorCode::InvalidRequest.into()
    }

    pub fn method_not_found() -> Self {
        ErrorCode::MethodNotFound.into()
    }

    pub fn invalid_params() -> Self {
        ErrorCode::InvalidParams.into()
    }

    pub fn internal_error() -> Self {
        ErrorCode::InternalError.into()
    }
}

/// The methods this server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpMethod {
    Initialize,
    Initialized,
    Ping,
    ListTools,
    CallTool,
}

const METHOD_NAMES: [(McpMethod, &str); 5] = [
    (McpMethod::Initialize, "initialize"),
    (McpMethod::Initialized, "notifications/initialized"),
    (McpMethod::Ping, "ping"),
    (McpMethod::ListTools, "tools/list"),
    (McpMethod::CallTool, "tools/call"),
];

impl McpMethod {
    pub fn as_str(self) -> &'static str {
        METHOD_NAMES
            .iter()
            .find_map(|(m, name)| (*m == self).then_some(*name))
            .unwrap_or_default()
    }

    pub fn parse(method: &str) -> Option<Self> {
        METHOD_NAMES
            .iter()
            .find_map(|(m, name)| (*name == method).then_some(*m))
    }
}

/// Client-facing hints for one tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
}

/// One entry of `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolDefinition {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// The `result` of `tools/call`: text and image blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolResult {
    pub content: Vec<McpContent>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl McpToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }
}

impl From<ToolResult> for McpToolResult {
    /// Text first, then images. An image-only result carries no empty text
    /// block.
    fn from(result: ToolResult) -> Self {
        let text = (!result.content.is_empty() || result.images.is_empty())
            .then(|| McpContent::Text { text: result.content });
        let images = result.images.into_iter().map(|image| McpContent::Image {
            data: image.data,
            mime_type: image.mime_type,
        });
        Self {
            content: text.into_iter().chain(images).collect(),
            is_error: !result.success,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpContent {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
