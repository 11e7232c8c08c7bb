//! JSON-RPC dispatch for the MCP endpoint.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use rednote_protocols::{ToolContext, ToolDefinition, ToolError};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use super::protocol::{
    CallToolParams, McpError, McpMethod, McpRequest, McpResponse, McpToolDefinition, McpToolResult,
    ToolAnnotations, JSONRPC_VERSION,
};
use super::registry::ToolRegistry;

pub const SERVER_NAME: &str = "xiaohongshu-mcp";
pub const SERVER_VERSION: &str = "2.0.0";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-03-26";

/// Answers MCP requests against a [`ToolRegistry`].
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        info!("MCP server ready with {} tools", registry.len());
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle a raw request body: one message or a batch.
    ///
    /// Returns `None` when nothing needs to be sent back (notifications only).
    pub async fn handle_payload(&self, body: &[u8]) -> Option<Value> {
        let payload: Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                debug!("Unreadable MCP payload: {}", e);
                return to_value(McpResponse::error(None, McpError::parse_error().with_data(e.to_string())));
            }
        };

        match payload {
            Value::Array(items) if items.is_empty() => {
                to_value(McpResponse::error(None, McpError::invalid_request()))
            }
            Value::Array(items) => {
                let mut replies = Vec::new();
                for item in items {
                    if let Some(reply) = self.handle_value(item).await {
                        replies.push(reply);
                    }
                }
                (!replies.is_empty()).then_some(Value::Array(replies))
            }
            single => self.handle_value(single).await,
        }
    }

    async fn handle_value(&self, value: Value) -> Option<Value> {
        match serde_json::from_value::<McpRequest>(value) {
            Ok(request) => self.handle(request).await.and_then(to_value),
            Err(e) => to_value(McpResponse::error(
                None,
                McpError::invalid_request().with_data(e.to_string()),
            )),
        }
    }

    /// Handle one request. Notifications produce no response.
    pub async fn handle(&self, request: McpRequest) -> Option<McpResponse> {
        let Some(id) = request.id.clone() else {
            debug!("MCP notification: {}", request.method);
            return None;
        };
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(McpResponse::error(
                Some(id),
                McpError::invalid_request().with_data("jsonrpc must be \"2.0\""),
            ));
        }

        let params = request.params.unwrap_or(Value::Null);
        let result = match McpMethod::parse(&request.method) {
            Some(McpMethod::Initialize) => Ok(self.initialize(&params)),
            Some(McpMethod::Ping) => Ok(json!({})),
            Some(McpMethod::ListTools) => Ok(self.list_tools()),
            Some(McpMethod::CallTool) => self.call_tool(params).await,
            Some(McpMethod::Initialized) | None => {
                Err(McpError::method_not_found().with_data(request.method.clone()))
            }
        };

        Some(match result {
            Ok(value) => McpResponse::success(id, value),
            Err(err) => McpResponse::error(Some(id), err),
        })
    }

    fn initialize(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);
        info!("MCP client initialized (protocol {})", protocol_version);
        json!({
            "protocolVersion": protocol_version,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<McpToolDefinition> = self.registry.list().iter().map(describe).collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, McpError> {
        let CallToolParams { name, arguments } = serde_json::from_value(params)
            .map_err(|e| McpError::invalid_params().with_data(e.to_string()))?;
        let tool = self
            .registry
            .get(&name)
            .ok_or_else(|| McpError::invalid_params().with_data(format!("Unknown tool: {name}")))?;

        let arguments = if arguments.is_null() { json!({}) } else { arguments };
        tool.validate(&arguments)
            .map_err(|e| McpError::invalid_params().with_data(e.to_string()))?;

        let ctx = ToolContext::new("mcp");
        info!(tool = %name, call_id = %ctx.call_id, "Calling MCP tool");
        let outcome = AssertUnwindSafe(tool.execute(arguments, ctx.clone()))
            .catch_unwind()
            .await;
        debug!(tool = %name, call_id = %ctx.call_id, elapsed_ms = ctx.elapsed().as_millis() as u64, "MCP tool returned");

        let result = match outcome {
            Ok(Ok(result)) => McpToolResult::from(result),
            Ok(Err(ToolError::InvalidParameters(msg) | ToolError::ValidationFailed(msg))) => {
                return Err(McpError::invalid_params().with_data(msg));
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(tool = %name, panic = %reason, "Tool handler panicked");
                McpToolResult::error(format!(
                    "工具 {name} 执行时发生内部错误: {reason}\n\n请查看服务端日志获取详细信息。"
                ))
            }
        };
        serde_json::to_value(result).map_err(|e| McpError::internal_error().with_data(e.to_string()))
    }
}

fn describe(definition: &ToolDefinition) -> McpToolDefinition {
    let destructive = definition.risk_level.is_destructive();
    McpToolDefinition {
        name: definition.id.clone(),
        description: Some(definition.description.clone()),
        input_schema: definition.input_schema(),
        annotations: Some(ToolAnnotations {
            title: definition.name.clone(),
            read_only_hint: (!destructive).then_some(true),
            destructive_hint: destructive.then_some(true),
        }),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn to_value(response: McpResponse) -> Option<Value> {
    match serde_json::to_value(response) {
        Ok(v) => Some(v),
        Err(e) => {
            error!("Failed to encode MCP response: {}", e);
            None
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
