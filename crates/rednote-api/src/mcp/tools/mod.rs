//! The fourteen xiaohongshu tools exposed over MCP.
//!
//! Each tool is a thin adapter: parse arguments, call [`XhsService`], and
//! render the outcome as a [`ToolResult`]. Service failures become `isError`
//! results carrying the same Chinese messages the REST surface uses.

mod account;
mod engage;
mod feeds;
mod publish;

use std::sync::Arc;

use rednote_protocols::{ToolError, ToolResult};
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::registry::{RegistryError, ToolRegistry};
use crate::service::{ServiceError, XhsService};

pub use account::{CheckLoginStatusTool, DeleteCookiesTool, GetLoginQrcodeTool};
pub use engage::{FavoriteFeedTool, LikeFeedTool, PostCommentTool, ReplyCommentTool};
pub use feeds::{
    normalize_saved_feeds_limit, FeedDetailArgs, GetFeedDetailTool, ListFeedsTool, ListSavedFeedsArgs,
    ListSavedFeedsTool, SearchFeedsTool, UserProfileTool,
};
pub use publish::{PublishContentTool, PublishVideoTool};

/// Register every tool backed by `service`.
pub fn register_all(registry: &ToolRegistry, service: Arc<XhsService>) -> Result<(), RegistryError> {
    registry.register(Arc::new(CheckLoginStatusTool::new(service.clone())))?;
    registry.register(Arc::new(GetLoginQrcodeTool::new(service.clone())))?;
    registry.register(Arc::new(DeleteCookiesTool::new(service.clone())))?;
    registry.register(Arc::new(PublishContentTool::new(service.clone())))?;
    registry.register(Arc::new(PublishVideoTool::new(service.clone())))?;
    registry.register(Arc::new(ListFeedsTool::new(service.clone())))?;
    registry.register(Arc::new(SearchFeedsTool::new(service.clone())))?;
    registry.register(Arc::new(ListSavedFeedsTool::new(service.clone())))?;
    registry.register(Arc::new(GetFeedDetailTool::new(service.clone())))?;
    registry.register(Arc::new(UserProfileTool::new(service.clone())))?;
    registry.register(Arc::new(PostCommentTool::new(service.clone())))?;
    registry.register(Arc::new(ReplyCommentTool::new(service.clone())))?;
    registry.register(Arc::new(LikeFeedTool::new(service.clone())))?;
    registry.register(Arc::new(FavoriteFeedTool::new(service)))?;
    Ok(())
}

/// JSON schema for a tool's arguments, with nested types inlined.
pub(crate) fn input_schema<T: JsonSchema>() -> serde_json::Value {
    let schema = SchemaSettings::draft07()
        .with(|s| s.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<T>();
    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}));
    if let Some(map) = value.as_object_mut() {
        map.remove("$schema");
        map.remove("title");
    }
    value
}

pub(crate) fn parse_args<T: DeserializeOwned>(params: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParameters(e.to_string()))
}

/// Pretty JSON of `value` as a successful result.
pub(crate) fn json_result<T: Serialize>(value: &T) -> ToolResult {
    match serde_json::to_value(value) {
        Ok(v) => ToolResult::success_json(v),
        Err(e) => ToolResult::error(format!("结果序列化失败: {e}")),
    }
}

pub(crate) fn failure(action: &str, err: ServiceError) -> ToolResult {
    ToolResult::error(format!("{action}: {err}"))
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
