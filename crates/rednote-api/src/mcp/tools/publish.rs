//! Publishing tools.

use std::sync::Arc;

use async_trait::async_trait;
use rednote_protocols::{RiskLevel, Tool, ToolContext, ToolDefinition, ToolError, ToolResult};

use super::{failure, input_schema, json_result, parse_args};
use crate::service::{PublishRequest, PublishVideoRequest, XhsService};

pub struct PublishContentTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl PublishContentTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new("publish_content", "Publish Content", "发布小红书图文内容")
                .with_parameters_schema(input_schema::<PublishRequest>())
                .with_risk_level(RiskLevel::High),
            service,
        }
    }
}

#[async_trait]
impl Tool for PublishContentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let req: PublishRequest = parse_args(params)?;
        if let Err(msg) = req.validate() {
            return Ok(ToolResult::error(format!("发布失败: {msg}")));
        }
        Ok(match self.service.publish_content(&req).await {
            Ok(resp) => json_result(&resp),
            Err(e) => failure("发布失败", e),
        })
    }
}

/// Publish a single local video file.
pub struct PublishVideoTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl PublishVideoTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "publish_with_video",
                "Publish Video",
                "发布小红书视频内容（仅支持本地单个视频文件）",
            )
            .with_parameters_schema(input_schema::<PublishVideoRequest>())
            .with_risk_level(RiskLevel::High),
            service,
        }
    }
}

#[async_trait]
impl Tool for PublishVideoTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let req: PublishVideoRequest = parse_args(params)?;
        if let Err(msg) = req.validate() {
            return Ok(ToolResult::error(format!("视频发布失败: {msg}")));
        }
        Ok(match self.service.publish_video(&req).await {
            Ok(resp) => json_result(&resp),
            Err(e) => failure("视频发布失败", e),
        })
    }
}
