//! Tools that write to a note: comments, replies, likes and favorites.

use std::sync::Arc;

use async_trait::async_trait;
use rednote_core::actions::Reaction;
use rednote_protocols::{RiskLevel, Tool, ToolContext, ToolDefinition, ToolError, ToolResult};

use super::{failure, input_schema, json_result, parse_args};
use crate::service::{
    validate_note_ref, FavoriteFeedRequest, LikeFeedRequest, PostCommentRequest, ReplyCommentRequest, XhsService,
};

pub struct PostCommentTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl PostCommentTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new("post_comment_to_feed", "Post Comment", "发表评论到小红书笔记")
                .with_parameters_schema(input_schema::<PostCommentRequest>())
                .with_risk_level(RiskLevel::High),
            service,
        }
    }
}

#[async_trait]
impl Tool for PostCommentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let req: PostCommentRequest = parse_args(params)?;
        if let Err(msg) = req.validate() {
            return Ok(ToolResult::error(format!("发表评论失败: {msg}")));
        }
        Ok(match self.service.post_comment(&req.feed_id, &req.xsec_token, &req.content).await {
            Ok(resp) => json_result(&resp),
            Err(e) => failure("发表评论失败", e),
        })
    }
}

pub struct ReplyCommentTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl ReplyCommentTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new("reply_comment_in_feed", "Reply Comment", "回复小红书笔记下的指定评论")
                .with_parameters_schema(input_schema::<ReplyCommentRequest>())
                .with_risk_level(RiskLevel::High),
            service,
        }
    }
}

#[async_trait]
impl Tool for ReplyCommentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let req: ReplyCommentRequest = parse_args(params)?;
        if let Err(msg) = req.validate() {
            return Ok(ToolResult::error(msg));
        }
        Ok(match self.service.reply_comment(&req).await {
            Ok(resp) => json_result(&resp),
            Err(e) => failure("回复评论失败", e),
        })
    }
}

pub struct LikeFeedTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl LikeFeedTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "like_feed",
                "Like Feed",
                "为指定笔记点赞或取消点赞（如已点赞将跳过点赞，如未点赞将跳过取消点赞）",
            )
            .with_parameters_schema(input_schema::<LikeFeedRequest>())
            .with_risk_level(RiskLevel::High),
            service,
        }
    }
}

#[async_trait]
impl Tool for LikeFeedTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let req: LikeFeedRequest = parse_args(params)?;
        if let Err(msg) = validate_note_ref(&req.feed_id, &req.xsec_token) {
            return Ok(ToolResult::error(format!("点赞操作失败: {msg}")));
        }
        Ok(
            match self
                .service
                .set_reaction(Reaction::Like, !req.unlike, &req.feed_id, &req.xsec_token)
                .await
            {
                Ok(resp) => json_result(&resp),
                Err(e) => failure("点赞操作失败", e),
            },
        )
    }
}

pub struct FavoriteFeedTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl FavoriteFeedTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "favorite_feed",
                "Favorite Feed",
                "收藏指定笔记或取消收藏（如已收藏将跳过收藏，如未收藏将跳过取消收藏）",
            )
            .with_parameters_schema(input_schema::<FavoriteFeedRequest>())
            .with_risk_level(RiskLevel::High),
            service,
        }
    }
}

#[async_trait]
impl Tool for FavoriteFeedTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let req: FavoriteFeedRequest = parse_args(params)?;
        if let Err(msg) = validate_note_ref(&req.feed_id, &req.xsec_token) {
            return Ok(ToolResult::error(format!("收藏操作失败: {msg}")));
        }
        Ok(
            match self
                .service
                .set_reaction(Reaction::Favorite, !req.unfavorite, &req.feed_id, &req.xsec_token)
                .await
            {
                Ok(resp) => json_result(&resp),
                Err(e) => failure("收藏操作失败", e),
            },
        )
    }
}
