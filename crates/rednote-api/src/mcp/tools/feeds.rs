//! Read-only feed tools: home, search, saved, detail and profile.

use std::sync::Arc;

use async_trait::async_trait;
use rednote_core::feeds::CommentLoadConfig;
use rednote_protocols::{Tool, ToolContext, ToolDefinition, ToolError, ToolResult};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{failure, input_schema, json_result, parse_args};
use crate::service::{SearchFeedsRequest, UserProfileRequest, XhsService};

/// Saved-feeds limit for tool calls: non-positive means `default`.
pub fn normalize_saved_feeds_limit(limit: i64, default: usize) -> usize {
    if limit <= 0 { default } else { limit as usize }
}

pub struct ListFeedsTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl ListFeedsTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new("list_feeds", "List Feeds", "获取首页 Feeds 列表"),
            service,
        }
    }
}

#[async_trait]
impl Tool for ListFeedsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        Ok(match self.service.list_feeds().await {
            Ok(resp) => json_result(&resp),
            Err(e) => failure("获取Feeds列表失败", e),
        })
    }
}

pub struct SearchFeedsTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl SearchFeedsTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new("search_feeds", "Search Feeds", "搜索小红书内容（需要已登录）")
                .with_parameters_schema(input_schema::<SearchFeedsRequest>()),
            service,
        }
    }
}

#[async_trait]
impl Tool for SearchFeedsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let req: SearchFeedsRequest = parse_args(params)?;
        if req.keyword.trim().is_empty() {
            return Ok(ToolResult::error("搜索Feeds失败: 缺少关键词参数"));
        }
        Ok(match self.service.search_feeds(&req.keyword, &req.filters).await {
            Ok(resp) => json_result(&resp),
            Err(e) => failure("搜索Feeds失败", e),
        })
    }
}

/// 获取收藏列表
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListSavedFeedsArgs {
    /// 返回收藏笔记数量，默认20
    #[serde(default)]
    pub limit: i64,
}

pub struct ListSavedFeedsTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl ListSavedFeedsTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "list_saved_feeds",
                "List Saved Feeds",
                "获取当前登录账号的收藏笔记列表，返回笔记元数据（含 feed_id 和 xsec_token）",
            )
            .with_parameters_schema(input_schema::<ListSavedFeedsArgs>()),
            service,
        }
    }
}

#[async_trait]
impl Tool for ListSavedFeedsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let args: ListSavedFeedsArgs = parse_args(params)?;
        let limit = normalize_saved_feeds_limit(args.limit, self.service.settings().saved_feeds_limit);
        Ok(match self.service.list_saved_feeds(limit).await {
            Ok(resp) => json_result(&resp),
            Err(e) => failure("获取收藏笔记列表失败", e),
        })
    }
}

/// 获取Feed详情
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FeedDetailArgs {
    /// 小红书笔记ID，从Feed列表获取
    pub feed_id: String,
    /// 访问令牌，从Feed列表的xsecToken字段获取
    pub xsec_token: String,
    /// 是否加载全部评论。false仅返回前10条一级评论（默认），true滚动加载更多评论
    #[serde(default)]
    pub load_all_comments: bool,
    /// 【仅当load_all_comments为true时生效】限制加载的一级评论数量。例如20表示最多加载20条，默认20
    #[serde(default)]
    pub limit: i64,
    /// 【仅当load_all_comments为true时生效】是否展开二级回复。true展开子评论，false不展开（默认）
    #[serde(default)]
    pub click_more_replies: bool,
    /// 【仅当click_more_replies为true时生效】跳过回复数过多的评论。例如10表示跳过超过10条回复的，默认10
    #[serde(default)]
    pub reply_limit: i64,
    /// 【仅当load_all_comments为true时生效】滚动速度slow慢速、normal正常、fast快速
    #[serde(default)]
    pub scroll_speed: String,
}

impl FeedDetailArgs {
    /// Loading knobs; ignored unless all comments are requested.
    pub fn comment_config(&self) -> CommentLoadConfig {
        if !self.load_all_comments {
            return CommentLoadConfig::default();
        }
        let speed = Some(self.scroll_speed.as_str()).filter(|s| !s.trim().is_empty());
        CommentLoadConfig::from_request(self.click_more_replies, Some(self.reply_limit), Some(self.limit), speed)
    }
}

pub struct GetFeedDetailTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl GetFeedDetailTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "get_feed_detail",
                "Get Feed Detail",
                "获取小红书笔记详情，返回笔记内容、图片、作者信息、互动数据（点赞/收藏/分享数）及评论列表。默认返回前10条一级评论，如需更多评论请设置load_all_comments=true",
            )
            .with_parameters_schema(input_schema::<FeedDetailArgs>()),
            service,
        }
    }
}

#[async_trait]
impl Tool for GetFeedDetailTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let args: FeedDetailArgs = parse_args(params)?;
        let config = args.comment_config();
        Ok(
            match self
                .service
                .get_feed_detail(&args.feed_id, &args.xsec_token, args.load_all_comments, &config)
                .await
            {
                Ok(resp) => json_result(&resp),
                Err(e) => failure("获取Feed详情失败", e),
            },
        )
    }
}

pub struct UserProfileTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl UserProfileTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "user_profile",
                "User Profile",
                "获取指定的小红书用户主页，返回用户基本信息，关注、粉丝、获赞量及其笔记内容",
            )
            .with_parameters_schema(input_schema::<UserProfileRequest>()),
            service,
        }
    }
}

#[async_trait]
impl Tool for UserProfileTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let req: UserProfileRequest = parse_args(params)?;
        if let Err(msg) = req.validate() {
            return Ok(ToolResult::error(format!("获取用户主页失败: {msg}")));
        }
        Ok(match self.service.user_profile(&req.user_id, &req.xsec_token).await {
            Ok(profile) => json_result(&profile),
            Err(e) => failure("获取用户主页失败", e),
        })
    }
}
