//! Request and response bodies shared by the REST and MCP surfaces.

use rednote_core::feeds::CommentLoadConfig;
use rednote_core::{Feed, FeedDetail, FilterOption};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

/// 发布图文内容
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PublishRequest {
    /// 内容标题（小红书限制：最多20个中文字或英文单词）
    pub title: String,
    /// 正文内容，不包含以#开头的标签内容，所有话题标签都用tags参数来生成和提供即可
    pub content: String,
    /// 图片路径列表（至少需要1张图片）。支持两种方式：1. HTTP/HTTPS图片链接（自动下载）；2. 本地图片绝对路径
    pub images: Vec<String>,
    /// 话题标签列表（可选参数），如 [美食, 旅行, 生活]
    #[serde(default)]
    pub tags: Vec<String>,
    /// 定时发布时间（可选），ISO8601格式如 2024-01-20T10:30:00+08:00，支持1小时至14天内。不填则立即发布
    #[serde(default)]
    pub schedule_at: Option<String>,
}

impl PublishRequest {
    pub fn validate(&self) -> Result<(), String> {
        require("title", &self.title)?;
        require("content", &self.content)?;
        if self.images.is_empty() {
            return Err("images must contain at least 1 item".to_string());
        }
        Ok(())
    }
}

/// 发布视频内容（仅支持本地单个视频文件）
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PublishVideoRequest {
    /// 内容标题（小红书限制：最多20个中文字或英文单词）
    pub title: String,
    /// 正文内容，不包含以#开头的标签内容，所有话题标签都用tags参数来生成和提供即可
    pub content: String,
    /// 本地视频绝对路径（仅支持单个视频文件，如:/Users/user/video.mp4）
    pub video: String,
    /// 话题标签列表（可选参数），如 [美食, 旅行, 生活]
    #[serde(default)]
    pub tags: Vec<String>,
    /// 定时发布时间（可选），ISO8601格式如 2024-01-20T10:30:00+08:00，支持1小时至14天内。不填则立即发布
    #[serde(default)]
    pub schedule_at: Option<String>,
}

impl PublishVideoRequest {
    pub fn validate(&self) -> Result<(), String> {
        require("title", &self.title)?;
        require("content", &self.content)?;
        require("video", &self.video)
    }
}

/// 搜索内容
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchFeedsRequest {
    /// 搜索关键词
    #[serde(default)]
    pub keyword: String,
    /// 筛选选项
    #[serde(default)]
    pub filters: FilterOption,
}

/// Comment loading knobs accepted by `POST /feeds/detail`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentConfigRequest {
    #[serde(default)]
    pub click_more_replies: bool,
    #[serde(default)]
    pub max_replies_threshold: i64,
    #[serde(default)]
    pub max_comment_items: i64,
    #[serde(default)]
    pub scroll_speed: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedDetailRequest {
    pub feed_id: String,
    pub xsec_token: String,
    #[serde(default)]
    pub load_all_comments: bool,
    #[serde(default)]
    pub comment_config: Option<CommentConfigRequest>,
}

impl FeedDetailRequest {
    pub fn validate(&self) -> Result<(), String> {
        require("feed_id", &self.feed_id)?;
        require("xsec_token", &self.xsec_token)
    }

    /// Comment loading knobs. Defaults apply unless all comments are
    /// requested with an explicit config.
    pub fn comment_load_config(&self) -> CommentLoadConfig {
        match (&self.comment_config, self.load_all_comments) {
            (Some(cfg), true) => CommentLoadConfig::from_request(
                cfg.click_more_replies,
                Some(cfg.max_replies_threshold),
                Some(cfg.max_comment_items),
                Some(cfg.scroll_speed.as_str()).filter(|s| !s.trim().is_empty()),
            ),
            _ => CommentLoadConfig::default(),
        }
    }
}

/// 获取用户主页
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UserProfileRequest {
    /// 小红书用户ID，从Feed列表获取
    pub user_id: String,
    /// 访问令牌，从Feed列表的xsecToken字段获取
    pub xsec_token: String,
}

impl UserProfileRequest {
    pub fn validate(&self) -> Result<(), String> {
        require("user_id", &self.user_id)?;
        require("xsec_token", &self.xsec_token)
    }
}

/// 发表评论
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PostCommentRequest {
    /// 小红书笔记ID，从Feed列表获取
    pub feed_id: String,
    /// 访问令牌，从Feed列表的xsecToken字段获取
    pub xsec_token: String,
    /// 评论内容
    pub content: String,
}

impl PostCommentRequest {
    pub fn validate(&self) -> Result<(), String> {
        require("feed_id", &self.feed_id)?;
        require("xsec_token", &self.xsec_token)?;
        require("content", &self.content)
    }
}

/// 回复评论
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReplyCommentRequest {
    /// 小红书笔记ID，从Feed列表获取
    pub feed_id: String,
    /// 访问令牌，从Feed列表的xsecToken字段获取
    pub xsec_token: String,
    /// 目标评论ID，从评论列表获取
    #[serde(default)]
    pub comment_id: String,
    /// 目标评论用户ID，从评论列表获取
    #[serde(default)]
    pub user_id: String,
    /// 回复内容
    pub content: String,
}

impl ReplyCommentRequest {
    pub fn validate(&self) -> Result<(), String> {
        require("feed_id", &self.feed_id)?;
        require("xsec_token", &self.xsec_token)?;
        require("content", &self.content)?;
        if self.comment_id.trim().is_empty() && self.user_id.trim().is_empty() {
            return Err("缺少 comment_id 或 user_id".to_string());
        }
        Ok(())
    }
}

/// 点赞或取消点赞
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LikeFeedRequest {
    /// 小红书笔记ID，从Feed列表获取
    pub feed_id: String,
    /// 访问令牌，从Feed列表的xsecToken字段获取
    pub xsec_token: String,
    /// 是否取消点赞，true为取消点赞，false或未设置则为点赞
    #[serde(default)]
    pub unlike: bool,
}

/// 收藏或取消收藏
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FavoriteFeedRequest {
    /// 小红书笔记ID，从Feed列表获取
    pub feed_id: String,
    /// 访问令牌，从Feed列表的xsecToken字段获取
    pub xsec_token: String,
    /// 是否取消收藏，true为取消收藏，false或未设置则为收藏
    #[serde(default)]
    pub unfavorite: bool,
}

/// Validate the note reference both toggles share.
pub fn validate_note_ref(feed_id: &str, xsec_token: &str) -> Result<(), String> {
    require("feed_id", feed_id)?;
    require("xsec_token", xsec_token)
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginStatusResponse {
    pub is_logged_in: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginQrcodeResponse {
    pub timeout: String,
    pub is_logged_in: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub img: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteCookiesResponse {
    pub cookie_path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishResponse {
    pub title: String,
    pub content: String,
    pub images: usize,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishVideoResponse {
    pub title: String,
    pub content: String,
    pub video: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedsListResponse {
    pub feeds: Vec<Feed>,
    pub count: usize,
}

impl From<Vec<Feed>> for FeedsListResponse {
    fn from(feeds: Vec<Feed>) -> Self {
        Self {
            count: feeds.len(),
            feeds,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedDetailResponse {
    pub feed_id: String,
    pub data: FeedDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCommentResponse {
    pub feed_id: String,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyCommentResponse {
    pub feed_id: String,
    pub target_comment_id: String,
    pub target_user_id: String,
    pub success: bool,
    pub message: String,
}

/// Outcome of an idempotent like or favorite toggle.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub feed_id: String,
    pub success: bool,
    pub message: String,
}
