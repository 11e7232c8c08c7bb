//! REST handlers.
//!
//! Each handler validates its input, calls [`XhsService`](crate::service::XhsService)
//! and wraps the outcome in the shared envelopes. Codes and messages are
//! stable: clients match on `code`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rednote_core::actions::Reaction;
use rednote_core::UserProfile;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::{respond, ApiError, SuccessResponse};
use crate::service::{
    validate_note_ref, ActionResult, DeleteCookiesResponse, FavoriteFeedRequest, FeedDetailRequest,
    FeedDetailResponse, FeedsListResponse, LikeFeedRequest, LoginQrcodeResponse, LoginStatusResponse,
    PostCommentRequest, PostCommentResponse, PublishRequest, PublishResponse, PublishVideoRequest,
    PublishVideoResponse, ReplyCommentRequest, ReplyCommentResponse, SearchFeedsRequest, UserProfileRequest,
};
use crate::state::AppState;

type ApiResult<T> = Result<Json<SuccessResponse<T>>, ApiError>;

/// Unwrap a JSON body, turning any rejection into `INVALID_REQUEST`.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|rejection| ApiError::invalid_request(rejection.body_text()))
}

/// Parse a `limit` query value. Empty means `default`.
pub fn parse_positive_limit(raw: &str, default: usize) -> Result<usize, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n as usize),
        _ => Err("limit must be a positive integer".to_string()),
    }
}

/// A profile nested under `data`.
#[derive(Debug, Serialize)]
pub struct ProfileEnvelope {
    pub data: UserProfile,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<SuccessResponse<serde_json::Value>> {
    respond(
        json!({
            "status": "healthy",
            "service": crate::mcp::server::SERVER_NAME,
            "account": state.service.settings().account,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }),
        "服务正常",
    )
}

pub async fn login_status(State(state): State<Arc<AppState>>) -> ApiResult<LoginStatusResponse> {
    let status = state
        .service
        .check_login_status()
        .await
        .map_err(|e| ApiError::internal("STATUS_CHECK_FAILED", "检查登录状态失败", e))?;
    Ok(respond(status, "检查登录状态成功"))
}

pub async fn login_qrcode(State(state): State<Arc<AppState>>) -> ApiResult<LoginQrcodeResponse> {
    let qr = state
        .service
        .get_login_qrcode()
        .await
        .map_err(|e| ApiError::internal("STATUS_CHECK_FAILED", "获取登录二维码失败", e))?;
    Ok(respond(qr, "获取登录二维码成功"))
}

pub async fn delete_cookies(State(state): State<Arc<AppState>>) -> ApiResult<DeleteCookiesResponse> {
    let resp = state
        .service
        .delete_cookies()
        .await
        .map_err(|e| ApiError::internal("DELETE_COOKIES_FAILED", "删除 cookies 失败", e))?;
    info!("Cookies deleted: {}", resp.cookie_path);
    Ok(respond(resp, "Cookies 删除成功"))
}

pub async fn publish(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> ApiResult<PublishResponse> {
    let req = body(payload)?;
    req.validate().map_err(ApiError::invalid_request)?;
    let resp = state
        .service
        .publish_content(&req)
        .await
        .map_err(|e| ApiError::internal("PUBLISH_FAILED", "发布失败", e))?;
    Ok(respond(resp, "发布成功"))
}

pub async fn publish_video(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PublishVideoRequest>, JsonRejection>,
) -> ApiResult<PublishVideoResponse> {
    let req = body(payload)?;
    req.validate().map_err(ApiError::invalid_request)?;
    let resp = state
        .service
        .publish_video(&req)
        .await
        .map_err(|e| ApiError::internal("PUBLISH_VIDEO_FAILED", "视频发布失败", e))?;
    Ok(respond(resp, "视频发布成功"))
}

pub async fn list_feeds(State(state): State<Arc<AppState>>) -> ApiResult<FeedsListResponse> {
    let resp = state
        .service
        .list_feeds()
        .await
        .map_err(|e| ApiError::internal("LIST_FEEDS_FAILED", "获取Feeds列表失败", e))?;
    Ok(respond(resp, "获取Feeds列表成功"))
}

#[derive(Debug, Default, Deserialize)]
pub struct SavedFeedsQuery {
    #[serde(default)]
    pub limit: String,
}

pub async fn list_saved_feeds(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SavedFeedsQuery>,
) -> ApiResult<FeedsListResponse> {
    let limit = parse_positive_limit(&query.limit, state.service.settings().saved_feeds_limit)
        .map_err(|details| ApiError::bad_request("INVALID_LIMIT", "limit 参数错误", details))?;
    let resp = state
        .service
        .list_saved_feeds(limit)
        .await
        .map_err(|e| ApiError::internal("LIST_SAVED_FEEDS_FAILED", "获取收藏笔记列表失败", e))?;
    Ok(respond(resp, "获取收藏笔记列表成功"))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
}

pub async fn search_feeds_get(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<FeedsListResponse> {
    run_search(
        &state,
        SearchFeedsRequest {
            keyword: query.keyword,
            ..Default::default()
        },
    )
    .await
}

pub async fn search_feeds_post(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchFeedsRequest>, JsonRejection>,
) -> ApiResult<FeedsListResponse> {
    run_search(&state, body(payload)?).await
}

async fn run_search(state: &AppState, req: SearchFeedsRequest) -> ApiResult<FeedsListResponse> {
    if req.keyword.trim().is_empty() {
        return Err(ApiError::bad_request(
            "MISSING_KEYWORD",
            "缺少关键词参数",
            "keyword parameter is required",
        ));
    }
    let resp = state
        .service
        .search_feeds(&req.keyword, &req.filters)
        .await
        .map_err(|e| ApiError::internal("SEARCH_FEEDS_FAILED", "搜索Feeds失败", e))?;
    Ok(respond(resp, "搜索Feeds成功"))
}

pub async fn feed_detail(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeedDetailRequest>, JsonRejection>,
) -> ApiResult<FeedDetailResponse> {
    let req = body(payload)?;
    req.validate().map_err(ApiError::invalid_request)?;
    let config = req.comment_load_config();
    let resp = state
        .service
        .get_feed_detail(&req.feed_id, &req.xsec_token, req.load_all_comments, &config)
        .await
        .map_err(|e| ApiError::internal("GET_FEED_DETAIL_FAILED", "获取Feed详情失败", e))?;
    Ok(respond(resp, "获取Feed详情成功"))
}

pub async fn user_profile(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserProfileRequest>, JsonRejection>,
) -> ApiResult<ProfileEnvelope> {
    let req = body(payload)?;
    req.validate().map_err(ApiError::invalid_request)?;
    let profile = state
        .service
        .user_profile(&req.user_id, &req.xsec_token)
        .await
        .map_err(|e| ApiError::internal("GET_USER_PROFILE_FAILED", "获取用户主页失败", e))?;
    Ok(respond(ProfileEnvelope { data: profile }, "获取用户主页成功"))
}

pub async fn my_profile(State(state): State<Arc<AppState>>) -> ApiResult<ProfileEnvelope> {
    let profile = state
        .service
        .my_profile()
        .await
        .map_err(|e| ApiError::internal("GET_MY_PROFILE_FAILED", "获取我的主页失败", e))?;
    Ok(respond(ProfileEnvelope { data: profile }, "获取我的主页成功"))
}

pub async fn post_comment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PostCommentRequest>, JsonRejection>,
) -> ApiResult<PostCommentResponse> {
    let req = body(payload)?;
    req.validate().map_err(ApiError::invalid_request)?;
    let resp = state
        .service
        .post_comment(&req.feed_id, &req.xsec_token, &req.content)
        .await
        .map_err(|e| ApiError::internal("POST_COMMENT_FAILED", "发表评论失败", e))?;
    let message = resp.message.clone();
    Ok(respond(resp, message))
}

pub async fn reply_comment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReplyCommentRequest>, JsonRejection>,
) -> ApiResult<ReplyCommentResponse> {
    let req = body(payload)?;
    req.validate().map_err(ApiError::invalid_request)?;
    let resp = state
        .service
        .reply_comment(&req)
        .await
        .map_err(|e| ApiError::internal("REPLY_COMMENT_FAILED", "回复评论失败", e))?;
    let message = resp.message.clone();
    Ok(respond(resp, message))
}

pub async fn like_feed(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LikeFeedRequest>, JsonRejection>,
) -> ApiResult<ActionResult> {
    let req = body(payload)?;
    validate_note_ref(&req.feed_id, &req.xsec_token).map_err(ApiError::invalid_request)?;
    let resp = state
        .service
        .set_reaction(Reaction::Like, !req.unlike, &req.feed_id, &req.xsec_token)
        .await
        .map_err(|e| ApiError::internal("LIKE_FEED_FAILED", "点赞操作失败", e))?;
    let message = resp.message.clone();
    Ok(respond(resp, message))
}

pub async fn favorite_feed(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FavoriteFeedRequest>, JsonRejection>,
) -> ApiResult<ActionResult> {
    let req = body(payload)?;
    validate_note_ref(&req.feed_id, &req.xsec_token).map_err(ApiError::invalid_request)?;
    let resp = state
        .service
        .set_reaction(Reaction::Favorite, !req.unfavorite, &req.feed_id, &req.xsec_token)
        .await
        .map_err(|e| ApiError::internal("FAVORITE_FEED_FAILED", "收藏操作失败", e))?;
    let message = resp.message.clone();
    Ok(respond(resp, message))
}

/// The MCP endpoint. Only POST carries JSON-RPC; a body of notifications
/// alone is acknowledged with 202.
pub async fn mcp_endpoint(State(state): State<Arc<AppState>>, method: Method, body: Bytes) -> Response {
    if method != Method::POST {
        return (StatusCode::METHOD_NOT_ALLOWED, [("allow", "POST")]).into_response();
    }
    match state.mcp.handle_payload(&body).await {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
