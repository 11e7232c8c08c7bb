//! HTTP route definitions.

use std::sync::Arc;

use axum::routing::{any, delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Create the main router.
///
/// ## Route Structure
///
/// ```text
/// /health                         - Service health
///
/// /mcp, /mcp/{*path}              - MCP JSON-RPC (POST)
///
/// /api/v1
///   GET    /login/status          - Login state
///   GET    /login/qrcode          - QR code for login
///   DELETE /login/cookies         - Reset login
///   POST   /publish               - Publish image note
///   POST   /publish_video         - Publish video note
///   GET    /feeds/list            - Home feeds
///   GET    /feeds/saved?limit=N   - Saved notes
///   GET    /feeds/search?keyword= - Search
///   POST   /feeds/search          - Search with filters
///   POST   /feeds/detail          - Note with comments
///   POST   /feeds/comment         - Post comment
///   POST   /feeds/comment/reply   - Reply to a comment
///   POST   /feeds/like            - Like or unlike
///   POST   /feeds/favorite        - Favorite or unfavorite
///   POST   /user/profile          - A user's profile
///   GET    /user/me               - The logged-in profile
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/login/status", get(handlers::login_status))
        .route("/login/qrcode", get(handlers::login_qrcode))
        .route("/login/cookies", delete(handlers::delete_cookies))
        .route("/publish", post(handlers::publish))
        .route("/publish_video", post(handlers::publish_video))
        .route("/feeds/list", get(handlers::list_feeds))
        .route("/feeds/saved", get(handlers::list_saved_feeds))
        .route(
            "/feeds/search",
            get(handlers::search_feeds_get).post(handlers::search_feeds_post),
        )
        .route("/feeds/detail", post(handlers::feed_detail))
        .route("/feeds/comment", post(handlers::post_comment))
        .route("/feeds/comment/reply", post(handlers::reply_comment))
        .route("/feeds/like", post(handlers::like_feed))
        .route("/feeds/favorite", post(handlers::favorite_feed))
        .route("/user/profile", post(handlers::user_profile))
        .route("/user/me", get(handlers::my_profile));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/mcp", any(handlers::mcp_endpoint))
        .route("/mcp/{*path}", any(handlers::mcp_endpoint))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
