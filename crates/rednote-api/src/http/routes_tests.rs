use super::*;
use crate::test_support::{service, StubPages};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

fn create_test_router(pages: StubPages, dir: &std::path::Path) -> Router {
    let svc = Arc::new(service(Arc::new(pages), dir));
    let state = Arc::new(AppState::new(svc).unwrap());
    create_router(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::default(), dir.path());
    let (status, body) = send(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "服务正常");
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["account"], "ai-report");
}

#[tokio::test]
async fn test_saved_feeds_rejects_bad_limit() {
    let dir = tempfile::tempdir().unwrap();
    let pages = StubPages::logged_in();
    let app = create_test_router(pages, dir.path());
    let (status, body) = send(app, get("/api/v1/feeds/saved?limit=abc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_LIMIT");
    assert_eq!(body["details"], "limit must be a positive integer");
}

#[tokio::test]
async fn test_saved_feeds_rejects_zero_limit() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::logged_in(), dir.path());
    let (status, body) = send(app, get("/api/v1/feeds/saved?limit=0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_LIMIT");
}

#[tokio::test]
async fn test_search_requires_keyword() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::logged_in(), dir.path());
    let (status, body) = send(app.clone(), get("/api/v1/feeds/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_KEYWORD");

    let (status, body) = send(app, post_json("/api/v1/feeds/search", json!({"keyword": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_KEYWORD");
}

#[tokio::test]
async fn test_invalid_publish_body() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::logged_in(), dir.path());

    let (status, body) = send(app.clone(), post_json("/api/v1/publish", json!({"title": "t"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
    assert_eq!(body["error"], "请求参数错误");

    let (status, body) = send(
        app,
        post_json("/api/v1/publish", json!({"title": "t", "content": "c", "images": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "images must contain at least 1 item");
}

#[tokio::test]
async fn test_reply_without_target_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::logged_in(), dir.path());
    let (status, body) = send(
        app,
        post_json(
            "/api/v1/feeds/comment/reply",
            json!({"feed_id": "n1", "xsec_token": "t", "content": "谢谢"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "缺少 comment_id 或 user_id");
}

#[tokio::test]
async fn test_browser_unavailable_is_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::unavailable(), dir.path());
    let (status, body) = send(app, get("/api/v1/feeds/list")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "LIST_FEEDS_FAILED");
    assert_eq!(body["error"], "获取Feeds列表失败");
}

#[tokio::test]
async fn test_delete_cookies_route() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::default(), dir.path());
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/v1/login/cookies")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["cookie_path"].as_str().unwrap().ends_with("cookies.json"));
}

#[tokio::test]
async fn test_mcp_initialize_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::default(), dir.path());
    let (status, body) = send(
        app,
        post_json(
            "/mcp",
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {"protocolVersion": "2025-03-26", "capabilities": {}}
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["serverInfo"]["name"], "xiaohongshu-mcp");
    assert_eq!(body["result"]["protocolVersion"], "2025-03-26");
}

#[tokio::test]
async fn test_mcp_tools_list_on_subpath() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::default(), dir.path());
    let (status, body) = send(
        app,
        post_json("/mcp/stream", json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 14);
}

#[tokio::test]
async fn test_mcp_notification_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::default(), dir.path());
    let (status, body) = send(
        app,
        post_json("/mcp", json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_mcp_get_not_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(StubPages::default(), dir.path());
    let (status, _) = send(app, get("/mcp")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
fn test_parse_positive_limit() {
    use crate::http::handlers::parse_positive_limit;
    assert_eq!(parse_positive_limit("", 20), Ok(20));
    assert_eq!(parse_positive_limit("5", 20), Ok(5));
    assert!(parse_positive_limit("-1", 20).is_err());
    assert!(parse_positive_limit("x", 20).is_err());
}
