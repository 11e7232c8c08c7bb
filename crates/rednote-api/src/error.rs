//! API error types and the JSON envelopes shared by every REST handler.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// A failed REST request.
///
/// Rendered as `{error, code, details}` with the matching HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller sent something unusable (400).
    #[error("{message}: {details}")]
    BadRequest {
        code: &'static str,
        message: String,
        details: String,
    },

    /// The operation itself failed (500).
    #[error("{message}: {details}")]
    Internal {
        code: &'static str,
        message: String,
        details: String,
    },
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code,
            message: message.into(),
            details: details.into(),
        }
    }

    pub fn internal(code: &'static str, message: impl Into<String>, details: impl ToString) -> Self {
        ApiError::Internal {
            code,
            message: message.into(),
            details: details.to_string(),
        }
    }

    /// Shorthand for a malformed or incomplete request body.
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::bad_request("INVALID_REQUEST", "请求参数错误", details)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { code, .. } | ApiError::Internal { code, .. } => code,
        }
    }
}

/// Error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub details: serde_json::Value,
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

/// Wrap `data` in the success envelope.
pub fn respond<T: Serialize>(data: T, message: impl Into<String>) -> Json<SuccessResponse<T>> {
    Json(SuccessResponse {
        success: true,
        data,
        message: message.into(),
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, details) = match self {
            ApiError::BadRequest { message, details, .. } | ApiError::Internal { message, details, .. } => {
                (message, details)
            }
        };
        error!("{} {}: {} ({})", status.as_u16(), code, message, details);

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details: serde_json::Value::String(details),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = ApiError::bad_request("INVALID_LIMIT", "limit 参数错误", "limit must be a positive integer");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_LIMIT");

        let err = ApiError::internal("LIST_FEEDS_FAILED", "获取Feeds列表失败", "no feeds found");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "获取Feeds列表失败: no feeds found");
    }

    #[test]
    fn test_invalid_request_shorthand() {
        let err = ApiError::invalid_request("missing field `title`");
        assert_eq!(err.code(), "INVALID_REQUEST");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let response = ApiError::internal("PUBLISH_FAILED", "发布失败", "标题长度超过限制").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "发布失败");
        assert_eq!(json["code"], "PUBLISH_FAILED");
        assert_eq!(json["details"], "标题长度超过限制");
    }

    #[test]
    fn test_success_envelope() {
        let Json(body) = respond(serde_json::json!({"count": 0}), "获取Feeds列表成功");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["count"], 0);
        assert_eq!(json["message"], "获取Feeds列表成功");
    }
}
