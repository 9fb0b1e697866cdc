//! HTTP API数据模型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============= Score =============

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub scores: Vec<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ScoreEntry {
    pub score: f64,
    pub percentage: u8,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub success: bool,
    pub data: Vec<ScoreEntry>,
}

// ============= Portfolio =============

#[derive(Debug, Deserialize)]
pub struct LoadPortfolioQuery {
    pub user_id: String,
}

/// 透传远端评分服务返回的数据
#[derive(Debug, Serialize)]
pub struct PassthroughResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl PassthroughResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
        }
    }
}

// ============= Health =============

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_id: String,
    pub uptime_seconds: f64,
    pub requests_handled: u64,
    pub requests_by_endpoint: HashMap<String, u64>,
    pub errors_total: u64,
    pub auth_provider: String,
    pub scoring_api: String,
    pub timestamp: String,
}

// ============= Error Handling =============

#[derive(Debug)]
pub enum HttpServerError {
    InvalidRequest(String),
    NotAuthenticated,
    Forbidden(String),
    AuthService(String),
    ScoringService(String),
    Timeout,
    Internal(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            Self::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "NOT_AUTHENTICATED",
                "Not authenticated".to_string(),
            ),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            Self::AuthService(msg) => (StatusCode::BAD_GATEWAY, "AUTH_SERVICE_ERROR", msg),
            Self::ScoringService(msg) => (StatusCode::BAD_GATEWAY, "SCORING_SERVICE_ERROR", msg),
            Self::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                "Request timeout".to_string(),
            ),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
            "error_code": error_code,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_request_deserialize() {
        let req: ScoreRequest = serde_json::from_str(r#"{"scores":[-8,2.5,17]}"#).unwrap();
        assert_eq!(req.scores, vec![-8.0, 2.5, 17.0]);
    }

    #[test]
    fn test_passthrough_response_skips_empty_fields() {
        let json =
            serde_json::to_string(&PassthroughResponse::ok(serde_json::json!({"bio": "hi"})))
                .unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"bio\":\"hi\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (HttpServerError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (HttpServerError::NotAuthenticated, StatusCode::UNAUTHORIZED),
            (HttpServerError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (HttpServerError::AuthService("x".into()), StatusCode::BAD_GATEWAY),
            (HttpServerError::ScoringService("x".into()), StatusCode::BAD_GATEWAY),
            (HttpServerError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (HttpServerError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
