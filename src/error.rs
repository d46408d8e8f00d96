use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::Serialize;

/// API 오류
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

/// 오류 응답 본문
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// `"403 - Forbidden"` 형태의 오류 본문
    pub fn new(status: StatusCode, message: Option<String>) -> Self {
        Self {
            error: format!(
                "{} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            ),
            message,
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidParameter(_) | ApiError::Database(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Database(e) => error!("데이터베이스 오류: {}", e),
            ApiError::Internal(msg) => error!("내부 오류: {}", msg),
            ApiError::Forbidden(msg) => warn!("인증 실패: {}", msg),
            _ => {}
        }
        (status, Json(ErrorBody::new(status, Some(self.to_string())))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// 등록되지 않은 경로
pub async fn not_found_fallback() -> Response {
    let status = StatusCode::NOT_FOUND;
    (status, Json(ErrorBody::new(status, None))).into_response()
}
