//! API 핸들러

pub mod exchange_rate;
pub mod gold;
pub mod province;
pub mod vbiz;

use axum::Json;

use crate::api::models::HealthResponse;

/// 루트
pub async fn index() -> &'static str {
    "Hello"
}

/// 서버 상태 확인
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
