use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};

/// 성공 응답 `{"results": ...}`
#[derive(Debug, Serialize)]
pub struct Results<T> {
    pub results: T,
}

impl<T: Serialize> Results<T> {
    pub fn new(results: T) -> Json<Self> {
        Json(Self { results })
    }
}

/// 등록 요청 결과 (새로 저장: 201, 변경 없음: 200)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushResult {
    pub stored: bool,
}

impl PushResult {
    pub fn status(&self) -> StatusCode {
        if self.stored {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        }
    }
}

impl IntoResponse for PushResult {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Results::new(status.as_u16())).into_response()
    }
}

/// `api_key` 쿼리만 받는 요청
#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    pub api_key: Option<String>,
}

/// v2 환율 조회 쿼리
#[derive(Debug, Default, Deserialize)]
pub struct RateQuery {
    pub api_key: Option<String>,
    pub date: Option<String>,
    pub currency: Option<String>,
}

/// 금 시세 조회 쿼리
#[derive(Debug, Default, Deserialize)]
pub struct GoldQuery {
    pub api_key: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// 서버 상태 응답
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
