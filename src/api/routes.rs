use axum::{routing::get, Router};

use crate::api::handlers::{exchange_rate, gold, health, index, province, vbiz};
use crate::server::AppState;

/// API 라우터 생성
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        // 환율 API
        .route(
            "/api/exchange_rate/vcb",
            get(exchange_rate::get_vcb_rates).post(exchange_rate::post_vcb_rates),
        )
        .route(
            "/api/v2/exchange_rate/:bank",
            get(exchange_rate::get_bank_rates).post(exchange_rate::post_bank_rates),
        )
        // 금 시세 API
        .route("/api/gold/:market", get(gold::get_gold_v1).post(gold::post_gold_v1))
        .route("/api/v2/gold/:market", get(gold::get_gold_v2).post(gold::post_gold_v2))
        // 행정구역 API
        .route("/api/province", get(province::get_provinces_v1))
        .route("/api/province/", get(province::get_provinces_v1))
        .route("/api/province/district/:province_id", get(province::get_districts_v1))
        .route("/api/province/ward/:district_id", get(province::get_wards_v1))
        .route("/api/v2/province", get(province::get_provinces_v2))
        .route("/api/v2/province/", get(province::get_provinces_v2))
        .route("/api/v2/province/district/:province_id", get(province::get_districts_v2))
        .route("/api/v2/province/ward/:district_id", get(province::get_wards_v2))
        // 사업자 API
        .route("/api/vbiz/search/:keyword", get(vbiz::search))
        .route("/api/vbiz/cat/:vbiz_category_id", get(vbiz::get_category))
        .route("/api/vbiz/:vbiz_code", get(vbiz::get_business))
}
