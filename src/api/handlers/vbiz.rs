//! 사업자(vBiz) 조회

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::models::Results;
use crate::db::models::{BusinessRecord, BusinessSummary, SearchMode};
use crate::db::repository::BusinessRepository;
use crate::error::ApiError;
use crate::server::AppState;

/// 사업자 번호로 조회
pub async fn get_business(
    State(state): State<AppState>,
    Path(vbiz_code): Path<String>,
) -> Result<Json<Results<Vec<BusinessRecord>>>, ApiError> {
    let records = BusinessRepository::new(state.pool.clone())
        .find_by_code(vbiz_code.trim())
        .await?;
    Ok(Results::new(records))
}

/// 카테고리별 조회 (최대 100건)
pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Results<Vec<BusinessRecord>>>, ApiError> {
    let records = BusinessRepository::new(state.pool.clone())
        .find_by_category(category_id.trim())
        .await?;
    Ok(Results::new(records))
}

/// 번호/상호 검색 (최대 10건)
pub async fn search(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> Result<Json<Results<Vec<BusinessSummary>>>, ApiError> {
    let mode = SearchMode::from_keyword(&keyword)
        .ok_or_else(|| ApiError::BadRequest("Empty keyword".to_string()))?;
    let summaries = BusinessRepository::new(state.pool.clone()).search(&mode).await?;
    Ok(Results::new(summaries))
}
