//! 행정구역 조회
//!
//! v1은 베트남어 이름순, v2는 ID순으로 응답합니다. `api_key` 쿼리는 받지만 검사하지 않습니다.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::models::Results;
use crate::db::models::{DistrictRecord, ProvinceRecord, WardRecord};
use crate::db::repository::{ProvinceRepository, RegionOrder};
use crate::error::ApiError;
use crate::server::AppState;

pub async fn get_provinces_v1(
    State(state): State<AppState>,
) -> Result<Json<Results<Vec<ProvinceRecord>>>, ApiError> {
    provinces(&state, RegionOrder::Name).await
}

pub async fn get_districts_v1(
    State(state): State<AppState>,
    Path(province_id): Path<String>,
) -> Result<Json<Results<Vec<DistrictRecord>>>, ApiError> {
    districts(&state, &province_id, RegionOrder::Name).await
}

pub async fn get_wards_v1(
    State(state): State<AppState>,
    Path(district_id): Path<String>,
) -> Result<Json<Results<Vec<WardRecord>>>, ApiError> {
    wards(&state, &district_id, RegionOrder::Name).await
}

pub async fn get_provinces_v2(
    State(state): State<AppState>,
) -> Result<Json<Results<Vec<ProvinceRecord>>>, ApiError> {
    provinces(&state, RegionOrder::Id).await
}

pub async fn get_districts_v2(
    State(state): State<AppState>,
    Path(province_id): Path<String>,
) -> Result<Json<Results<Vec<DistrictRecord>>>, ApiError> {
    districts(&state, &province_id, RegionOrder::Id).await
}

pub async fn get_wards_v2(
    State(state): State<AppState>,
    Path(district_id): Path<String>,
) -> Result<Json<Results<Vec<WardRecord>>>, ApiError> {
    wards(&state, &district_id, RegionOrder::Id).await
}

async fn provinces(
    state: &AppState,
    order: RegionOrder,
) -> Result<Json<Results<Vec<ProvinceRecord>>>, ApiError> {
    let provinces = ProvinceRepository::new(state.pool.clone()).provinces(order).await?;
    Ok(Results::new(provinces))
}

async fn districts(
    state: &AppState,
    province_id: &str,
    order: RegionOrder,
) -> Result<Json<Results<Vec<DistrictRecord>>>, ApiError> {
    let province_id = parse_id("province_id", province_id)?;
    let districts = ProvinceRepository::new(state.pool.clone())
        .districts(province_id, order)
        .await?;
    Ok(Results::new(districts))
}

async fn wards(
    state: &AppState,
    district_id: &str,
    order: RegionOrder,
) -> Result<Json<Results<Vec<WardRecord>>>, ApiError> {
    let district_id = parse_id("district_id", district_id)?;
    let wards = ProvinceRepository::new(state.pool.clone())
        .wards(district_id, order)
        .await?;
    Ok(Results::new(wards))
}

fn parse_id(name: &str, raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::InvalidParameter(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("province_id", "48").unwrap(), 48);
        assert!(parse_id("province_id", "abc").is_err());
        assert!(parse_id("province_id", "4.8").is_err());
    }
}
