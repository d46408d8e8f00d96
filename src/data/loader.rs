use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqlitePool;

use crate::db::models::{BusinessRecord, DistrictRecord, ProvinceRecord, WardRecord};
use crate::db::repository::{count_rows, BusinessRepository, ProvinceRepository};

pub const PROVINCES_FILE: &str = "provinces.json";
pub const DISTRICTS_FILE: &str = "districts.json";
pub const WARDS_FILE: &str = "wards.json";
pub const VBIZ_FILE: &str = "vbiz.json";

/// 데이터 적재 오류
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("파일 읽기 실패 ({path}): {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON 파싱 실패 ({path}): {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),
}

/// 테이블별 적재 건수
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub provinces: usize,
    pub districts: usize,
    pub wards: usize,
    pub businesses: usize,
}

/// 데이터 디렉토리의 JSON 파일을 비어 있는 테이블에 적재
///
/// 파일이 없으면 건너뛰고, 이미 데이터가 있는 테이블은 다시 적재하지 않습니다.
pub async fn load_reference_data(pool: &SqlitePool, dir: &Path) -> Result<LoadSummary, DataLoadError> {
    info!("📂 참조 데이터 적재 시작: {}", dir.display());

    let provinces_repo = ProvinceRepository::new(pool.clone());
    let business_repo = BusinessRepository::new(pool.clone());
    let mut summary = LoadSummary::default();

    if let Some(records) = read_table::<ProvinceRecord>(pool, dir, PROVINCES_FILE, "province").await? {
        for record in &records {
            provinces_repo.insert_province(record).await?;
        }
        summary.provinces = records.len();
    }

    if let Some(records) = read_table::<DistrictRecord>(pool, dir, DISTRICTS_FILE, "district").await? {
        for record in &records {
            provinces_repo.insert_district(record).await?;
        }
        summary.districts = records.len();
    }

    if let Some(records) = read_table::<WardRecord>(pool, dir, WARDS_FILE, "ward").await? {
        for record in &records {
            provinces_repo.insert_ward(record).await?;
        }
        summary.wards = records.len();
    }

    if let Some(records) = read_table::<BusinessRecord>(pool, dir, VBIZ_FILE, "vbiz").await? {
        for record in &records {
            business_repo.insert(record).await?;
        }
        summary.businesses = records.len();
    }

    info!(
        "✅ 참조 데이터 적재 완료 - 성: {}, 군: {}, 동: {}, 사업자: {}",
        summary.provinces, summary.districts, summary.wards, summary.businesses
    );
    Ok(summary)
}

/// 테이블이 비어 있고 파일이 있으면 레코드 목록을 읽음
async fn read_table<T: DeserializeOwned>(
    pool: &SqlitePool,
    dir: &Path,
    file: &str,
    table: &str,
) -> Result<Option<Vec<T>>, DataLoadError> {
    let path = dir.join(file);
    if !path.exists() {
        warn!("📂 데이터 파일이 없음, 건너뜀: {}", path.display());
        return Ok(None);
    }

    let existing = count_rows(pool, table).await?;
    if existing > 0 {
        info!("📋 {} 테이블에 이미 {}건이 있어 적재하지 않음", table, existing);
        return Ok(None);
    }

    read_records(&path).map(Some)
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataLoadError> {
    let content = fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DataLoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
