use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 성/중앙직할시 DB 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProvinceRecord {
    pub province_id: i64,
    pub province_name: String,
    pub province_type: String,
}

/// 군/현 DB 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DistrictRecord {
    pub district_id: i64,
    pub district_name: String,
    pub province_id: i64,
}

/// 동/면 DB 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WardRecord {
    pub ward_id: i64,
    pub ward_name: String,
    pub district_id: i64,
}

/// 사업자 DB 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BusinessRecord {
    pub vbiz_code: String,
    pub vbiz_name: String,
    #[serde(default)]
    pub vbiz_address: Option<String>,
    #[serde(default)]
    pub vbiz_category_id: Option<String>,
    #[serde(default)]
    pub vbiz_phone: Option<String>,
    #[serde(default)]
    pub vbiz_email: Option<String>,
    #[serde(default)]
    pub vbiz_website: Option<String>,
    #[serde(default)]
    pub vbiz_register_date: Option<String>,
}

/// 사업자 검색 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BusinessSummary {
    pub vbiz_code: String,
    pub vbiz_name: String,
}

/// 사업자 검색 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    /// 사업자 번호 앞자리 일치
    CodePrefix(String),
    /// 상호에 키워드 포함
    NameContains(String),
    /// 상호 앞부분 일치
    NamePrefix(String),
}

/// 이보다 짧은 키워드는 상호 포함 검색
pub const SHORT_KEYWORD_LEN: usize = 16;

impl SearchMode {
    /// 키워드 형태로 검색 방식 결정
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return None;
        }
        let mode = if keyword.chars().all(|c| c.is_ascii_digit()) {
            Self::CodePrefix(keyword.to_string())
        } else if keyword.chars().count() < SHORT_KEYWORD_LEN {
            Self::NameContains(keyword.to_string())
        } else {
            Self::NamePrefix(keyword.to_string())
        };
        Some(mode)
    }
}
