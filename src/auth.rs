//! API 키 인증
//!
//! v2 엔드포인트는 서버 비밀키로 서명된 HS256 JWT를 API 키로 사용합니다.
//! 키에는 사용 범위(scope)와 권한(permission)이 들어 있습니다.
//! v1 엔드포인트는 설정 테이블에 저장된 단일 공유 키(`api`)와 비교합니다.

use std::fmt;
use std::str::FromStr;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

use crate::db::repository::SettingsRepository;
use crate::error::ApiError;

/// 기본 키 유효 기간 (일)
pub const DEFAULT_KEY_DAYS: i64 = 15;

/// v1 공유 키가 저장된 설정 키
pub const LEGACY_API_SETTING: &str = "api";

/// 키 사용 범위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Gold,
    ExchangeRate,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::All => "*",
            Scope::Gold => "gold",
            Scope::ExchangeRate => "exchange_rate",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" => Ok(Scope::All),
            "gold" => Ok(Scope::Gold),
            "exchange_rate" => Ok(Scope::ExchangeRate),
            other => Err(format!("알 수 없는 scope: {}", other)),
        }
    }
}

/// 키 권한 (0: 읽기, 1: 읽기/쓰기, 2: 읽기/쓰기/삭제)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Permission {
    Read = 0,
    Write = 1,
    Delete = 2,
}

impl Permission {
    pub fn level(&self) -> i64 {
        *self as i64
    }

    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Permission::Read),
            1 => Some(Permission::Write),
            2 => Some(Permission::Delete),
            _ => None,
        }
    }
}

/// 인증 실패 사유
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No api_key")]
    MissingKey,
    #[error("Out of scope")]
    OutOfScope,
    #[error("No permission")]
    NoPermission,
    #[error("{0}")]
    InvalidToken(String),
    #[error("Invalid key lifetime: {0} days")]
    InvalidLifetime(i64),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Forbidden(format!("Auth Error: {}", err))
    }
}

/// API 키 페이로드
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub exp: i64,
    pub iat: i64,
    pub scope: String,
    pub permission: i64,
}

/// API 키 발급/검증기
#[derive(Clone)]
pub struct ApiKeyAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl ApiKeyAuthority {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// 새 API 키 발급
    pub fn issue_api_key(
        &self,
        scope: Scope,
        permission: Permission,
        days_to_live: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = TimeDelta::try_days(days_to_live)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(AuthError::InvalidLifetime(days_to_live))?;
        let claims = Claims {
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            scope: scope.as_str().to_string(),
            permission: permission.level(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// 키 디코딩 (서명, 만료 검증)
    pub fn decode(&self, api_key: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(api_key, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// 키가 해당 범위와 권한을 가지는지 검사
    pub fn authorize(
        &self,
        api_key: Option<&str>,
        scope: Scope,
        permission: Permission,
    ) -> Result<Claims, AuthError> {
        let api_key = api_key.filter(|k| !k.is_empty()).ok_or(AuthError::MissingKey)?;
        let claims = self.decode(api_key)?;

        if claims.scope != Scope::All.as_str() && claims.scope != scope.as_str() {
            return Err(AuthError::OutOfScope);
        }
        if permission.level() > claims.permission {
            return Err(AuthError::NoPermission);
        }
        Ok(claims)
    }
}

/// 요청에서 API 키 추출
///
/// `Authorization: Bearer <key>` 헤더가 우선이고, 없으면 `api_key` 쿼리 값을 사용합니다.
pub fn api_key_from_request(headers: &HeaderMap, query_key: Option<&str>) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return value.split_whitespace().nth(1).map(str::to_string);
    }
    query_key.map(str::to_string)
}

/// v1 공유 키 검사
pub async fn verify_legacy_key(pool: &SqlitePool, presented: Option<&str>) -> Result<(), ApiError> {
    let expected = SettingsRepository::new(pool.clone())
        .get(LEGACY_API_SETTING)
        .await?;

    match (expected, presented) {
        (Some(expected), Some(presented)) if !expected.is_empty() && expected == presented => {
            Ok(())
        }
        _ => Err(ApiError::Forbidden("Invalid api_key".to_string())),
    }
}

/// v1 POST 요청의 원본 `Authorization` 헤더 값
pub fn raw_authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}
