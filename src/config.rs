use std::env;
use std::path::PathBuf;

use log::{info, warn};

/// 기본 서명 키 (운영 환경에서는 반드시 교체)
pub const DEFAULT_SECRET_KEY: &str = "vapi";

/// 실행 환경
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Testing,
    Production,
}

impl AppEnv {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            "testing" | "test" => Self::Testing,
            _ => Self::Production,
        }
    }

    /// `APP_ENV` 환경 변수 (없으면 운영 환경)
    pub fn from_env() -> Self {
        env::var("APP_ENV")
            .map(|v| Self::parse(&v))
            .unwrap_or(Self::Production)
    }

    pub fn is_debug(&self) -> bool {
        !matches!(self, Self::Production)
    }

    /// `RUST_LOG`가 없을 때 사용할 로그 수준
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_debug() {
            "debug"
        } else {
            "info"
        }
    }
}

/// 설정 오류
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("환경 변수 {name} 값이 올바르지 않음: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: AppEnv,
    pub secret_key: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub data_dir: Option<PathBuf>,
    pub legacy_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: AppEnv::Production,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            database_url: "sqlite://vapi.db?mode=rwc".to_string(),
            db_max_connections: 5,
            host: "0.0.0.0".to_string(),
            port: 7000,
            data_dir: None,
            legacy_api_key: None,
        }
    }
}

impl AppConfig {
    /// `.env` 파일과 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenv::dotenv().is_ok() {
            info!("📄 .env 파일 로드 완료");
        }

        let defaults = Self::default();
        let config = Self {
            env: AppEnv::from_env(),
            secret_key: non_empty("SECRET_KEY").unwrap_or(defaults.secret_key),
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS")?
                .unwrap_or(defaults.db_max_connections),
            host: non_empty("VAPI_HOST").unwrap_or(defaults.host),
            port: parse_var("VAPI_PORT")?.unwrap_or(defaults.port),
            data_dir: non_empty("DATA_DIR").map(PathBuf::from),
            legacy_api_key: non_empty("LEGACY_API_KEY"),
        };

        if config.env == AppEnv::Production && config.secret_key == DEFAULT_SECRET_KEY {
            warn!("⚠️ 운영 환경에서 기본 SECRET_KEY를 사용 중입니다");
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match non_empty(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(None),
    }
}
