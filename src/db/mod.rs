pub mod models;
pub mod repository;

use log::info;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Error as SqlxError;

use crate::market::GoldMarket;

/// 데이터베이스 연결 옵션
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseOptions {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
        }
    }

    /// 테스트용 메모리 DB
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:", 1)
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// SQLite 데이터베이스 초기화 및 연결
pub async fn init_database(options: &DatabaseOptions) -> Result<SqlitePool, SqlxError> {
    info!("🗄️  SQLite 데이터베이스 초기화 중...");

    // 메모리 DB는 연결이 닫히면 내용이 사라지므로 단일 연결을 유지
    let pool = if options.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&options.url)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(options.max_connections.max(1))
            .connect(&options.url)
            .await?
    };

    create_tables(&pool).await?;

    info!("✅ 데이터베이스 초기화 완료");

    Ok(pool)
}

/// 필요한 테이블 생성
async fn create_tables(pool: &SqlitePool) -> Result<(), SqlxError> {
    // 설정 테이블
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            setting_key TEXT PRIMARY KEY,
            setting_value TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    // 환율 테이블
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS exchange_rates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bank TEXT NOT NULL,
            currency TEXT NOT NULL,
            buy REAL,
            buy_cash REAL,
            buy_transfer REAL,
            sell REAL NOT NULL,
            recorded_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    // 금 시세 테이블 (시장별)
    for market in GoldMarket::ALL {
        let columns = market
            .fields()
            .iter()
            .map(|field| format!("{} REAL NOT NULL", field))
            .collect::<Vec<_>>()
            .join(",\n            ");
        let statement = format!(
            "CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recorded_at INTEGER NOT NULL,
            {}
        )",
            market.table(),
            columns
        );
        sqlx::query(&statement).execute(pool).await?;

        let index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{0}_time ON {0}(recorded_at)",
            market.table()
        );
        sqlx::query(&index).execute(pool).await?;
    }

    // 행정구역 테이블
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS province (
            province_id INTEGER PRIMARY KEY,
            province_name TEXT NOT NULL,
            province_type TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS district (
            district_id INTEGER PRIMARY KEY,
            district_name TEXT NOT NULL,
            province_id INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ward (
            ward_id INTEGER PRIMARY KEY,
            ward_name TEXT NOT NULL,
            district_id INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    // 사업자 테이블
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS vbiz (
            vbiz_code TEXT PRIMARY KEY,
            vbiz_name TEXT NOT NULL,
            vbiz_address TEXT,
            vbiz_category_id TEXT,
            vbiz_phone TEXT,
            vbiz_email TEXT,
            vbiz_website TEXT,
            vbiz_register_date TEXT,
            vbiz_name_search TEXT NOT NULL DEFAULT ''
        )",
    )
    .execute(pool)
    .await?;

    // 인덱스 생성
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_exchange_rates_bank ON exchange_rates(bank, currency)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_exchange_rates_time ON exchange_rates(bank, recorded_at)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_district_province ON district(province_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ward_district ON ward(district_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_vbiz_category ON vbiz(vbiz_category_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_vbiz_name ON vbiz(vbiz_name_search)")
        .execute(pool)
        .await?;

    info!("📋 테이블 생성 완료");

    Ok(())
}
