use super::models::{
    BusinessRecord, BusinessSummary, DistrictRecord, ProvinceRecord, SearchMode, WardRecord,
};
use crate::market::{Bank, ExchangeRate, GoldMarket, GoldQuote};
use crate::util::vietnamese::sort_key;
use sqlx::sqlite::SqlitePool;
use sqlx::{Error as SqlxError, Row};

/// 설정 저장소
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 설정 값 조회
    pub async fn get(&self, key: &str) -> Result<Option<String>, SqlxError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT setting_value FROM settings WHERE setting_key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    /// 설정 값 저장 (없으면 생성)
    pub async fn set(&self, key: &str, value: &str) -> Result<(), SqlxError> {
        sqlx::query(
            "INSERT INTO settings (setting_key, setting_value)
             VALUES (?, ?)
             ON CONFLICT(setting_key) DO UPDATE SET setting_value = excluded.setting_value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// 환율 조회 조건
#[derive(Debug, Clone, Default)]
pub struct RateFilter {
    /// 기록 시각 범위 (양 끝 포함)
    pub recorded_between: Option<(i64, i64)>,
    pub currency: Option<String>,
}

/// 환율 저장소
pub struct ExchangeRateRepository {
    pool: SqlitePool,
}

impl ExchangeRateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 통화별 최신 환율 (통화 코드 오름차순)
    pub async fn latest(&self, bank: Bank, filter: &RateFilter) -> Result<Vec<ExchangeRate>, SqlxError> {
        let (from, to) = match filter.recorded_between {
            Some((from, to)) => (Some(from), Some(to)),
            None => (None, None),
        };

        let rates = sqlx::query_as::<_, ExchangeRate>(
            "SELECT currency, buy, buy_cash, buy_transfer, sell
             FROM exchange_rates
             WHERE id IN (
                SELECT MAX(id) FROM exchange_rates
                WHERE bank = ?
                  AND (? IS NULL OR recorded_at BETWEEN ? AND ?)
                  AND (? IS NULL OR currency = ?)
                GROUP BY currency
             )
             ORDER BY currency ASC",
        )
        .bind(bank.code())
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(filter.currency.as_deref())
        .bind(filter.currency.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rates)
    }

    /// 환율 저장
    pub async fn insert(&self, bank: Bank, rate: &ExchangeRate, recorded_at: i64) -> Result<(), SqlxError> {
        sqlx::query(
            "INSERT INTO exchange_rates
             (bank, currency, buy, buy_cash, buy_transfer, sell, recorded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(bank.code())
        .bind(&rate.currency)
        .bind(rate.buy)
        .bind(rate.buy_cash)
        .bind(rate.buy_transfer)
        .bind(rate.sell)
        .bind(recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// 금 시세 저장소
///
/// 테이블과 컬럼 이름은 [`GoldMarket`]의 고정 목록에서만 가져옵니다.
pub struct GoldPriceRepository {
    pool: SqlitePool,
}

impl GoldPriceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 가장 최근 시세
    pub async fn latest(&self, market: GoldMarket) -> Result<Option<GoldQuote>, SqlxError> {
        let statement = format!(
            "SELECT recorded_at, {} FROM {} ORDER BY recorded_at DESC, id DESC LIMIT 1",
            market.fields().join(", "),
            market.table()
        );
        let row = sqlx::query(&statement).fetch_optional(&self.pool).await?;

        row.map(|row| Self::to_quote(market, &row)).transpose()
    }

    /// 기간 내 시세 (`from <= recorded_at < to`, 오름차순)
    pub async fn between(&self, market: GoldMarket, from: i64, to: i64) -> Result<Vec<GoldQuote>, SqlxError> {
        let statement = format!(
            "SELECT recorded_at, {} FROM {}
             WHERE recorded_at >= ? AND recorded_at < ?
             ORDER BY recorded_at ASC, id ASC",
            market.fields().join(", "),
            market.table()
        );
        let rows = sqlx::query(&statement)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(|row| Self::to_quote(market, row)).collect()
    }

    /// 시세 저장
    pub async fn insert(&self, market: GoldMarket, quote: &GoldQuote) -> Result<(), SqlxError> {
        let fields = market.fields();
        let placeholders = vec!["?"; fields.len()].join(", ");
        let statement = format!(
            "INSERT INTO {} (recorded_at, {}) VALUES (?, {})",
            market.table(),
            fields.join(", "),
            placeholders
        );

        let mut query = sqlx::query(&statement).bind(quote.recorded_at);
        for price in &quote.prices {
            query = query.bind(*price);
        }
        query.execute(&self.pool).await?;

        Ok(())
    }

    fn to_quote(market: GoldMarket, row: &sqlx::sqlite::SqliteRow) -> Result<GoldQuote, SqlxError> {
        let prices = market
            .fields()
            .iter()
            .map(|field| row.try_get::<f64, _>(*field))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GoldQuote {
            recorded_at: row.try_get("recorded_at")?,
            prices,
        })
    }
}

/// 행정구역 정렬 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionOrder {
    /// 베트남어 이름순 (성조 무시)
    Name,
    /// 성은 유형/ID 순, 군/동은 ID 순
    Id,
}

/// 행정구역 저장소
pub struct ProvinceRepository {
    pool: SqlitePool,
}

impl ProvinceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 전체 성 목록
    pub async fn provinces(&self, order: RegionOrder) -> Result<Vec<ProvinceRecord>, SqlxError> {
        let mut provinces = sqlx::query_as::<_, ProvinceRecord>(
            "SELECT province_id, province_name, province_type
             FROM province
             ORDER BY province_type ASC, province_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        if order == RegionOrder::Name {
            provinces.sort_by_cached_key(|p| sort_key(&p.province_name));
        }
        Ok(provinces)
    }

    /// 성에 속한 군 목록
    pub async fn districts(&self, province_id: i64, order: RegionOrder) -> Result<Vec<DistrictRecord>, SqlxError> {
        let mut districts = sqlx::query_as::<_, DistrictRecord>(
            "SELECT district_id, district_name, province_id
             FROM district
             WHERE province_id = ?
             ORDER BY district_id ASC",
        )
        .bind(province_id)
        .fetch_all(&self.pool)
        .await?;

        if order == RegionOrder::Name {
            districts.sort_by_cached_key(|d| sort_key(&d.district_name));
        }
        Ok(districts)
    }

    /// 군에 속한 동 목록
    pub async fn wards(&self, district_id: i64, order: RegionOrder) -> Result<Vec<WardRecord>, SqlxError> {
        let mut wards = sqlx::query_as::<_, WardRecord>(
            "SELECT ward_id, ward_name, district_id
             FROM ward
             WHERE district_id = ?
             ORDER BY ward_id ASC",
        )
        .bind(district_id)
        .fetch_all(&self.pool)
        .await?;

        if order == RegionOrder::Name {
            wards.sort_by_cached_key(|w| sort_key(&w.ward_name));
        }
        Ok(wards)
    }

    pub async fn insert_province(&self, province: &ProvinceRecord) -> Result<(), SqlxError> {
        sqlx::query(
            "INSERT OR REPLACE INTO province (province_id, province_name, province_type)
             VALUES (?, ?, ?)",
        )
        .bind(province.province_id)
        .bind(&province.province_name)
        .bind(&province.province_type)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_district(&self, district: &DistrictRecord) -> Result<(), SqlxError> {
        sqlx::query(
            "INSERT OR REPLACE INTO district (district_id, district_name, province_id)
             VALUES (?, ?, ?)",
        )
        .bind(district.district_id)
        .bind(&district.district_name)
        .bind(district.province_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_ward(&self, ward: &WardRecord) -> Result<(), SqlxError> {
        sqlx::query(
            "INSERT OR REPLACE INTO ward (ward_id, ward_name, district_id)
             VALUES (?, ?, ?)",
        )
        .bind(ward.ward_id)
        .bind(&ward.ward_name)
        .bind(ward.district_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// 카테고리 조회 최대 건수
pub const CATEGORY_LIMIT: i64 = 100;

/// 검색 최대 건수
pub const SEARCH_LIMIT: i64 = 10;

/// 사업자 저장소
pub struct BusinessRepository {
    pool: SqlitePool,
}

const BUSINESS_COLUMNS: &str = "vbiz_code, vbiz_name, vbiz_address, vbiz_category_id, \
     vbiz_phone, vbiz_email, vbiz_website, vbiz_register_date";

impl BusinessRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 사업자 번호로 조회
    pub async fn find_by_code(&self, code: &str) -> Result<Vec<BusinessRecord>, SqlxError> {
        let statement = format!("SELECT {} FROM vbiz WHERE vbiz_code = ?", BUSINESS_COLUMNS);
        sqlx::query_as::<_, BusinessRecord>(&statement)
            .bind(code)
            .fetch_all(&self.pool)
            .await
    }

    /// 카테고리별 조회
    pub async fn find_by_category(&self, category_id: &str) -> Result<Vec<BusinessRecord>, SqlxError> {
        let statement = format!(
            "SELECT {} FROM vbiz WHERE vbiz_category_id = ? ORDER BY vbiz_code ASC LIMIT ?",
            BUSINESS_COLUMNS
        );
        sqlx::query_as::<_, BusinessRecord>(&statement)
            .bind(category_id)
            .bind(CATEGORY_LIMIT)
            .fetch_all(&self.pool)
            .await
    }

    /// 번호 또는 상호로 검색
    ///
    /// 상호는 소문자로 저장된 `vbiz_name_search` 컬럼과 비교하므로 베트남어 대소문자를 구분하지 않습니다.
    pub async fn search(&self, mode: &SearchMode) -> Result<Vec<BusinessSummary>, SqlxError> {
        let (condition, pattern) = match mode {
            SearchMode::CodePrefix(code) => ("vbiz_code LIKE ? ESCAPE '\\'", format!("{}%", escape_like(code))),
            SearchMode::NameContains(name) => (
                "vbiz_name_search LIKE ? ESCAPE '\\'",
                format!("%{}%", escape_like(&name.to_lowercase())),
            ),
            SearchMode::NamePrefix(name) => (
                "vbiz_name_search LIKE ? ESCAPE '\\'",
                format!("{}%", escape_like(&name.to_lowercase())),
            ),
        };
        let statement = format!(
            "SELECT vbiz_code, vbiz_name FROM vbiz WHERE {} ORDER BY vbiz_code ASC LIMIT ?",
            condition
        );

        sqlx::query_as::<_, BusinessSummary>(&statement)
            .bind(pattern)
            .bind(SEARCH_LIMIT)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn insert(&self, business: &BusinessRecord) -> Result<(), SqlxError> {
        let statement = format!(
            "INSERT OR REPLACE INTO vbiz ({}, vbiz_name_search) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            BUSINESS_COLUMNS
        );
        sqlx::query(&statement)
            .bind(&business.vbiz_code)
            .bind(&business.vbiz_name)
            .bind(&business.vbiz_address)
            .bind(&business.vbiz_category_id)
            .bind(&business.vbiz_phone)
            .bind(&business.vbiz_email)
            .bind(&business.vbiz_website)
            .bind(&business.vbiz_register_date)
            .bind(business.vbiz_name.to_lowercase())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// 테이블 행 수 (참조 데이터 적재 여부 확인용)
pub async fn count_rows(pool: &SqlitePool, table: &str) -> Result<i64, SqlxError> {
    let statement = format!("SELECT COUNT(*) FROM {}", table);
    sqlx::query_scalar::<_, i64>(&statement).fetch_one(pool).await
}

/// LIKE 패턴 특수문자 이스케이프
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
