use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use log::info;

use crate::api::models::{KeyQuery, PushResult, RateQuery, Results};
use crate::auth::{api_key_from_request, raw_authorization, verify_legacy_key, Permission, Scope};
use crate::db::repository::{ExchangeRateRepository, RateFilter};
use crate::error::ApiError;
use crate::market::exchange_rate::{day_bounds, has_changed, RatePostBatch};
use crate::market::{Bank, ExchangeRate};
use crate::server::AppState;

const INVALID_DATE: &str = "Invalid date format. Use YYYY-MM-DD format.";

/// v1 VCB 환율 조회
pub async fn get_vcb_rates(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<Results<Vec<ExchangeRate>>>, ApiError> {
    verify_legacy_key(&state.pool, query.api_key.as_deref()).await?;

    let rates = ExchangeRateRepository::new(state.pool.clone())
        .latest(Bank::Vcb, &RateFilter::default())
        .await?;
    Ok(Results::new(rates))
}

/// v1 VCB 환율 등록
pub async fn post_vcb_rates(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RatePostBatch>, JsonRejection>,
) -> Result<PushResult, ApiError> {
    verify_legacy_key(&state.pool, raw_authorization(&headers)).await?;

    let Json(batch) = body?;
    store_rates(&state, Bank::Vcb, batch).await
}

/// v2 은행별 환율 조회
pub async fn get_bank_rates(
    State(state): State<AppState>,
    Path(bank): Path<String>,
    headers: HeaderMap,
    Query(query): Query<RateQuery>,
) -> Result<Json<Results<Vec<ExchangeRate>>>, ApiError> {
    let bank = parse_bank(&bank)?;
    let api_key = api_key_from_request(&headers, query.api_key.as_deref());
    state
        .auth
        .authorize(api_key.as_deref(), Scope::ExchangeRate, Permission::Read)?;

    let recorded_between = match query.date.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => {
            Some(day_bounds(date).ok_or_else(|| ApiError::BadRequest(INVALID_DATE.to_string()))?)
        }
        _ => None,
    };
    let currency = query
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_ascii_uppercase);

    let rates = ExchangeRateRepository::new(state.pool.clone())
        .latest(bank, &RateFilter { recorded_between, currency })
        .await?;
    Ok(Results::new(rates))
}

/// v2 은행별 환율 등록
pub async fn post_bank_rates(
    State(state): State<AppState>,
    Path(bank): Path<String>,
    headers: HeaderMap,
    Query(query): Query<KeyQuery>,
    body: Result<Json<RatePostBatch>, JsonRejection>,
) -> Result<PushResult, ApiError> {
    let bank = parse_bank(&bank)?;
    let api_key = api_key_from_request(&headers, query.api_key.as_deref());
    state
        .auth
        .authorize(api_key.as_deref(), Scope::ExchangeRate, Permission::Write)?;

    let Json(batch) = body?;
    store_rates(&state, bank, batch).await
}

fn parse_bank(code: &str) -> Result<Bank, ApiError> {
    Bank::from_code(code).ok_or_else(|| ApiError::NotFound(format!("Unknown bank: {}", code)))
}

/// 변경된 통화만 저장
///
/// 항목을 모두 검증한 뒤 저장하므로 잘못된 항목이 있으면 아무것도 저장하지 않습니다.
async fn store_rates(state: &AppState, bank: Bank, batch: RatePostBatch) -> Result<PushResult, ApiError> {
    let rates = batch
        .post_datas
        .into_iter()
        .map(|post| post.into_rate(bank))
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::BadRequest)?;

    let repo = ExchangeRateRepository::new(state.pool.clone());
    let recorded_at = Utc::now().timestamp();
    let mut stored = 0usize;

    for rate in &rates {
        let filter = RateFilter {
            recorded_between: None,
            currency: Some(rate.currency.clone()),
        };
        let latest = repo.latest(bank, &filter).await?;
        if has_changed(latest.first(), rate) {
            repo.insert(bank, rate, recorded_at).await?;
            stored += 1;
        }
    }

    if stored > 0 {
        info!("💱 {} 환율 {}건 갱신", bank.code(), stored);
    }
    Ok(PushResult { stored: stored > 0 })
}
