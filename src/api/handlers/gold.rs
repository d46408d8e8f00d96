use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use log::info;
use serde_json::Value;

use crate::api::models::{GoldQuery, KeyQuery, PushResult, Results};
use crate::auth::{api_key_from_request, raw_authorization, verify_legacy_key, Permission, Scope};
use crate::db::repository::GoldPriceRepository;
use crate::error::ApiError;
use crate::market::gold::{first_per_day, has_changed, requested_range, DatetimeStyle};
use crate::market::{GoldMarket, GoldQuote};
use crate::server::AppState;

/// v1 금 시세 조회 (SJC, DOJI)
pub async fn get_gold_v1(
    State(state): State<AppState>,
    Path(market): Path<String>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<Results<Vec<Value>>>, ApiError> {
    let market = parse_market(&market, true)?;
    verify_legacy_key(&state.pool, query.api_key.as_deref()).await?;

    let latest = GoldPriceRepository::new(state.pool.clone()).latest(market).await?;
    Ok(Results::new(render(market, latest, DatetimeStyle::Integer)))
}

/// v1 금 시세 등록
pub async fn post_gold_v1(
    State(state): State<AppState>,
    Path(market): Path<String>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<PushResult, ApiError> {
    let market = parse_market(&market, true)?;
    verify_legacy_key(&state.pool, raw_authorization(&headers)).await?;

    let Json(body) = body?;
    store_quote(&state, market, &body).await
}

/// v2 금 시세 조회
///
/// `date_from < date_to`이면 기간 내 일자별 첫 시세, 아니면 최신 시세 한 건.
pub async fn get_gold_v2(
    State(state): State<AppState>,
    Path(market): Path<String>,
    headers: HeaderMap,
    Query(query): Query<GoldQuery>,
) -> Result<Json<Results<Vec<Value>>>, ApiError> {
    let market = parse_market(&market, false)?;
    let api_key = api_key_from_request(&headers, query.api_key.as_deref());
    state
        .auth
        .authorize(api_key.as_deref(), Scope::Gold, Permission::Read)?;

    let date_from = parse_timestamp("date_from", query.date_from.as_deref())?;
    let date_to = parse_timestamp("date_to", query.date_to.as_deref())?;
    let repo = GoldPriceRepository::new(state.pool.clone());

    let quotes = match requested_range(date_from, date_to) {
        Some((from, to)) => first_per_day(repo.between(market, from, to).await?),
        None => repo.latest(market).await?.into_iter().collect(),
    };

    let results = quotes
        .iter()
        .map(|quote| quote.to_json(market, DatetimeStyle::Text))
        .collect();
    Ok(Results::new(results))
}

/// v2 금 시세 등록
pub async fn post_gold_v2(
    State(state): State<AppState>,
    Path(market): Path<String>,
    headers: HeaderMap,
    Query(query): Query<KeyQuery>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<PushResult, ApiError> {
    let market = parse_market(&market, false)?;
    let api_key = api_key_from_request(&headers, query.api_key.as_deref());
    state
        .auth
        .authorize(api_key.as_deref(), Scope::Gold, Permission::Write)?;

    let Json(body) = body?;
    store_quote(&state, market, &body).await
}

fn parse_market(code: &str, v1: bool) -> Result<GoldMarket, ApiError> {
    GoldMarket::from_code(code)
        .filter(|market| !v1 || market.in_v1())
        .ok_or_else(|| ApiError::NotFound(format!("Unknown gold market: {}", code)))
}

/// 빈 값은 0
fn parse_timestamp(name: &str, value: Option<&str>) -> Result<i64, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(0),
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| ApiError::InvalidParameter(name.to_string())),
    }
}

fn render(market: GoldMarket, quote: Option<GoldQuote>, style: DatetimeStyle) -> Vec<Value> {
    quote
        .iter()
        .map(|quote| quote.to_json(market, style))
        .collect()
}

async fn store_quote(state: &AppState, market: GoldMarket, body: &Value) -> Result<PushResult, ApiError> {
    let fields = body
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("Request body must be a JSON object".to_string()))?;
    let prices = market.parse_prices(fields).map_err(ApiError::BadRequest)?;

    let repo = GoldPriceRepository::new(state.pool.clone());
    let latest = repo.latest(market).await?;
    if !has_changed(latest.as_ref(), &prices) {
        return Ok(PushResult { stored: false });
    }

    let quote = GoldQuote {
        recorded_at: Utc::now().timestamp(),
        prices,
    };
    repo.insert(market, &quote).await?;
    info!("🪙 {} 금 시세 갱신", market.code());

    Ok(PushResult { stored: true })
}
