use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::deserialize_optional_price;

/// 환율 제공 은행
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    /// 베트남 국가은행
    Sbv,
    /// Vietcombank
    Vcb,
    /// VietinBank
    Ctg,
    /// Techcombank
    Tcb,
    /// BIDV
    Bid,
    /// Sacombank
    Stb,
}

/// 은행별 고시 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    /// 매입/매도
    BuySell,
    /// 현금 매입/송금 매입/매도
    CashTransfer,
}

impl Bank {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "sbv" => Some(Self::Sbv),
            "vcb" => Some(Self::Vcb),
            "ctg" => Some(Self::Ctg),
            "tcb" => Some(Self::Tcb),
            "bid" => Some(Self::Bid),
            "stb" => Some(Self::Stb),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Sbv => "sbv",
            Self::Vcb => "vcb",
            Self::Ctg => "ctg",
            Self::Tcb => "tcb",
            Self::Bid => "bid",
            Self::Stb => "stb",
        }
    }

    pub fn rate_kind(&self) -> RateKind {
        match self {
            Self::Sbv => RateKind::BuySell,
            _ => RateKind::CashTransfer,
        }
    }
}

/// 통화별 환율
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExchangeRate {
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_cash: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_transfer: Option<f64>,
    pub sell: f64,
}

/// 환율 등록 요청 항목
#[derive(Debug, Clone, Deserialize)]
pub struct RatePost {
    pub currency: String,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub buy: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub buy_cash: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub buy_transfer: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub sell: Option<f64>,
}

/// 환율 등록 요청
#[derive(Debug, Clone, Deserialize)]
pub struct RatePostBatch {
    pub post_datas: Vec<RatePost>,
}

impl RatePost {
    /// 은행 고시 형식에 맞는 환율로 변환
    pub fn into_rate(self, bank: Bank) -> Result<ExchangeRate, String> {
        let currency = normalize_currency(&self.currency)
            .ok_or_else(|| format!("Invalid currency: {}", self.currency))?;
        let sell = require(self.sell, &currency, "sell")?;

        let rate = match bank.rate_kind() {
            RateKind::BuySell => ExchangeRate {
                buy: Some(require(self.buy, &currency, "buy")?),
                buy_cash: None,
                buy_transfer: None,
                sell,
                currency,
            },
            RateKind::CashTransfer => ExchangeRate {
                buy: None,
                buy_cash: Some(require(self.buy_cash, &currency, "buy_cash")?),
                buy_transfer: Some(require(self.buy_transfer, &currency, "buy_transfer")?),
                sell,
                currency,
            },
        };
        Ok(rate)
    }
}

fn require(value: Option<f64>, currency: &str, field: &str) -> Result<f64, String> {
    value.ok_or_else(|| format!("Missing field {} for {}", field, currency))
}

/// 통화 코드 정규화 (영문 3자, 대문자)
pub fn normalize_currency(code: &str) -> Option<String> {
    let code = code.trim();
    (code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| code.to_ascii_uppercase())
}

/// 최신 환율과 비교해 새로 저장해야 하는지 판단
pub fn has_changed(latest: Option<&ExchangeRate>, posted: &ExchangeRate) -> bool {
    latest.map_or(true, |latest| latest != posted)
}

/// `YYYY-MM-DD` 날짜를 해당 일자(UTC)의 시작/끝 유닉스 초로 변환
pub fn day_bounds(date: &str) -> Option<(i64, i64)> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let start = day.and_time(NaiveTime::MIN).and_utc().timestamp();
    Some((start, start + 86_399))
}
