//! 시세 도메인 (금 시세, 환율)

pub mod exchange_rate;
pub mod gold;

use serde::{Deserialize, Deserializer};

pub use exchange_rate::{Bank, ExchangeRate, RateKind, RatePost};
pub use gold::{GoldMarket, GoldQuote};

/// 가격 필드 파싱 (`25416.27` 또는 `"25416.27"`), 유한한 값만 허용
pub fn parse_price(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

pub(crate) fn deserialize_optional_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => parse_price(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid price: {}", value))),
    }
}
