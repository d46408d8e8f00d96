use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Number, Value};

use super::parse_price;

/// 금 시세 제공처
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoldMarket {
    Sjc,
    Doji,
    Pnj,
}

const SJC_FIELDS: &[&str] = &[
    "buy_1l",
    "sell_1l",
    "buy_1c",
    "sell_1c",
    "buy_nhan1c",
    "sell_nhan1c",
    "buy_trangsuc49",
    "sell_trangsuc49",
];

const REGIONAL_FIELDS: &[&str] = &["buy_hcm", "sell_hcm", "buy_hn", "sell_hn"];

impl GoldMarket {
    pub const ALL: [GoldMarket; 3] = [GoldMarket::Sjc, GoldMarket::Doji, GoldMarket::Pnj];

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "sjc" => Some(Self::Sjc),
            "doji" => Some(Self::Doji),
            "pnj" => Some(Self::Pnj),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Sjc => "sjc",
            Self::Doji => "doji",
            Self::Pnj => "pnj",
        }
    }

    /// v1 API에서 제공하는 시장인지 여부
    pub fn in_v1(&self) -> bool {
        !matches!(self, Self::Pnj)
    }

    pub fn table(&self) -> &'static str {
        match self {
            Self::Sjc => "gold_sjc",
            Self::Doji => "gold_doji",
            Self::Pnj => "gold_pnj",
        }
    }

    /// 시장별 가격 필드 (저장/응답 순서)
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Sjc => SJC_FIELDS,
            Self::Doji | Self::Pnj => REGIONAL_FIELDS,
        }
    }

    /// 요청 본문에서 가격 필드 추출
    pub fn parse_prices(&self, body: &Map<String, Value>) -> Result<Vec<f64>, String> {
        self.fields()
            .iter()
            .map(|field| {
                let value = body
                    .get(*field)
                    .ok_or_else(|| format!("Missing field: {}", field))?;
                parse_price(value).ok_or_else(|| format!("Invalid value for field: {}", field))
            })
            .collect()
    }
}

/// `datetime` 응답 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatetimeStyle {
    /// v1: 정수 유닉스 초
    Integer,
    /// v2: 유닉스 초 문자열
    Text,
}

/// 금 시세 한 건
#[derive(Debug, Clone, PartialEq)]
pub struct GoldQuote {
    pub recorded_at: i64,
    pub prices: Vec<f64>,
}

impl GoldQuote {
    pub fn day(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.recorded_at, 0).map(|dt| dt.date_naive())
    }

    pub fn to_json(&self, market: GoldMarket, style: DatetimeStyle) -> Value {
        let mut obj = Map::new();
        let datetime = match style {
            DatetimeStyle::Integer => Value::Number(self.recorded_at.into()),
            DatetimeStyle::Text => Value::String(self.recorded_at.to_string()),
        };
        obj.insert("datetime".to_string(), datetime);
        for (field, price) in market.fields().iter().zip(&self.prices) {
            let value = Number::from_f64(*price).map(Value::Number).unwrap_or(Value::Null);
            obj.insert((*field).to_string(), value);
        }
        Value::Object(obj)
    }
}

/// 최신 시세와 비교해 새로 저장해야 하는지 판단
pub fn has_changed(latest: Option<&GoldQuote>, prices: &[f64]) -> bool {
    match latest {
        Some(latest) => latest.prices.as_slice() != prices,
        None => true,
    }
}

/// `date_from`, `date_to` 쿼리가 유효한 기간이면 반환
pub fn requested_range(date_from: i64, date_to: i64) -> Option<(i64, i64)> {
    (date_from != 0 && date_to != 0 && date_from < date_to).then_some((date_from, date_to))
}

/// 일자별 첫 시세만 남김 (입력은 기록 시각 오름차순)
pub fn first_per_day(quotes: Vec<GoldQuote>) -> Vec<GoldQuote> {
    let mut result: Vec<GoldQuote> = Vec::new();
    let mut last_day: Option<NaiveDate> = None;
    for quote in quotes {
        let day = quote.day();
        if day.is_some() && day == last_day {
            continue;
        }
        last_day = day;
        result.push(quote);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DAY: i64 = 86_400;

    fn quote(recorded_at: i64, price: f64) -> GoldQuote {
        GoldQuote {
            recorded_at,
            prices: vec![price; 4],
        }
    }

    #[test]
    fn test_market_codes() {
        assert_eq!(GoldMarket::from_code("SJC"), Some(GoldMarket::Sjc));
        assert_eq!(GoldMarket::from_code("pnj"), Some(GoldMarket::Pnj));
        assert_eq!(GoldMarket::from_code("btmc"), None);
        assert!(!GoldMarket::Pnj.in_v1());
        assert_eq!(GoldMarket::Sjc.fields().len(), 8);
        assert_eq!(GoldMarket::Doji.fields(), GoldMarket::Pnj.fields());
    }

    #[test]
    fn test_parse_prices() {
        let body = json!({
            "buy_hcm": 42550000.0,
            "sell_hcm": "42750000",
            "buy_hn": 42550000,
            "sell_hn": 42770000.0
        });
        let prices = GoldMarket::Doji
            .parse_prices(body.as_object().unwrap())
            .unwrap();
        assert_eq!(prices, vec![42550000.0, 42750000.0, 42550000.0, 42770000.0]);

        let missing = json!({ "buy_hcm": 1.0 });
        let err = GoldMarket::Doji
            .parse_prices(missing.as_object().unwrap())
            .unwrap_err();
        assert_eq!(err, "Missing field: sell_hcm");
    }

    #[test]
    fn test_has_changed() {
        let latest = quote(0, 1.0);
        assert!(has_changed(None, &[1.0; 4]));
        assert!(!has_changed(Some(&latest), &[1.0; 4]));
        assert!(has_changed(Some(&latest), &[1.0, 1.0, 1.0, 2.0]));
    }

    #[test]
    fn test_requested_range() {
        assert_eq!(requested_range(10, 20), Some((10, 20)));
        assert_eq!(requested_range(0, 20), None);
        assert_eq!(requested_range(20, 10), None);
        assert_eq!(requested_range(10, 10), None);
    }

    #[test]
    fn test_first_per_day_keeps_earliest_quote() {
        let quotes = vec![
            quote(DAY * 100 + 10, 1.0),
            quote(DAY * 100 + 500, 2.0),
            quote(DAY * 101 + 5, 3.0),
            quote(DAY * 103 + 1, 4.0),
            quote(DAY * 103 + 2, 5.0),
        ];
        let daily = first_per_day(quotes);
        let prices: Vec<f64> = daily.iter().map(|q| q.prices[0]).collect();
        assert_eq!(prices, vec![1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_to_json_datetime_style() {
        let q = quote(1_600_000_000, 1.5);
        let v1 = q.to_json(GoldMarket::Doji, DatetimeStyle::Integer);
        let v2 = q.to_json(GoldMarket::Doji, DatetimeStyle::Text);
        assert_eq!(v1["datetime"], json!(1_600_000_000));
        assert_eq!(v2["datetime"], json!("1600000000"));
        assert_eq!(v2["sell_hn"], json!(1.5));
    }
}
