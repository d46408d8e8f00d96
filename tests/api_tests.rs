//! HTTP 통합 테스트 (메모리 DB + oneshot 요청)

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use vapi::auth::{Permission, Scope};
use vapi::db::models::{BusinessRecord, DistrictRecord, ProvinceRecord, WardRecord};
use vapi::db::repository::{
    BusinessRepository, ExchangeRateRepository, GoldPriceRepository, ProvinceRepository,
    SettingsRepository,
};
use vapi::db::{init_database, DatabaseOptions};
use vapi::market::{Bank, ExchangeRate, GoldMarket, GoldQuote};
use vapi::{build_app, AppState};

const SECRET: &str = "integration-secret";
const LEGACY_KEY: &str = "legacy-key";
const DAY: i64 = 86_400;

async fn setup() -> (Router, AppState) {
    setup_with_legacy_key(Some(LEGACY_KEY)).await
}

async fn setup_with_legacy_key(legacy_key: Option<&str>) -> (Router, AppState) {
    let pool = init_database(&DatabaseOptions::in_memory()).await.unwrap();
    if let Some(legacy_key) = legacy_key {
        SettingsRepository::new(pool.clone())
            .set("api", legacy_key)
            .await
            .unwrap();
    }

    let state = AppState::new(pool, SECRET);
    (build_app(state.clone()), state)
}

fn key(state: &AppState, scope: Scope, permission: Permission) -> String {
    state.auth.issue_api_key(scope, permission, 15).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_bearer(uri: &str, api_key: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, authorization: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(authorization) = authorization {
        builder = builder.header(header::AUTHORIZATION, authorization);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn doji_body(sell_hn: f64) -> Value {
    json!({
        "buy_hcm": 42550000.0,
        "sell_hcm": 42750000.0,
        "buy_hn": 42550000.0,
        "sell_hn": sell_hn
    })
}

async fn seed_regions(state: &AppState) {
    let repo = ProvinceRepository::new(state.pool.clone());
    for (id, name, kind) in [
        (1, "Hà Nội", "Thành phố Trung ương"),
        (48, "Đà Nẵng", "Thành phố Trung ương"),
        (92, "Cần Thơ", "Thành phố Trung ương"),
        (89, "An Giang", "Tỉnh"),
    ] {
        repo.insert_province(&ProvinceRecord {
            province_id: id,
            province_name: name.to_string(),
            province_type: kind.to_string(),
        })
        .await
        .unwrap();
    }
    for (id, name) in [(492, "Quận Thanh Khê"), (490, "Quận Hải Châu"), (491, "Quận Cẩm Lệ")] {
        repo.insert_district(&DistrictRecord {
            district_id: id,
            district_name: name.to_string(),
            province_id: 48,
        })
        .await
        .unwrap();
    }
    repo.insert_ward(&WardRecord {
        ward_id: 20194,
        ward_name: "Phường Thạch Thang".to_string(),
        district_id: 490,
    })
    .await
    .unwrap();
}

fn names(body: &Value, field: &str) -> Vec<String> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item[field].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_root_and_health() {
    let (app, _) = setup().await;

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let (app, _) = setup().await;

    let (status, body) = send(&app, get("/api/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "404 - Not Found");
}

#[tokio::test]
async fn test_province_ordering_v1_and_v2() {
    let (app, state) = setup().await;
    seed_regions(&state).await;

    let (status, body) = send(&app, get("/api/province/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        names(&body, "province_name"),
        vec!["An Giang", "Cần Thơ", "Đà Nẵng", "Hà Nội"]
    );

    let (status, body) = send(&app, get("/api/v2/province?api_key=ignored")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["province_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 48, 92, 89]);
}

#[tokio::test]
async fn test_districts_and_wards() {
    let (app, state) = setup().await;
    seed_regions(&state).await;

    let (_, body) = send(&app, get("/api/province/district/48")).await;
    assert_eq!(
        names(&body, "district_name"),
        vec!["Quận Cẩm Lệ", "Quận Hải Châu", "Quận Thanh Khê"]
    );

    let (_, body) = send(&app, get("/api/v2/province/district/48")).await;
    assert_eq!(
        names(&body, "district_name"),
        vec!["Quận Hải Châu", "Quận Cẩm Lệ", "Quận Thanh Khê"]
    );

    let (status, body) = send(&app, get("/api/v2/province/ward/490")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["ward_id"], 20194);

    let (status, body) = send(&app, get("/api/province/district/999")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_non_integer_region_id_is_rejected() {
    let (app, _) = setup().await;

    let (status, body) = send(&app, get("/api/province/district/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "400 - Bad Request");
    assert_eq!(body["message"], "Invalid parameter: province_id");

    let (status, _) = send(&app, get("/api/v2/province/ward/1.5")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_v2_gold_requires_scoped_key() {
    let (app, state) = setup().await;

    let (status, body) = send(&app, get("/api/v2/gold/sjc")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "403 - Forbidden");
    assert_eq!(body["message"], "Auth Error: No api_key");

    let rate_key = key(&state, Scope::ExchangeRate, Permission::Read);
    let (status, body) = send(&app, get_with_bearer("/api/v2/gold/sjc", &rate_key)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Auth Error: Out of scope");

    let gold_key = key(&state, Scope::Gold, Permission::Read);
    let uri = format!("/api/v2/gold/sjc?api_key={}", gold_key);
    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_v2_gold_push_is_idempotent() {
    let (app, state) = setup().await;
    let writer = format!("Bearer {}", key(&state, Scope::Gold, Permission::Write));
    let reader = format!("Bearer {}", key(&state, Scope::Gold, Permission::Read));

    let (status, body) = send(&app, post("/api/v2/gold/doji", Some(&reader), &doji_body(1.0))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Auth Error: No permission");

    let (status, body) = send(&app, post("/api/v2/gold/doji", Some(&writer), &doji_body(42770000.0))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"results": 201}));

    let (status, body) = send(&app, post("/api/v2/gold/doji", Some(&writer), &doji_body(42770000.0))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"results": 200}));

    let (status, _) = send(&app, post("/api/v2/gold/doji", Some(&writer), &doji_body(42800000.0))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, get_with_bearer("/api/v2/gold/doji", &writer[7..])).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["sell_hn"], 42800000.0);
    assert!(results[0]["datetime"].is_string());
}

#[tokio::test]
async fn test_v2_gold_rejects_incomplete_body() {
    let (app, state) = setup().await;
    let writer = format!("Bearer {}", key(&state, Scope::All, Permission::Write));

    let (status, body) = send(
        &app,
        post("/api/v2/gold/pnj", Some(&writer), &json!({"buy_hcm": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing field: sell_hcm");

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/api/v2/gold/pnj")
        .header(header::AUTHORIZATION, writer.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_v2_gold_daily_range() {
    let (app, state) = setup().await;
    let repo = GoldPriceRepository::new(state.pool.clone());
    let base = DAY * 19_000;
    for (offset, price) in [
        (10, 1.0),
        (3_600, 2.0),
        (DAY + 20, 3.0),
        (DAY + 7_200, 4.0),
        (3 * DAY + 5, 5.0),
    ] {
        let quote = GoldQuote {
            recorded_at: base + offset,
            prices: vec![price; 8],
        };
        repo.insert(GoldMarket::Sjc, &quote).await.unwrap();
    }
    let gold_key = key(&state, Scope::Gold, Permission::Read);

    let uri = format!(
        "/api/v2/gold/sjc?api_key={}&date_from={}&date_to={}",
        gold_key,
        base,
        base + 3 * DAY
    );
    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let prices: Vec<f64> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["buy_1l"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![1.0, 3.0]);
    assert_eq!(body["results"][0]["datetime"], json!((base + 10).to_string()));

    // 기간이 뒤집히면 최신 시세만
    let uri = format!(
        "/api/v2/gold/sjc?api_key={}&date_from={}&date_to={}",
        gold_key,
        base + 3 * DAY,
        base
    );
    let (_, body) = send(&app, get(&uri)).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["buy_1l"], 5.0);

    let uri = format!("/api/v2/gold/sjc?api_key={}&date_from=abc&date_to=1", gold_key);
    let (status, _) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_v1_gold_uses_legacy_key() {
    let (app, _) = setup().await;
    let body = json!({
        "buy_1l": 42550000, "sell_1l": 42750000,
        "buy_1c": 42550000, "sell_1c": 42770000,
        "buy_nhan1c": 42500000, "sell_nhan1c": 42950000,
        "buy_trangsuc49": 41850000, "sell_trangsuc49": 42550000
    });

    let (status, err) = send(&app, post("/api/gold/sjc", Some("wrong"), &body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["message"], "Invalid api_key");

    let (status, _) = send(&app, post("/api/gold/sjc", Some(LEGACY_KEY), &body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, get("/api/gold/sjc?api_key=wrong")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, result) = send(&app, get(&format!("/api/gold/sjc?api_key={}", LEGACY_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(result["results"][0]["datetime"].is_i64());
    assert_eq!(result["results"][0]["sell_trangsuc49"], 42550000.0);

    let (status, _) = send(&app, get(&format!("/api/gold/pnj?api_key={}", LEGACY_KEY))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_v1_vcb_exchange_rate() {
    let (app, _) = setup().await;
    let batch = json!({
        "post_datas": [
            {"currency": "USD", "buy_cash": 23130, "buy_transfer": 23160, "sell": 23250},
            {"currency": "EUR", "buy_cash": "25416.27", "buy_transfer": 25492.75, "sell": 26258.39}
        ]
    });

    let (status, _) = send(&app, post("/api/exchange_rate/vcb", Some(LEGACY_KEY), &batch)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, post("/api/exchange_rate/vcb", Some(LEGACY_KEY), &batch)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get(&format!("/api/exchange_rate/vcb?api_key={}", LEGACY_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body, "currency"), vec!["EUR", "USD"]);
    assert_eq!(body["results"][0]["buy_cash"], 25416.27);
    assert!(body["results"][0].get("buy").is_none());
}

#[tokio::test]
async fn test_v2_exchange_rate_filters() {
    let (app, state) = setup().await;
    let repo = ExchangeRateRepository::new(state.pool.clone());
    let jan_15 = 1_705_276_800;
    for (currency, sell, recorded_at) in [
        ("USD", 24_000.0, jan_15 + 100),
        ("USD", 24_100.0, jan_15 + DAY + 100),
        ("JPY", 170.0, jan_15 + 200),
    ] {
        let rate = ExchangeRate {
            currency: currency.to_string(),
            buy: None,
            buy_cash: Some(sell - 100.0),
            buy_transfer: Some(sell - 50.0),
            sell,
        };
        repo.insert(Bank::Tcb, &rate, recorded_at).await.unwrap();
    }
    let rate_key = key(&state, Scope::ExchangeRate, Permission::Read);

    let (_, body) = send(&app, get_with_bearer("/api/v2/exchange_rate/tcb", &rate_key)).await;
    assert_eq!(names(&body, "currency"), vec!["JPY", "USD"]);
    assert_eq!(body["results"][1]["sell"], 24_100.0);

    let (_, body) = send(
        &app,
        get_with_bearer("/api/v2/exchange_rate/tcb?date=2024-01-15&currency=usd", &rate_key),
    )
    .await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["sell"], 24_000.0);

    let (status, body) = send(
        &app,
        get_with_bearer("/api/v2/exchange_rate/tcb?date=15-01-2024", &rate_key),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid date format. Use YYYY-MM-DD format.");

    let (status, _) = send(&app, get_with_bearer("/api/v2/exchange_rate/xyz", &rate_key)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_v2_sbv_push_requires_buy() {
    let (app, state) = setup().await;
    let writer = format!("Bearer {}", key(&state, Scope::ExchangeRate, Permission::Write));

    let missing = json!({"post_datas": [{"currency": "USD", "sell": 23650}]});
    let (status, body) = send(&app, post("/api/v2/exchange_rate/sbv", Some(&writer), &missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing field buy for USD");

    let valid = json!({"post_datas": [{"currency": "USD", "buy": 23175, "sell": 23650}]});
    let (status, _) = send(&app, post("/api/v2/exchange_rate/sbv", Some(&writer), &valid)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, get_with_bearer("/api/v2/exchange_rate/sbv", &writer[7..])).await;
    assert_eq!(body["results"][0]["buy"], 23175.0);
    assert!(body["results"][0].get("buy_cash").is_none());
}

#[tokio::test]
async fn test_vbiz_lookups() {
    let (app, state) = setup().await;
    let repo = BusinessRepository::new(state.pool.clone());
    for (code, name, category) in [
        ("0100109106", "Viettel Group", "61"),
        ("0101248141", "FPT Corporation", "62"),
        ("0300588569", "Vinamilk", "10"),
    ] {
        repo.insert(&BusinessRecord {
            vbiz_code: code.to_string(),
            vbiz_name: name.to_string(),
            vbiz_address: Some("Hà Nội".to_string()),
            vbiz_category_id: Some(category.to_string()),
            vbiz_phone: None,
            vbiz_email: None,
            vbiz_website: None,
            vbiz_register_date: None,
        })
        .await
        .unwrap();
    }

    let (status, body) = send(&app, get("/api/vbiz/0101248141")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["vbiz_name"], "FPT Corporation");
    assert_eq!(body["results"][0]["vbiz_category_id"], "62");

    let (_, body) = send(&app, get("/api/vbiz/cat/10")).await;
    assert_eq!(names(&body, "vbiz_code"), vec!["0300588569"]);

    let (_, body) = send(&app, get("/api/vbiz/search/010")).await;
    assert_eq!(names(&body, "vbiz_code"), vec!["0100109106", "0101248141"]);

    let (_, body) = send(&app, get("/api/vbiz/search/fpt")).await;
    assert_eq!(names(&body, "vbiz_code"), vec!["0101248141"]);
    assert!(body["results"][0].get("vbiz_address").is_none());

    let (status, _) = send(&app, get("/api/vbiz/search/%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_v1_rejects_every_key_without_stored_setting() {
    let (app, _) = setup_with_legacy_key(None).await;

    let (status, body) = send(&app, get("/api/exchange_rate/vcb?api_key=anything")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid api_key");

    let (status, _) = send(&app, get("/api/gold/sjc")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, post("/api/gold/doji", Some(""), &doji_body(1.0))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_authorization_without_scheme_skips_query_key() {
    let (app, state) = setup().await;
    let gold_key = key(&state, Scope::Gold, Permission::Read);

    let request = Request::builder()
        .uri(format!("/api/v2/gold/sjc?api_key={}", gold_key))
        .header(header::AUTHORIZATION, gold_key.as_str())
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Auth Error: No api_key");
}

#[tokio::test]
async fn test_rate_batch_with_invalid_entry_stores_nothing() {
    let (app, state) = setup().await;
    let writer = format!("Bearer {}", key(&state, Scope::ExchangeRate, Permission::Write));

    let mixed = json!({
        "post_datas": [
            {"currency": "USD", "buy_cash": 23130, "buy_transfer": 23160, "sell": 23250},
            {"currency": "EUR", "buy_transfer": 25492.75, "sell": 26258.39}
        ]
    });
    let (status, body) = send(&app, post("/api/v2/exchange_rate/vcb", Some(&writer), &mixed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing field buy_cash for EUR");

    let (_, body) = send(&app, get_with_bearer("/api/v2/exchange_rate/vcb", &writer[7..])).await;
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_rate_push_rejects_non_finite_prices() {
    let (app, state) = setup().await;
    let writer = format!("Bearer {}", key(&state, Scope::ExchangeRate, Permission::Write));

    for batch in [
        json!({"post_datas": [{"currency": "EUR", "buy_cash": "NaN", "buy_transfer": "inf", "sell": 1.0}]}),
        json!({"post_datas": [{"currency": "EUR", "buy_cash": 1.0, "buy_transfer": 1.0, "sell": "NaN"}]}),
    ] {
        let (status, body) = send(&app, post("/api/v2/exchange_rate/vcb", Some(&writer), &batch)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body["message"].as_str().unwrap().contains("constraint"));
    }

    let (_, body) = send(&app, get_with_bearer("/api/v2/exchange_rate/vcb", &writer[7..])).await;
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_vbiz_search_ignores_vietnamese_case() {
    let (app, state) = setup().await;
    BusinessRepository::new(state.pool.clone())
        .insert(&BusinessRecord {
            vbiz_code: "0300588569".to_string(),
            vbiz_name: "Công ty Cổ phần Sữa Việt Nam".to_string(),
            vbiz_address: None,
            vbiz_category_id: Some("10".to_string()),
            vbiz_phone: None,
            vbiz_email: None,
            vbiz_website: None,
            vbiz_register_date: None,
        })
        .await
        .unwrap();

    // CÔNG, SỮA, Sữa
    for uri in [
        "/api/vbiz/search/C%C3%94NG",
        "/api/vbiz/search/S%E1%BB%AEA",
        "/api/vbiz/search/S%E1%BB%AFa",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body, "vbiz_code"), vec!["0300588569"], "{}", uri);
    }
}
