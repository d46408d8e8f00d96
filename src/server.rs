use std::time::Instant;

use axum::{extract::Request, middleware, middleware::Next, response::Response, Router};
use log::{info, warn};
use sqlx::sqlite::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::create_api_router;
use crate::auth::{ApiKeyAuthority, LEGACY_API_SETTING};
use crate::config::AppConfig;
use crate::data::{load_reference_data, DataLoadError};
use crate::db::repository::SettingsRepository;
use crate::db::{init_database, DatabaseOptions};
use crate::error::not_found_fallback;

/// 서버 상태
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth: ApiKeyAuthority,
}

impl AppState {
    pub fn new(pool: SqlitePool, secret_key: &str) -> Self {
        Self {
            pool,
            auth: ApiKeyAuthority::new(secret_key),
        }
    }
}

/// 서버 시작 오류
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),
    #[error("참조 데이터 적재 실패: {0}")]
    DataLoad(#[from] DataLoadError),
    #[error("서버 소켓 오류: {0}")]
    Io(#[from] std::io::Error),
}

/// 라우터에 공통 레이어 적용
pub fn build_app(state: AppState) -> Router {
    create_api_router()
        .fallback(not_found_fallback)
        .layer(middleware::from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 요청 로그 (메서드, 경로, 상태, 처리 시간)
async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().path().to_string();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();
    if status.is_server_error() {
        warn!("{} {} {} ({}ms)", method, uri, status.as_u16(), latency.as_millis());
    } else {
        info!("{} {} {} ({}ms)", method, uri, status.as_u16(), latency.as_millis());
    }

    response
}

/// 서버 시작
pub async fn start_server(config: AppConfig) -> Result<(), ServerError> {
    info!("🚀 vAPI 서버 시작 중... (환경: {:?})", config.env);

    let pool = init_database(&DatabaseOptions::new(
        config.database_url.clone(),
        config.db_max_connections,
    ))
    .await?;

    if let Some(key) = config.legacy_api_key.as_deref() {
        SettingsRepository::new(pool.clone())
            .set(LEGACY_API_SETTING, key)
            .await?;
        info!("🔑 v1 공유 API 키 설정 완료");
    }

    if let Some(dir) = config.data_dir.as_deref() {
        load_reference_data(&pool, dir).await?;
    }

    let app = build_app(AppState::new(pool.clone(), &config.secret_key));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(address.as_str()).await?;

    info!("✅ 서버가 성공적으로 시작되었습니다!");
    info!("🌐 REST API: http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 종료 신호 수신, 연결 정리 중...");
    pool.close().await;
    info!("👋 서버 종료");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Ctrl+C 핸들러 설치 실패: {}", e);
        std::future::pending::<()>().await;
    }
}
