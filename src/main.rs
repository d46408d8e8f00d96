use anyhow::Context;
use log::error;

use vapi::config::AppEnv;
use vapi::{start_server, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let filter = AppEnv::from_env().default_log_filter();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = AppConfig::from_env().context("설정 로드 실패")?;

    if let Err(e) = start_server(config).await {
        error!("❌ 서버 실행 실패: {}", e);
        return Err(e.into());
    }

    Ok(())
}
