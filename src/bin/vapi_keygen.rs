//! API 키 발급 도구
//!
//! ```text
//! vapi-keygen --scope gold --permission 1 --days 30
//! ```

use anyhow::{anyhow, Context};
use clap::Parser;

use vapi::auth::{ApiKeyAuthority, Permission, Scope, DEFAULT_KEY_DAYS};
use vapi::config::DEFAULT_SECRET_KEY;

#[derive(Parser, Debug)]
#[command(name = "vapi-keygen", version, about = "vAPI 키 발급")]
struct Args {
    /// 사용 범위 (*, gold, exchange_rate)
    #[arg(short, long, default_value = "*")]
    scope: String,

    /// 권한 (0: 읽기, 1: 읽기/쓰기, 2: 읽기/쓰기/삭제)
    #[arg(short, long, default_value_t = 0)]
    permission: i64,

    /// 유효 기간 (일)
    #[arg(short, long, default_value_t = DEFAULT_KEY_DAYS)]
    days: i64,

    /// 서명 키 (없으면 SECRET_KEY 환경 변수)
    #[arg(long, env = "SECRET_KEY", default_value = DEFAULT_SECRET_KEY)]
    secret: String,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let scope: Scope = args.scope.parse().map_err(|e: String| anyhow!(e))?;
    let permission = Permission::from_level(args.permission)
        .ok_or_else(|| anyhow!("권한은 0, 1, 2 중 하나여야 합니다: {}", args.permission))?;

    let key = ApiKeyAuthority::new(&args.secret)
        .issue_api_key(scope, permission, args.days)
        .context("API 키 발급 실패")?;

    println!("{}", key);
    Ok(())
}
