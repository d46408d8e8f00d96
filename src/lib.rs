//! vAPI
//!
//! 베트남 프로젝트를 위한 공개 API 서버입니다.
//! 환율, 금 시세, 행정구역(성/군/동), 사업자(vBiz) 조회를 제공합니다.

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod market;
pub mod server;
pub mod util;

pub use config::AppConfig;
pub use error::ApiError;
pub use server::{build_app, start_server, AppState};
