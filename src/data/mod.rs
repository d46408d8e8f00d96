//! 참조 데이터 적재 (행정구역, 사업자)

pub mod loader;

pub use loader::{load_reference_data, DataLoadError, LoadSummary};
