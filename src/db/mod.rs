//! Persistence layer: record models and the append-only CSV logs they are
//! written to.

pub mod appender;
pub mod models;

pub use appender::CsvAppender;
pub use models::{CsvRecord, HourlyBucket, PoolPriceRecord, PoolStatsRecord};
