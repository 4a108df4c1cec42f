pub mod abis;
pub mod config;
pub mod cron;
pub mod db;
pub mod error;
pub mod utils;
pub mod worker;

pub use config::Settings;
pub use cron::{FlowOutcome, Scheduler, TickReport};
pub use db::{CsvAppender, PoolPriceRecord, PoolStatsRecord};
pub use error::{ConfigError, QueryFailure, ReadFailure, WriteFailure};
pub use worker::{IndexerVolumeAggregator, OnChainPriceReader, PriceSource, StatsSource};
