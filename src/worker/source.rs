//! Data source seams used by the scheduler.
//!
//! `Ok(None)` from a source means "skipped": the source is not configured,
//! which is not an error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::{PoolPriceRecord, PoolStatsRecord};
use crate::error::{QueryFailure, ReadFailure};

/// Produces the on-chain price row for a tick.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn read_price(&self, now: DateTime<Utc>) -> Result<Option<PoolPriceRecord>, ReadFailure>;
}

/// Produces the indexer statistics row for a tick.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_stats(&self, now: DateTime<Utc>) -> Result<Option<PoolStatsRecord>, QueryFailure>;
}
