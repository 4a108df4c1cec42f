use chrono::{DateTime, Utc};

use super::{format_timestamp, CsvRecord};

/// Trailing 24h statistics of a pool from the subgraph (one row of `ethusdc_stats.csv`).
///
/// `fee_tier` is empty and the USD amounts fall back to zero when the
/// indexer has no record of the pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolStatsRecord {
    pub timestamp: DateTime<Utc>,
    pub pool: String,
    pub fee_tier: String,
    pub volume_24h_usd: f64,
    pub tvl_usd: f64,
}

impl PoolStatsRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        pool: String,
        fee_tier: String,
        volume_24h_usd: f64,
        tvl_usd: f64,
    ) -> Self {
        Self {
            timestamp,
            pool,
            fee_tier,
            volume_24h_usd,
            tvl_usd,
        }
    }
}

impl CsvRecord for PoolStatsRecord {
    const HEADER: &'static [&'static str] =
        &["timestamp_iso", "pool", "feeTier", "volume24hUSD", "tvlUSD"];

    fn to_row(&self) -> Vec<String> {
        vec![
            format_timestamp(&self.timestamp),
            self.pool.clone(),
            self.fee_tier.clone(),
            self.volume_24h_usd.to_string(),
            self.tvl_usd.to_string(),
        ]
    }
}
