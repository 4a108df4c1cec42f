//! Trailing 24h pool statistics from a Uniswap V3 subgraph.
//!
//! One query returns the pool's metadata and its hourly buckets since
//! `now - 24h`. Volume is the plain sum of whatever buckets came back (no
//! partial-hour weighting, fewer than 24 buckets is fine); TVL is the most
//! recent bucket's, falling back to the pool's current TVL.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::config::{Settings, StatsTarget};
use crate::db::{HourlyBucket, PoolStatsRecord};
use crate::error::QueryFailure;
use crate::utils::validate_usd_amount;

use super::graphql::{
    parse_response, GraphQLRequest, Pool24hData, Pool24hVariables, POOL_24H_QUERY,
};
use super::source::StatsSource;

/// Length of the aggregation window
pub const WINDOW_SECS: i64 = 24 * 3600;

/// Queries the subgraph gateway and aggregates hourly buckets into a 24h row.
#[derive(Clone)]
pub struct IndexerVolumeAggregator {
    client: reqwest::Client,
    /// `None` when pool, API key or subgraph id is missing; every fetch is then a skip
    target: Option<StatsTarget>,
}

impl IndexerVolumeAggregator {
    pub fn new(target: Option<StatsTarget>, timeout: Duration) -> Result<Self, QueryFailure> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, target })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, QueryFailure> {
        Self::new(settings.stats_target(), settings.stats_timeout())
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Fetches and aggregates the window ending at `now`. `Ok(None)` when disabled.
    pub async fn fetch(&self, now: DateTime<Utc>) -> Result<Option<PoolStatsRecord>, QueryFailure> {
        let Some(target) = &self.target else {
            return Ok(None);
        };

        let start = window_start(now.timestamp());
        let data = self.query_pool_24h(target, start).await?;

        if data.pool.is_none() {
            warn!(
                "Subgraph has no record of pool {}; fee tier left empty",
                target.pool
            );
        }

        Ok(Some(build_stats_record(now, target.pool.clone(), data)))
    }

    async fn query_pool_24h(
        &self,
        target: &StatsTarget,
        start: i64,
    ) -> Result<Pool24hData, QueryFailure> {
        let request = GraphQLRequest {
            query: POOL_24H_QUERY,
            variables: Pool24hVariables {
                // subgraph entity ids are lowercase hex
                pool_id: target.pool.to_lowercase(),
                start,
            },
        };

        let response = self
            .client
            .post(&target.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(QueryFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}

#[async_trait]
impl StatsSource for IndexerVolumeAggregator {
    async fn fetch_stats(&self, now: DateTime<Utc>) -> Result<Option<PoolStatsRecord>, QueryFailure> {
        self.fetch(now).await
    }
}

/// Start of the lookback window for a `now` in unix seconds.
pub fn window_start(now_secs: i64) -> i64 {
    now_secs - WINDOW_SECS
}

/// Turns a decoded response into the stats row for `pool`.
pub fn build_stats_record(now: DateTime<Utc>, pool: String, data: Pool24hData) -> PoolStatsRecord {
    let buckets = hourly_buckets(&data);
    let metadata_tvl = data.pool.as_ref().and_then(|p| p.total_value_locked_usd);
    let fee_tier = data
        .pool
        .and_then(|p| p.fee_tier)
        .unwrap_or_default();

    let volume_24h_usd = aggregate_volume_24h(&buckets);
    let tvl_usd = select_tvl(&buckets, metadata_tvl);

    debug!(
        "Aggregated {} hourly buckets for pool {}: volume={} tvl={}",
        buckets.len(),
        pool,
        volume_24h_usd,
        tvl_usd
    );

    PoolStatsRecord::new(
        now,
        pool,
        fee_tier,
        validate_usd_amount(volume_24h_usd),
        validate_usd_amount(tvl_usd),
    )
}

/// Hourly buckets from the response, null numerics as zero.
pub fn hourly_buckets(data: &Pool24hData) -> Vec<HourlyBucket> {
    data.pool_hour_datas
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|h| {
            HourlyBucket::new(
                h.period_start_unix.unwrap_or(0),
                h.volume_usd.unwrap_or(0.0),
                h.tvl_usd.unwrap_or(0.0),
            )
        })
        .collect()
}

/// Sum of `volume_usd` over all buckets; 0 for none.
///
/// Summed in period order so the result does not depend on the order the
/// buckets were received in.
pub fn aggregate_volume_24h(buckets: &[HourlyBucket]) -> f64 {
    let mut ordered: Vec<&HourlyBucket> = buckets.iter().collect();
    ordered.sort_by(|a, b| {
        a.period_start
            .cmp(&b.period_start)
            .then(a.volume_usd.total_cmp(&b.volume_usd))
    });
    ordered.iter().map(|b| b.volume_usd).sum()
}

/// TVL of the most recent bucket; the pool's current TVL when there are no
/// buckets; 0 when neither is known.
///
/// A null `periodStartUnix` decodes as 0, so such a bucket only wins when no
/// bucket has a known period. Ties go to the bucket received last, which for
/// the subgraph's ascending order is the latest one.
pub fn select_tvl(buckets: &[HourlyBucket], metadata_tvl: Option<f64>) -> f64 {
    buckets
        .iter()
        .max_by_key(|b| b.period_start)
        .map(|b| b.tvl_usd)
        .or(metadata_tvl)
        .unwrap_or(0.0)
}
