//! Job to record the pool's trailing 24h volume and TVL from the subgraph.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::db::{models::format_timestamp, CsvAppender};
use crate::worker::StatsSource;

use super::JobStatus;

pub async fn run(
    source: &dyn StatsSource,
    appender: &CsvAppender,
    file: &str,
    now: DateTime<Utc>,
) -> Result<JobStatus> {
    let Some(record) = source
        .fetch_stats(now)
        .await
        .context("Failed to fetch pool stats")?
    else {
        debug!("Skipping pool_stats job (pool, API key or subgraph id not configured)");
        return Ok(JobStatus::Skipped);
    };

    appender
        .append_record(file, &record)
        .context("Failed to append pool stats")?;

    info!(
        "[pool stats] {} vol24h=${:.0} tvl=${:.0} fee={}",
        format_timestamp(&record.timestamp),
        record.volume_24h_usd,
        record.tvl_usd,
        record.fee_tier
    );
    Ok(JobStatus::Written)
}
