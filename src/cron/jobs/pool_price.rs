//! Job to record the pool's on-chain price.
//!
//! Reads `slot0` through the price source and appends one row to the price log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::db::{models::format_timestamp, CsvAppender};
use crate::worker::PriceSource;

use super::JobStatus;

pub async fn run(
    source: &dyn PriceSource,
    appender: &CsvAppender,
    file: &str,
    now: DateTime<Utc>,
) -> Result<JobStatus> {
    let Some(record) = source
        .read_price(now)
        .await
        .context("Failed to read pool price")?
    else {
        debug!("Skipping pool_price job (no pool configured)");
        return Ok(JobStatus::Skipped);
    };

    appender
        .append_record(file, &record)
        .context("Failed to append pool price")?;

    info!(
        "[pool price] {} {} p0in1={} p1in0={} dec={}/{}",
        format_timestamp(&record.timestamp),
        record.pool,
        record.price_token0_in_token1,
        record.price_token1_in_token0,
        record.token0_decimals,
        record.token1_decimals
    );
    Ok(JobStatus::Written)
}
