//! Tick scheduler for the collector.
//!
//! Each tick runs two independent jobs concurrently:
//! - Reading the pool price from the chain into the price log
//! - Aggregating 24h volume/TVL from the subgraph into the stats log
//!
//! A failing or panicking job is logged and does not affect the other job or
//! later ticks. Ticks never overlap.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::db::CsvAppender;
use crate::error::WriteFailure;
use crate::worker::{PriceSource, StatsSource};

use super::jobs::{self, JobStatus};

/// Outcome of one job within a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Written,
    Skipped,
    Failed(String),
}

impl FlowOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FlowOutcome::Failed(_))
    }
}

/// Outcomes of both jobs for a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub price: FlowOutcome,
    pub stats: FlowOutcome,
}

/// Runs the collection tick once or on a fixed interval.
pub struct Scheduler {
    settings: Arc<Settings>,
    appender: CsvAppender,
    price_source: Arc<dyn PriceSource>,
    stats_source: Arc<dyn StatsSource>,
}

impl Scheduler {
    pub fn new(
        settings: Arc<Settings>,
        price_source: Arc<dyn PriceSource>,
        stats_source: Arc<dyn StatsSource>,
    ) -> Self {
        let appender = CsvAppender::new(settings.data_dir());
        Self {
            settings,
            appender,
            price_source,
            stats_source,
        }
    }

    /// Runs one tick: both jobs concurrently, joined before returning.
    pub async fn tick(&self) -> TickReport {
        let now = Utc::now();

        let (price, stats) = tokio::join!(
            guard(
                "pool_price",
                jobs::pool_price::run(
                    self.price_source.as_ref(),
                    &self.appender,
                    &self.settings.price.file,
                    now,
                ),
            ),
            guard(
                "pool_stats",
                jobs::pool_stats::run(
                    self.stats_source.as_ref(),
                    &self.appender,
                    &self.settings.stats.file,
                    now,
                ),
            ),
        );

        TickReport { price, stats }
    }

    /// Single-shot mode.
    pub async fn run_once(&self) -> TickReport {
        info!("Running a single tick");
        self.tick().await
    }

    /// Continuous mode: ticks immediately, then every `scheduler.interval_secs`
    /// until cancellation. An in-flight tick is finished before returning.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        let interval = self.settings.interval();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Scheduler started (every {}s)", interval.as_secs());

        loop {
            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => break,
                _ = ticker.tick() => {
                    let report = self.tick().await;
                    debug!("Tick finished: price={:?} stats={:?}", report.price, report.stats);
                },
            }
        }

        info!("Scheduler shutting down...");
        Ok(())
    }
}

/// Catches errors and panics from a job so they stop at the job boundary.
async fn guard<F>(job: &'static str, fut: F) -> FlowOutcome
where
    F: Future<Output = Result<JobStatus>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(JobStatus::Written)) => FlowOutcome::Written,
        Ok(Ok(JobStatus::Skipped)) => FlowOutcome::Skipped,
        Ok(Err(e)) => {
            // a failed append loses data; source failures just leave a gap
            if e.downcast_ref::<WriteFailure>().is_some() {
                error!("{} job failed: {:#}", job, e);
            } else {
                warn!("{} job failed: {:#}", job, e);
            }
            FlowOutcome::Failed(format!("{:#}", e))
        },
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("{} job panicked: {}", job, message);
            FlowOutcome::Failed(message)
        },
    }
}
