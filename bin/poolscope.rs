use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use poolscope::{IndexerVolumeAggregator, OnChainPriceReader, Scheduler, Settings};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .context("Failed to initialize logger")?;

    // Load configuration
    let settings = Arc::new(
        Settings::new().context("Invalid configuration. Check config.yaml and the environment")?,
    );

    let price_reader = OnChainPriceReader::from_settings(&settings)
        .context("Failed to initialize on-chain price reader")?;
    let stats_aggregator = IndexerVolumeAggregator::from_settings(&settings)
        .context("Failed to initialize subgraph client")?;

    if !price_reader.is_enabled() {
        warn!("No price pool configured - on-chain price collection is skipped");
    }
    if !stats_aggregator.is_enabled() {
        warn!("Stats pool, API key or subgraph id missing - 24h stats collection is skipped");
    }

    std::fs::create_dir_all(settings.data_dir()).with_context(|| {
        format!("Failed to create data directory {}", settings.data_dir().display())
    })?;

    let scheduler = Scheduler::new(
        settings.clone(),
        Arc::new(price_reader),
        Arc::new(stats_aggregator),
    );

    // Externally scheduled invocation: one tick, then exit
    if settings.scheduler.once {
        scheduler.run_once().await;
        return Ok(());
    }

    run_collector(scheduler).await
}

async fn run_collector(scheduler: Scheduler) -> anyhow::Result<()> {
    let cancellation_token = CancellationToken::new();

    let scheduler_token = cancellation_token.child_token();
    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler.run(scheduler_token).await {
            error!("Scheduler failed: {:#}", e);
        }
    });

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Collector running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    // Let an in-flight tick finish
    cancellation_token.cancel();

    info!("Waiting for scheduler to stop...");
    let _ = scheduler_handle.await;

    info!("Collector stopped");
    Ok(())
}
