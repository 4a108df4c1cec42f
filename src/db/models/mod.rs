use chrono::{DateTime, SecondsFormat, Utc};

mod hourly_bucket;
mod pool_price;
mod pool_stats;

pub use hourly_bucket::HourlyBucket;
pub use pool_price::PoolPriceRecord;
pub use pool_stats::PoolStatsRecord;

/// A record persisted as one CSV row under a fixed header.
///
/// The header is part of the file's schema: changing it requires a new file.
pub trait CsvRecord {
    const HEADER: &'static [&'static str];

    fn to_row(&self) -> Vec<String>;
}

/// ISO-8601 UTC with millisecond precision, e.g. `2026-10-18T09:00:00.000Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
