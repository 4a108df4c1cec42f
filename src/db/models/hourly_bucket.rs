/// One hour of pool activity as pre-aggregated by the indexer.
///
/// Transient: fetched, aggregated and dropped within a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyBucket {
    /// Unix seconds at the start of the hour
    pub period_start: i64,
    pub volume_usd: f64,
    /// TVL at the end of the hour
    pub tvl_usd: f64,
}

impl HourlyBucket {
    pub fn new(period_start: i64, volume_usd: f64, tvl_usd: f64) -> Self {
        Self {
            period_start,
            volume_usd,
            tvl_usd,
        }
    }
}
