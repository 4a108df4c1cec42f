pub mod pool_price;
pub mod pool_stats;

/// Result of a job that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// A row was appended
    Written,
    /// The source is not configured
    Skipped,
}
