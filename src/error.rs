//! Error taxonomy for the collector.
//!
//! Only [`ConfigError`] is fatal. Everything else is produced inside a tick,
//! logged at the flow boundary and dropped.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or missing configuration. Aborts the process before the first tick.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("{key} is required")]
    Missing { key: &'static str },

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// On-chain price read failed.
#[derive(Debug, Error)]
pub enum ReadFailure {
    #[error("{call} call failed: {source}")]
    Call {
        call: &'static str,
        #[source]
        source: alloy::contract::Error,
    },

    #[error("{call} call timed out after {secs}s")]
    Timeout { call: &'static str, secs: u64 },

    #[error("malformed pool state: {0}")]
    Malformed(String),
}

/// Indexer query failed.
#[derive(Debug, Error)]
pub enum QueryFailure {
    #[error("GraphQL transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GraphQL HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL errors: {0}")]
    Graph(String),

    #[error("failed to decode GraphQL response: {0}")]
    Decode(String),
}

/// Appending a row to a CSV log failed. Data for that tick is lost.
#[derive(Debug, Error)]
pub enum WriteFailure {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has {expected} columns, row has {actual}")]
    ColumnCount {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
