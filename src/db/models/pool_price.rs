use alloy::primitives::Address;
use chrono::{DateTime, Utc};

use super::{format_timestamp, CsvRecord};
use crate::utils::PoolPrices;

/// On-chain price observation of a pool (one row of `geth_eth_price.csv`).
///
/// Population: price job, once per tick when the pool is configured.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolPriceRecord {
    pub timestamp: DateTime<Utc>,
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    pub token0_decimals: u8,
    pub token1_decimals: u8,

    // token1 per token0, and its reciprocal
    pub price_token0_in_token1: f64,
    pub price_token1_in_token0: f64,
}

impl PoolPriceRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        pool: Address,
        token0: Address,
        token1: Address,
        token0_decimals: u8,
        token1_decimals: u8,
        prices: PoolPrices,
    ) -> Self {
        Self {
            timestamp,
            pool,
            token0,
            token1,
            token0_decimals,
            token1_decimals,
            price_token0_in_token1: prices.token0_in_token1,
            price_token1_in_token0: prices.token1_in_token0,
        }
    }
}

impl CsvRecord for PoolPriceRecord {
    const HEADER: &'static [&'static str] = &[
        "timestamp_iso",
        "pool",
        "token0",
        "token1",
        "dec0",
        "dec1",
        "price_token0_in_token1",
        "price_token1_in_token0",
    ];

    fn to_row(&self) -> Vec<String> {
        vec![
            format_timestamp(&self.timestamp),
            self.pool.to_checksum(None),
            self.token0.to_checksum(None),
            self.token1.to_checksum(None),
            self.token0_decimals.to_string(),
            self.token1_decimals.to_string(),
            self.price_token0_in_token1.to_string(),
            self.price_token1_in_token0.to_string(),
        ]
    }
}
