//! Utility functions for the collector.
//!
//! - [`validation`] - Bounds checks for prices and USD amounts
//! - [`conversion`] - Type conversions (U256, BigInt, BigDecimal, addresses)
//! - [`price`] - sqrtPriceX96 to exchange rate conversion

mod conversion;
mod price;
mod validation;

// ============================================
// Common Constants
// ============================================

/// The Ethereum zero address (0x0000000000000000000000000000000000000000)
/// Treated as "not configured" for the price pool.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Fallback decimals for a token whose `decimals()` call fails.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

// ============================================
// Re-exports
// ============================================

pub use conversion::{big_pow10, parse_pool_address, u256_to_bigint};

pub use price::{sqrt_price_x96_to_price, sqrt_price_x96_to_prices, PoolPrices, Q192};

pub use validation::{validate_price, validate_usd_amount};
