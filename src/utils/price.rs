//! Price conversion utilities for Uniswap V3 pools.
//!
//! `slot0().sqrtPriceX96` is `sqrt(token1/token0) * 2^96` in raw token units.
//! Squaring it gives a Q128.192 value which overflows 256 bits for high
//! prices, so squaring and scaling happen in arbitrary precision and only the
//! final ratio is converted to f64.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use once_cell::sync::Lazy;

use super::conversion::{big_pow10, u256_to_bigint};
use super::validation::validate_price;

// ============================================
// Constants
// ============================================

/// Constant: 2^192, the scaling factor of a squared Q64.96 value
pub static Q192: Lazy<BigDecimal> = Lazy::new(|| BigDecimal::from(BigInt::from(1u8) << 192usize));

/// Both directions of a pool's exchange rate, decimal adjusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolPrices {
    /// Units of token1 per one token0
    pub token0_in_token1: f64,
    /// Units of token0 per one token1, the exact reciprocal of `token0_in_token1`
    pub token1_in_token0: f64,
}

// ============================================
// sqrtPriceX96 to Price Conversion
// ============================================

/// Convert sqrtPriceX96 to the decimal-adjusted price of token0 in token1.
///
/// price = (sqrtPriceX96^2 / 2^192) * 10^(decimals0 - decimals1)
///
/// # Returns
/// * `Some(price)` if the result is positive and finite, `None` otherwise
///   (zero sqrt price, or a ratio outside f64 range)
pub fn sqrt_price_x96_to_price(
    sqrt_price_x96: U256,
    token0_decimals: u8,
    token1_decimals: u8,
) -> Option<f64> {
    let sqrt_price = u256_to_bigint(sqrt_price_x96);
    if sqrt_price.is_zero() {
        return None;
    }

    // Q128.192, can exceed 2^256
    let squared = BigDecimal::from(&sqrt_price * &sqrt_price);
    let raw_price = squared / Q192.clone();

    // decimal adjustment: 10^(decimals0 - decimals1)
    let decimal_diff = token0_decimals as i16 - token1_decimals as i16;
    let adjusted = if decimal_diff >= 0 {
        raw_price * big_pow10(decimal_diff as u8)
    } else {
        raw_price / big_pow10((-decimal_diff) as u8)
    };

    validate_price(adjusted.to_f64()?)
}

/// Convert sqrtPriceX96 to both price directions.
///
/// The inverse is taken from the forward f64, never recomputed, so the two
/// values are reciprocals at the stored precision.
pub fn sqrt_price_x96_to_prices(
    sqrt_price_x96: U256,
    token0_decimals: u8,
    token1_decimals: u8,
) -> Option<PoolPrices> {
    let token0_in_token1 = sqrt_price_x96_to_price(sqrt_price_x96, token0_decimals, token1_decimals)?;
    let token1_in_token0 = validate_price(1.0 / token0_in_token1)?;

    Some(PoolPrices {
        token0_in_token1,
        token1_in_token0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const Q96_STR: &str = "79228162514264337593543950336";

    fn assert_close(actual: f64, expected: f64) {
        let rel = ((actual - expected) / expected).abs();
        assert!(rel < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_unit_price_at_equal_decimals() {
        let sqrt = U256::from_str(Q96_STR).unwrap();
        let prices = sqrt_price_x96_to_prices(sqrt, 18, 18).unwrap();
        assert_eq!(prices.token0_in_token1, 1.0);
        assert_eq!(prices.token1_in_token0, 1.0);
    }

    #[test]
    fn test_decimal_adjustment_weth_usdc() {
        // token0 = WETH (18), token1 = USDC (6), 1 WETH = 3000 USDC
        // raw ratio = 3000 * 1e6 / 1e18
        let raw_ratio: f64 = 3000.0 * 1e6 / 1e18;
        let sqrt = U256::from((raw_ratio.sqrt() * 2f64.powi(96)) as u128);

        let prices = sqrt_price_x96_to_prices(sqrt, 18, 6).unwrap();
        assert!((prices.token0_in_token1 - 3000.0).abs() < 1e-6);
        assert!((prices.token1_in_token0 - 1.0 / 3000.0).abs() < 1e-12);
    }

    #[test]
    fn test_decimal_adjustment_negative_diff() {
        // token0 = USDC (6), token1 = WETH (18), 1 USDC = 1/3000 WETH
        let raw_ratio: f64 = (1.0 / 3000.0) * 1e18 / 1e6;
        let sqrt = U256::from((raw_ratio.sqrt() * 2f64.powi(96)) as u128);

        let price = sqrt_price_x96_to_price(sqrt, 6, 18).unwrap();
        assert_close(price, 1.0 / 3000.0);
    }

    #[test]
    fn test_squared_value_beyond_256_bits() {
        // Close to TickMath.MAX_SQRT_RATIO; the square needs ~320 bits
        let sqrt = U256::from_str("1461446703485210103287273052203988822378723970341").unwrap();
        let prices = sqrt_price_x96_to_prices(sqrt, 18, 18).unwrap();

        assert!(prices.token0_in_token1.is_finite());
        assert!(prices.token0_in_token1 > 3.4e38);
        assert!((prices.token0_in_token1 * prices.token1_in_token0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_forward_and_inverse_are_reciprocal() {
        let samples = [
            "4295128740",
            "1000000000000000000000",
            Q96_STR,
            "3543191142285914205922034323214",
            "1461446703485210103287273052203988822378723970341",
        ];
        let decimals = [(18u8, 18u8), (18, 6), (6, 18), (8, 18), (0, 0)];

        for raw in samples {
            for (d0, d1) in decimals {
                let sqrt = U256::from_str(raw).unwrap();
                let prices = sqrt_price_x96_to_prices(sqrt, d0, d1)
                    .unwrap_or_else(|| panic!("{raw} ({d0},{d1}) has no price"));
                let product = prices.token0_in_token1 * prices.token1_in_token0;
                assert!((product - 1.0).abs() < 1e-12, "{raw} ({d0},{d1}) -> {product}");
            }
        }
    }

    #[test]
    fn test_zero_sqrt_price_is_rejected() {
        assert!(sqrt_price_x96_to_price(U256::ZERO, 18, 6).is_none());
        assert!(sqrt_price_x96_to_prices(U256::ZERO, 18, 18).is_none());
    }
}
