//! Type conversion utilities.
//!
//! Functions for moving between alloy's fixed-width integers and the
//! arbitrary-precision types used for price math.

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use once_cell::sync::Lazy;
use std::str::FromStr;

// ============================================
// U256 Conversions
// ============================================

/// Convert alloy U256 to an unbounded BigInt (via bytes, no string parsing).
pub fn u256_to_bigint(value: U256) -> BigInt {
    let bytes: [u8; 32] = value.to_le_bytes();
    BigInt::from_bytes_le(Sign::Plus, &bytes)
}

// ============================================
// Address Parsing
// ============================================

/// Parse a configured pool address. Accepts any hex case, with or without `0x`.
pub fn parse_pool_address(value: &str) -> Option<Address> {
    Address::from_str(value.trim()).ok()
}

// ============================================
// Powers of Ten
// ============================================

static POW10_CACHE: Lazy<[BigDecimal; 25]> =
    Lazy::new(|| std::array::from_fn(|i| BigDecimal::from(BigInt::from(10u32).pow(i as u32))));

/// Compute 10^exp as BigDecimal.
pub fn big_pow10(exp: u8) -> BigDecimal {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigDecimal::from(BigInt::from(10u32).pow(exp as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_to_bigint_preserves_value() {
        let value = U256::from_str("79228162514264337593543950336").unwrap();
        assert_eq!(
            u256_to_bigint(value),
            BigInt::from_str("79228162514264337593543950336").unwrap()
        );
        assert_eq!(u256_to_bigint(U256::ZERO), BigInt::from(0));
        assert_eq!(u256_to_bigint(U256::MAX), BigInt::from_str(&U256::MAX.to_string()).unwrap());
    }

    #[test]
    fn test_parse_pool_address() {
        let lower = parse_pool_address("0xd0b53d9277642d899df5c87a3966a349a798f224").unwrap();
        let mixed = parse_pool_address(" 0xd0b53D9277642d899DF5C87A3966A349A798F224 ").unwrap();
        assert_eq!(lower, mixed);
        assert!(parse_pool_address(crate::utils::ZERO_ADDRESS).unwrap().is_zero());
        assert!(parse_pool_address("0x1234").is_none());
        assert!(parse_pool_address("not an address").is_none());
    }

    #[test]
    fn test_big_pow10() {
        assert_eq!(big_pow10(0), BigDecimal::from(1));
        assert_eq!(big_pow10(6), BigDecimal::from(1_000_000));
        assert_eq!(big_pow10(30), BigDecimal::from(BigInt::from(10u32).pow(30)));
    }
}
