//! Validation helpers for converted prices and indexer amounts.
//!
//! Prices must be strictly positive and finite, otherwise their reciprocal is
//! meaningless. USD amounts from the indexer must be finite and non-negative;
//! anything else is reported as zero.

/// Validate a price ratio is usable (positive and finite).
/// Returns Some(price) if valid, None if invalid.
#[inline]
pub fn validate_price(price: f64) -> Option<f64> {
    if price > 0.0 && price.is_finite() {
        Some(price)
    } else {
        None
    }
}

/// Validate a USD amount (volume or TVL).
/// Returns the amount if valid, 0.0 if invalid.
#[inline]
pub fn validate_usd_amount(amount: f64) -> f64 {
    if amount >= 0.0 && amount.is_finite() {
        amount
    } else {
        0.0
    }
}
