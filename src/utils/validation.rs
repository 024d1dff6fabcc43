//! Input validation for engine operations.
//!
//! Validators reject bad inputs before any state is touched and always report
//! the specific threshold that was violated.

use crate::error::{Error, Result};
use crate::utils::constants::*;

/// Validate that an amount is non-zero
pub fn validate_non_zero(amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(Error::ZeroAmount);
    }
    Ok(())
}

/// Validate that a price is positive and within sane bounds
pub fn validate_price(price_cents: u64) -> Result<()> {
    if price_cents < MIN_SANE_PRICE || price_cents > MAX_SANE_PRICE {
        return Err(Error::PriceOutOfBounds {
            price: price_cents,
            min: MIN_SANE_PRICE,
            max: MAX_SANE_PRICE,
        });
    }
    Ok(())
}

/// Validate a mint fee rate (a fraction in [0, 1))
pub fn validate_fee_rate(fee_bps: u64) -> Result<()> {
    if fee_bps >= BPS_DIVISOR {
        return Err(Error::InvalidParameter {
            name: "fee_rate_bps".into(),
            reason: format!("{} must be below {}", fee_bps, BPS_DIVISOR),
        });
    }
    Ok(())
}

/// Validate a minimum buffer ratio (a fraction in (0, 1])
pub fn validate_buffer_ratio(ratio_bps: u64) -> Result<()> {
    if ratio_bps == 0 || ratio_bps > BPS_DIVISOR {
        return Err(Error::InvalidParameter {
            name: "min_buffer_ratio_bps".into(),
            reason: format!("{} must be in 1..={}", ratio_bps, BPS_DIVISOR),
        });
    }
    Ok(())
}
