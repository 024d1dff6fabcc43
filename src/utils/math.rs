//! Fixed-point arithmetic for the collateralization engine.
//!
//! All financial math runs on u64 integers in the smallest denomination with
//! u128 intermediates, checked overflow, and round-toward-zero divisions.
//! Floating point is never used.

use crate::error::{Error, Result};
use crate::utils::constants::{BPS_DIVISOR, COLLATERAL_BASE_UNIT};

// ═══════════════════════════════════════════════════════════════════════════════
// SAFE ARITHMETIC OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> Result<u64> {
    a.checked_sub(b).ok_or(Error::Underflow {
        operation: format!("{} - {}", a, b),
    })
}

/// Safe multiplication then division with u128 intermediate.
/// Truncates toward zero.
pub fn safe_mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    if c == 0 {
        return Err(Error::InvalidParameter {
            name: "divisor".into(),
            reason: "division by zero".into(),
        });
    }
    let result = (a as u128) * (b as u128) / (c as u128);
    if result > u64::MAX as u128 {
        return Err(Error::Overflow {
            operation: format!("({} * {}) / {}", a, b, c),
        });
    }
    Ok(result as u64)
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALUATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Value of a collateral amount in cents of the unit of account.
///
/// `value = collateral_base * price / COLLATERAL_BASE_UNIT`
pub fn collateral_value_cents(collateral_base: u64, price_cents: u64) -> Result<u64> {
    safe_mul_div(collateral_base, price_cents, COLLATERAL_BASE_UNIT)
}

/// Collateral amount (in base units) equivalent to a value in cents.
///
/// `collateral_base = value_cents * COLLATERAL_BASE_UNIT / price`
pub fn collateral_for_value(value_cents: u64, price_cents: u64) -> Result<u64> {
    if price_cents == 0 {
        return Err(Error::InvalidParameter {
            name: "price".into(),
            reason: "cannot be zero".into(),
        });
    }
    safe_mul_div(value_cents, COLLATERAL_BASE_UNIT, price_cents)
}

/// Collateralization ratio as a percentage (e.g. 150 = 150%).
///
/// Returns `u64::MAX` when no peg units are outstanding.
pub fn collateralization_ratio(
    collateral_base: u64,
    price_cents: u64,
    peg_supply_cents: u64,
) -> Result<u64> {
    if peg_supply_cents == 0 {
        return Ok(u64::MAX);
    }

    // ratio = collateral_base * price * 100 / (COLLATERAL_BASE_UNIT * peg_supply)
    let numerator = (collateral_base as u128)
        .checked_mul(price_cents as u128)
        .and_then(|v| v.checked_mul(100))
        .ok_or(Error::Overflow {
            operation: format!("{} * {} * 100", collateral_base, price_cents),
        })?;
    let denominator = (COLLATERAL_BASE_UNIT as u128) * (peg_supply_cents as u128);

    let ratio = numerator / denominator;
    Ok(ratio.min(u64::MAX as u128) as u64)
}

// ═══════════════════════════════════════════════════════════════════════════════
// FEE AND SHARE CALCULATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fraction of an amount in basis points, truncating toward zero
pub fn fraction_bps(amount: u64, bps: u64) -> Result<u64> {
    safe_mul_div(amount, bps, BPS_DIVISOR)
}

/// Amount remaining after a basis-point fee deduction
pub fn amount_after_fee(amount: u64, fee_bps: u64) -> Result<u64> {
    let fee = fraction_bps(amount, fee_bps)?;
    safe_sub(amount, fee)
}

/// Proportional share issuance/redemption:
/// `amount * share_supply / reference_value`, truncating toward zero
pub fn proportional_shares(amount: u64, share_supply: u64, reference_value: u64) -> Result<u64> {
    safe_mul_div(amount, share_supply, reference_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::PEG_BASE_UNIT;

    #[test]
    fn test_safe_arithmetic() {
        assert!(safe_add(1, 2).is_ok());
        assert!(safe_add(u64::MAX, 1).is_err());

        assert!(safe_sub(5, 3).is_ok());
        assert!(safe_sub(3, 5).is_err());

        assert!(safe_mul_div(100, 200, 10).is_ok());
        assert!(safe_mul_div(100, 200, 0).is_err());
        assert!(safe_mul_div(u64::MAX, u64::MAX, 1).is_err());
    }

    #[test]
    fn test_mul_div_truncates_toward_zero() {
        assert_eq!(safe_mul_div(7, 1, 2).unwrap(), 3);
        assert_eq!(safe_mul_div(1, 1, 3).unwrap(), 0);
    }

    #[test]
    fn test_collateral_valuation() {
        // 1 collateral unit at $4,000 = 400,000 cents
        let price = 4_000 * PEG_BASE_UNIT;
        let value = collateral_value_cents(COLLATERAL_BASE_UNIT, price).unwrap();
        assert_eq!(value, 400_000);

        // Inverse: $4,000 worth of collateral is exactly 1 unit
        let collateral = collateral_for_value(400_000, price).unwrap();
        assert_eq!(collateral, COLLATERAL_BASE_UNIT);

        // $3,900 = 0.975 units
        let collateral = collateral_for_value(390_000, price).unwrap();
        assert_eq!(collateral, 97_500_000);
    }

    #[test]
    fn test_collateralization_ratio() {
        let price = 4_000 * PEG_BASE_UNIT;

        // 1 unit ($4,000) backing $2,000 of peg = 200%
        let ratio = collateralization_ratio(COLLATERAL_BASE_UNIT, price, 200_000).unwrap();
        assert_eq!(ratio, 200);

        // No peg outstanding
        let ratio = collateralization_ratio(COLLATERAL_BASE_UNIT, price, 0).unwrap();
        assert_eq!(ratio, u64::MAX);
    }

    #[test]
    fn test_fee_calculation() {
        // 3% of 400,000 cents = 12,000 cents
        assert_eq!(fraction_bps(400_000, 300).unwrap(), 12_000);
        assert_eq!(amount_after_fee(400_000, 300).unwrap(), 388_000);

        // Zero fee leaves the amount untouched
        assert_eq!(amount_after_fee(400_000, 0).unwrap(), 400_000);
    }

    #[test]
    fn test_proportional_shares() {
        // Depositing value equal to half the surplus mints half the supply
        assert_eq!(proportional_shares(100_000, 200_000, 200_000).unwrap(), 100_000);
        assert_eq!(proportional_shares(40_000, 200_000, 200_000).unwrap(), 40_000);
        assert!(proportional_shares(1, 1, 0).is_err());
    }
}
