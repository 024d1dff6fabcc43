//! Collateral amounts and the engine's collateral pool.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::constants::COLLATERAL_BASE_UNIT;
use crate::utils::math::{safe_add, safe_sub};

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed collateral amount in base units (1 unit = 10^8 base units)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollateralAmount(u64);

impl CollateralAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from base units
    pub const fn from_base(base: u64) -> Self {
        Self(base)
    }

    /// Create from whole collateral units
    pub fn from_units(units: u64) -> Self {
        Self(units * COLLATERAL_BASE_UNIT)
    }

    /// Get raw base-unit value
    pub fn base(&self) -> u64 {
        self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for CollateralAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:08}",
            self.0 / COLLATERAL_BASE_UNIT,
            self.0 % COLLATERAL_BASE_UNIT
        )
    }
}

impl From<u64> for CollateralAmount {
    fn from(base: u64) -> Self {
        Self(base)
    }
}

impl From<CollateralAmount> for u64 {
    fn from(amount: CollateralAmount) -> Self {
        amount.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL POOL
// ═══════════════════════════════════════════════════════════════════════════════

/// The single undifferentiated pool of collateral held by the engine.
///
/// The pool does not track per-account positions; all collateral backs all
/// outstanding peg units collectively. Cumulative flow counters support
/// auditing: `total == deposits - withdrawals` at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralPool {
    /// Current pool balance in base units
    total: CollateralAmount,
    /// Lifetime sum of all deposits
    cumulative_deposits: u64,
    /// Lifetime sum of all withdrawals
    cumulative_withdrawals: u64,
}

impl CollateralPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            total: CollateralAmount::ZERO,
            cumulative_deposits: 0,
            cumulative_withdrawals: 0,
        }
    }

    /// Current pool balance
    pub fn total(&self) -> CollateralAmount {
        self.total
    }

    /// Lifetime deposits in base units
    pub fn cumulative_deposits(&self) -> u64 {
        self.cumulative_deposits
    }

    /// Lifetime withdrawals in base units
    pub fn cumulative_withdrawals(&self) -> u64 {
        self.cumulative_withdrawals
    }

    /// Check that a withdrawal of `amount` would succeed, without mutating
    pub fn can_withdraw(&self, amount: CollateralAmount) -> Result<()> {
        if self.total < amount {
            return Err(Error::InsufficientCollateral {
                required: amount.base(),
                available: self.total.base(),
            });
        }
        Ok(())
    }

    /// Add collateral to the pool
    pub fn deposit(&mut self, amount: CollateralAmount) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        let new_total = safe_add(self.total.base(), amount.base())?;
        self.cumulative_deposits = safe_add(self.cumulative_deposits, amount.base())?;
        self.total = CollateralAmount::from_base(new_total);
        Ok(())
    }

    /// Remove collateral from the pool
    pub fn withdraw(&mut self, amount: CollateralAmount) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        self.can_withdraw(amount)?;
        let new_total = safe_sub(self.total.base(), amount.base())?;
        self.cumulative_withdrawals = safe_add(self.cumulative_withdrawals, amount.base())?;
        self.total = CollateralAmount::from_base(new_total);
        Ok(())
    }

    /// Verify the flow invariant: balance equals deposits minus withdrawals
    pub fn audit(&self) -> bool {
        (self.cumulative_deposits as u128) - (self.cumulative_withdrawals as u128)
            == self.total.base() as u128
    }
}

impl Default for CollateralPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collateral_amount_display() {
        assert_eq!(CollateralAmount::from_units(1).to_string(), "1.00000000");
        assert_eq!(CollateralAmount::from_base(97_500_000).to_string(), "0.97500000");
        assert_eq!(CollateralAmount::from_base(10_000_000).to_string(), "0.10000000");
    }

    #[test]
    fn test_deposit_and_withdraw() {
        let mut pool = CollateralPool::new();

        pool.deposit(CollateralAmount::from_units(2)).unwrap();
        assert_eq!(pool.total().base(), 200_000_000);

        pool.withdraw(CollateralAmount::from_base(97_500_000)).unwrap();
        assert_eq!(pool.total().base(), 102_500_000);
        assert!(pool.audit());
    }

    #[test]
    fn test_withdraw_beyond_balance() {
        let mut pool = CollateralPool::new();
        pool.deposit(CollateralAmount::from_units(1)).unwrap();

        let err = pool.withdraw(CollateralAmount::from_units(2)).unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientCollateral {
                required: 200_000_000,
                available: 100_000_000,
            }
        );
        assert_eq!(pool.total().base(), 100_000_000);
    }

    #[test]
    fn test_zero_amounts_rejected() {
        let mut pool = CollateralPool::new();
        assert_eq!(pool.deposit(CollateralAmount::ZERO), Err(Error::ZeroAmount));
        assert_eq!(pool.withdraw(CollateralAmount::ZERO), Err(Error::ZeroAmount));
    }

    #[test]
    fn test_audit_tracks_flows() {
        let mut pool = CollateralPool::new();
        pool.deposit(CollateralAmount::from_base(500)).unwrap();
        pool.deposit(CollateralAmount::from_base(300)).unwrap();
        pool.withdraw(CollateralAmount::from_base(200)).unwrap();

        assert_eq!(pool.cumulative_deposits(), 800);
        assert_eq!(pool.cumulative_withdrawals(), 200);
        assert_eq!(pool.total().base(), 600);
        assert!(pool.audit());
    }
}
