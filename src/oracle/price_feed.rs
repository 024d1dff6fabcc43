//! Price source abstraction for the collateralization engine.
//!
//! The engine never caches a price: every operation reads the source once and
//! uses that single observation for all of its arithmetic. Production
//! deployments plug in a real feed behind [`PriceSource`]; tests and demos use
//! [`StaticPriceSource`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::constants::PEG_BASE_UNIT;
use crate::utils::validation::validate_price;

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE
// ═══════════════════════════════════════════════════════════════════════════════

/// A validated collateral price in cents of the unit of account per whole
/// collateral unit ($4,000.00 = 400,000)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(u64);

impl Price {
    /// Create from cents, rejecting out-of-bounds values
    pub fn from_cents(cents: u64) -> Result<Self> {
        validate_price(cents)?;
        Ok(Self(cents))
    }

    /// Create from whole units of account per collateral unit
    pub fn from_units(units: u64) -> Result<Self> {
        Self::from_cents(units * PEG_BASE_UNIT)
    }

    /// Get raw cents value
    pub fn cents(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / PEG_BASE_UNIT, self.0 % PEG_BASE_UNIT)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE SOURCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of the current collateral price
pub trait PriceSource {
    /// Get the current price. Fails if no valid price is available.
    fn current(&self) -> Result<Price>;
}

/// An in-memory price source with interior mutability.
///
/// Holds a single price that can be updated at any time; updates validate
/// bounds before storing.
#[derive(Debug)]
pub struct StaticPriceSource {
    price_cents: AtomicU64,
}

impl StaticPriceSource {
    /// Create with an initial price
    pub fn new(price: Price) -> Self {
        Self {
            price_cents: AtomicU64::new(price.cents()),
        }
    }

    /// Update the stored price
    pub fn set(&self, price: Price) {
        self.price_cents.store(price.cents(), Ordering::SeqCst);
    }
}

impl PriceSource for StaticPriceSource {
    fn current(&self) -> Result<Price> {
        Price::from_cents(self.price_cents.load(Ordering::SeqCst))
    }
}

impl<S: PriceSource + ?Sized> PriceSource for &S {
    fn current(&self) -> Result<Price> {
        (**self).current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::utils::constants::MAX_SANE_PRICE;

    #[test]
    fn test_price_validation() {
        assert!(Price::from_units(4_000).is_ok());
        assert!(matches!(
            Price::from_cents(0),
            Err(Error::PriceOutOfBounds { .. })
        ));
        assert!(Price::from_cents(MAX_SANE_PRICE + 1).is_err());
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_units(4_000).unwrap().to_string(), "4000.00");
        assert_eq!(Price::from_cents(1).unwrap().to_string(), "0.01");
    }

    #[test]
    fn test_static_source_updates() {
        let source = StaticPriceSource::new(Price::from_units(4_000).unwrap());
        assert_eq!(source.current().unwrap().cents(), 400_000);

        source.set(Price::from_units(3_000).unwrap());
        assert_eq!(source.current().unwrap().cents(), 300_000);
    }
}
