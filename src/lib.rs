//! # Pegstone
//!
//! A two-token collateralized stablecoin engine.
//!
//! One pool of collateral backs two tokens: a **peg token** ("StableCoin")
//! pinned one-to-one to the unit of account, and a **surplus share token**
//! ("DepositorCoin") whose holders own whatever pool value exceeds the
//! outstanding peg supply. Peg holders mint and burn at the oracle price;
//! share holders capitalize the surplus buffer and absorb collateral price
//! swings in both directions.
//!
//! ## Architecture
//!
//! - [`core::engine::CollateralizationEngine`] — all four operations (mint,
//!   burn, buffer deposit, buffer withdrawal), each all-or-nothing
//! - [`core::ledger::TokenLedger`] — balances, transfers, allowances; supply
//!   mutations are engine-only
//! - [`core::collateral::CollateralPool`] — the undifferentiated pool with
//!   audit counters
//! - [`oracle::price_feed::PriceSource`] — pluggable collateral price feed
//!
//! ## Example
//!
//! ```
//! use pegstone::core::{AccountId, CollateralAmount, CollateralizationEngine, EngineParams};
//! use pegstone::oracle::{Price, StaticPriceSource};
//!
//! # fn main() -> pegstone::Result<()> {
//! let feed = StaticPriceSource::new(Price::from_units(4_000)?);
//! let mut engine = CollateralizationEngine::new(EngineParams::default(), feed)?;
//!
//! let alice = AccountId::from_seed(b"alice");
//! let outcome = engine.mint(alice, CollateralAmount::from_units(1))?;
//! assert_eq!(outcome.minted.cents(), 388_000); // $4,000 less the 3% fee
//! # Ok(())
//! # }
//! ```
//!
//! All arithmetic is integer-only (u64 with u128 intermediates), rounding
//! toward zero, with checked overflow throughout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod core;
pub mod error;
pub mod oracle;
pub mod utils;

pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name
pub const PROTOCOL_NAME: &str = "Pegstone";

/// Commonly used types
pub mod prelude {
    pub use crate::core::{
        AccountId, BufferDepositOutcome, BufferWithdrawOutcome, BurnOutcome, CollateralAmount,
        CollateralPool, CollateralizationEngine, EngineEvent, EngineParams, EngineState,
        MintOutcome, SharedEngine, TokenAmount, TokenLedger,
    };
    pub use crate::error::{Error, Result};
    pub use crate::oracle::{Price, PriceSource, StaticPriceSource};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_set() {
        assert!(!VERSION.is_empty());
        assert_eq!(PROTOCOL_NAME, "Pegstone");
    }
}
