//! Core engine types: token ledgers, the collateral pool, parameters, and
//! the collateralization engine itself.

pub mod collateral;
pub mod config;
pub mod engine;
pub mod ledger;

pub use collateral::{CollateralAmount, CollateralPool};
pub use config::EngineParams;
pub use engine::{
    BufferDepositOutcome, BufferWithdrawOutcome, BurnOutcome, CollateralizationEngine,
    EngineEvent, EngineState, MintOutcome, SharedEngine,
};
pub use ledger::{AccountId, TokenAmount, TokenEvent, TokenLedger, TokenOperation};
