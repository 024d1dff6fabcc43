//! Error types for the Pegstone engine.
//!
//! This module defines all error types used throughout the crate,
//! providing clear and actionable error messages.

use thiserror::Error;

/// Result type alias for Pegstone operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Pegstone engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Amount is zero (or rounds to zero at the current price)
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Caller's token balance is too small for the requested operation
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Required amount in cents
        required: u64,
        /// Available amount in cents
        available: u64,
    },

    /// Spender's allowance is too small for the requested transfer
    #[error("Insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance {
        /// Required amount in cents
        required: u64,
        /// Approved amount in cents
        available: u64,
    },

    /// Withdrawal exceeds the system's free surplus value
    #[error("Insufficient surplus: requested {requested}, available {available}")]
    InsufficientSurplus {
        /// Requested surplus value in cents
        requested: u64,
        /// Free surplus value in cents
        available: u64,
    },

    /// Bootstrap buffer deposit below the minimum-ratio floor
    #[error("Initial collateral ratio not met, minimum is {minimum} collateral base units")]
    InitialCollateralRatio {
        /// Required minimum deposit in collateral base units
        minimum: u64,
    },

    /// Surplus shares are outstanding but the surplus value is zero, so
    /// proportional share issuance is undefined
    #[error("Surplus buffer is depleted; deposits are rejected until the system is recollateralized")]
    SurplusDepleted,

    /// Invalid input parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Price out of sane bounds
    #[error("Price {price} out of bounds [{min}, {max}]")]
    PriceOutOfBounds {
        /// Observed price in cents per collateral unit
        price: u64,
        /// Minimum sane price
        min: u64,
        /// Maximum sane price
        max: u64,
    },

    /// Peg supply cap reached
    #[error("Supply cap reached: new supply {current} exceeds maximum {max}")]
    SupplyCapReached {
        /// Supply that the mint would produce
        current: u64,
        /// Maximum allowed supply
        max: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Invariant Violations
    // ═══════════════════════════════════════════════════════════════════

    /// Collateral pool is short on an accounted payout (should be unreachable)
    #[error("Insufficient collateral: required {required}, available {available}")]
    InsufficientCollateral {
        /// Required collateral in base units
        required: u64,
        /// Pooled collateral in base units
        available: u64,
    },

    /// Invariant violation detected
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Underflow in calculation
    #[error("Arithmetic underflow in {operation}")]
    Underflow {
        /// Operation that underflowed
        operation: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Lock acquisition failed
    #[error("Failed to acquire engine lock")]
    Lock,
}

impl Error {
    /// Returns true if this error is caller-correctable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ZeroAmount
                | Error::InsufficientBalance { .. }
                | Error::InsufficientAllowance { .. }
                | Error::InsufficientSurplus { .. }
                | Error::InitialCollateralRatio { .. }
                | Error::SurplusDepleted
                | Error::InvalidParameter { .. }
                | Error::PriceOutOfBounds { .. }
                | Error::SupplyCapReached { .. }
        )
    }

    /// Returns true if this is a critical error requiring immediate attention
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Error::InsufficientCollateral { .. }
                | Error::InvariantViolation(_)
                | Error::Overflow { .. }
                | Error::Underflow { .. }
                | Error::Lock
        )
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Validation errors: 1xxx
            Error::ZeroAmount => 1001,
            Error::InsufficientBalance { .. } => 1002,
            Error::InsufficientAllowance { .. } => 1003,
            Error::InsufficientSurplus { .. } => 1004,
            Error::InitialCollateralRatio { .. } => 1005,
            Error::SurplusDepleted => 1006,
            Error::InvalidParameter { .. } => 1007,
            Error::PriceOutOfBounds { .. } => 1008,
            Error::SupplyCapReached { .. } => 1009,

            // Invariant violations: 2xxx
            Error::InsufficientCollateral { .. } => 2001,
            Error::InvariantViolation(_) => 2002,
            Error::Overflow { .. } => 2003,
            Error::Underflow { .. } => 2004,

            // Serialization errors: 3xxx
            Error::Serialization(_) => 3001,
            Error::Deserialization(_) => 3002,

            // Internal errors: 9xxx
            Error::Lock => 9001,
        }
    }
}
