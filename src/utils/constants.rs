//! Engine constants and magic numbers.
//!
//! All system-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Base units per collateral unit (1 unit = 100,000,000 base units)
pub const COLLATERAL_BASE_UNIT: u64 = 100_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// PEG CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Peg token decimals (stored as cents of the unit of account)
pub const PEG_DECIMALS: u8 = 2;

/// Base unit for the peg token (1 peg unit = 100 cents)
pub const PEG_BASE_UNIT: u64 = 100;

/// Maximum peg supply (100 billion peg units in cents)
pub const MAX_PEG_SUPPLY: u64 = 100_000_000_000 * PEG_BASE_UNIT;

// ═══════════════════════════════════════════════════════════════════════════════
// RATE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Basis points divisor (10000 = 100%)
pub const BPS_DIVISOR: u64 = 10_000;

/// Default mint fee rate - 3% (300 basis points)
pub const DEFAULT_FEE_RATE_BPS: u64 = 300;

/// Default minimum buffer ratio for the bootstrap surplus deposit - 10%
pub const DEFAULT_MIN_BUFFER_RATIO_BPS: u64 = 1_000;

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimum sane price - $0.01 per collateral unit
pub const MIN_SANE_PRICE: u64 = 1;

/// Maximum sane price - $100,000,000 per collateral unit
pub const MAX_SANE_PRICE: u64 = 100_000_000 * PEG_BASE_UNIT;

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of an account identifier in bytes
pub const ACCOUNT_ID_LENGTH: usize = 20;
