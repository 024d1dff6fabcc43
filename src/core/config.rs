//! Engine parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::constants::{DEFAULT_FEE_RATE_BPS, DEFAULT_MIN_BUFFER_RATIO_BPS};
use crate::utils::validation::{validate_buffer_ratio, validate_fee_rate};

/// Tunable parameters of a [`CollateralizationEngine`](crate::core::engine::CollateralizationEngine).
///
/// Fixed at construction; there is no on-line governance path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Mint fee rate in basis points (300 = 3%)
    pub fee_rate_bps: u64,
    /// Minimum surplus buffer ratio for the bootstrap deposit,
    /// in basis points of outstanding peg value (1000 = 10%)
    pub min_buffer_ratio_bps: u64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            fee_rate_bps: DEFAULT_FEE_RATE_BPS,
            min_buffer_ratio_bps: DEFAULT_MIN_BUFFER_RATIO_BPS,
        }
    }
}

impl EngineParams {
    /// Set the mint fee rate
    pub fn with_fee_rate_bps(mut self, bps: u64) -> Self {
        self.fee_rate_bps = bps;
        self
    }

    /// Set the minimum buffer ratio
    pub fn with_min_buffer_ratio_bps(mut self, bps: u64) -> Self {
        self.min_buffer_ratio_bps = bps;
        self
    }

    /// Validate all parameters
    pub fn validate(&self) -> Result<()> {
        validate_fee_rate(self.fee_rate_bps)?;
        validate_buffer_ratio(self.min_buffer_ratio_bps)?;
        Ok(())
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Parse from a JSON string and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }
}
