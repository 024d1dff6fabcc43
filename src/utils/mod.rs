//! Utility modules: constants, checked arithmetic, input validation.

pub mod constants;
pub mod math;
pub mod validation;
