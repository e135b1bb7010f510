//! # Error Module
//!
//! Typed failure taxonomy for the estimation engine
//!
//! ## Key Components
//! - [`EstimateError`] - All ways a cost estimation can be rejected
//!
//! The engine never substitutes defaults for bad reference keys: an unknown
//! pattern, memory strategy, or model is a data-entry bug upstream and must
//! surface at the calculation boundary instead of producing silently wrong
//! dollar figures.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    #[error("unknown architecture pattern '{0}'")]
    UnknownPattern(String),

    #[error("unknown memory strategy '{0}'")]
    UnknownMemoryStrategy(String),

    #[error("unknown model '{0}' (not in the pricing table)")]
    UnknownModel(String),

    #[error("invalid system description: {0}")]
    InvalidInput(String),
}
