//! Error types raised while configuring scoring weights.

use thiserror::Error;

/// Errors raised when a set of weights cannot produce a weighted average.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    /// A weight is negative.
    #[error("weight {key} must be non-negative, got {value}")]
    Negative {
        /// Component name.
        key: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A weight is NaN or infinite.
    #[error("weight {key} must be finite")]
    NonFinite {
        /// Component name.
        key: &'static str,
    },
    /// Every weight is zero.
    #[error("all weights cannot be zero")]
    ZeroTotal,
}
