//! Error type shared by every leash, estimator, and generator in the crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LeashError>;

/// Failures surfaced to the immediate caller. Nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LeashError {
    /// Inputs disagree in length, shape, or rank.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    /// A configuration record failed validation at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Data that cannot be estimated from (empty series, negative rates, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub(crate) fn shape(msg: impl Into<String>) -> LeashError {
    LeashError::ShapeMismatch(msg.into())
}

pub(crate) fn config(msg: impl Into<String>) -> LeashError {
    LeashError::InvalidConfiguration(msg.into())
}

pub(crate) fn input(msg: impl Into<String>) -> LeashError {
    LeashError::InvalidInput(msg.into())
}
