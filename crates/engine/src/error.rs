//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`InvalidArgument`] returned when a caller supplies a malformed or
//!   missing parameter (dates, interval, amount, currency, id).
//! - [`ExistingKey`] returned when a transaction id is already in the store.
//! - [`Internal`] returned when an aggregation cannot complete (e.g. the
//!   money accumulator overflows).
//!
//!  [`InvalidArgument`]: EngineError::InvalidArgument
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Internal`]: EngineError::Internal
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Csv(a), Self::Csv(b)) => a.to_string() == b.to_string(),
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
