//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while estimating states or simulating a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Parameter vector has {got} entries, model expects {expected}")]
    Dimension { expected: usize, got: usize },

    #[error("Least-squares fit failed: {what}")]
    Fit { what: &'static str },

    #[error("Core error: {0}")]
    Core(#[from] ct_core::CoreError),
}

pub type SimResult<T> = Result<T, SimError>;

pub(crate) fn check_len(what: &'static str, expected: usize, got: usize) -> SimResult<()> {
    if expected == got {
        Ok(())
    } else {
        Err(SimError::LengthMismatch { what, expected, got })
    }
}
