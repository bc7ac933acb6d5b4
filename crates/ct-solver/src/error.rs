//! Error types for solver operations.

use thiserror::Error;

/// Errors that can occur during parameter identification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid bounds: {what}")]
    InvalidBounds { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Optimization diverged: {what}")]
    Diverged { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;
