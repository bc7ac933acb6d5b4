use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Insufficient data: {remaining} usable samples (need at least {required})")]
    InsufficientData { remaining: usize, required: usize },

    #[error("Column length mismatch: {column} has {len} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        len: usize,
        expected: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
