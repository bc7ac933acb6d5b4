//! Error types for the ct-app service layer.

use std::path::PathBuf;

/// Failure taxonomy surfaced to callers of the identification entry points.
///
/// Backend errors are folded into these variants so the CLI can report one
/// kind of failure regardless of which stage produced it.
#[derive(Debug, thiserror::Error)]
pub enum IdentifyError {
    #[error("Missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Insufficient data: {remaining} usable samples after cleaning (need at least {required})")]
    InsufficientData { remaining: usize, required: usize },

    #[error("Optimization diverged: {what}")]
    OptimizationDiverged { what: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Numeric failure: {0}")]
    Numeric(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ct-app operations.
pub type IdentifyResult<T> = Result<T, IdentifyError>;

impl From<ct_core::CoreError> for IdentifyError {
    fn from(err: ct_core::CoreError) -> Self {
        use ct_core::CoreError;
        match err {
            CoreError::Schema { missing } => IdentifyError::Schema { missing },
            CoreError::InsufficientData { remaining, required } => {
                IdentifyError::InsufficientData { remaining, required }
            }
            other => IdentifyError::InvalidInput(other.to_string()),
        }
    }
}

impl From<ct_sim::SimError> for IdentifyError {
    fn from(err: ct_sim::SimError) -> Self {
        use ct_sim::SimError;
        match err {
            SimError::Core(core) => core.into(),
            SimError::Fit { .. } => IdentifyError::Numeric(err.to_string()),
            other => IdentifyError::InvalidInput(other.to_string()),
        }
    }
}

impl From<ct_solver::SolverError> for IdentifyError {
    fn from(err: ct_solver::SolverError) -> Self {
        use ct_solver::SolverError;
        match err {
            SolverError::Diverged { what } => IdentifyError::OptimizationDiverged { what },
            SolverError::Numeric { what } => IdentifyError::Numeric(what),
            SolverError::InvalidBounds { what } => IdentifyError::Config(what),
            SolverError::InvalidArg { what } => IdentifyError::InvalidInput(what),
        }
    }
}

impl From<serde_yaml::Error> for IdentifyError {
    fn from(err: serde_yaml::Error) -> Self {
        IdentifyError::Config(err.to_string())
    }
}
