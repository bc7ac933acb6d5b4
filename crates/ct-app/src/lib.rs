//! Identification service layer for celltwin.
//!
//! This crate is the single entry point for frontends: it wires the
//! preprocessor, state estimator, simulators and two-stage identifier into
//! the electrical and thermal pipelines, and owns configuration, metrics,
//! results and the unified error type.

pub mod config;
pub mod electrical;
pub mod error;
mod fit;
pub mod metrics;
pub mod predict;
pub mod result;
pub mod thermal;

// Re-export key types for convenience
pub use config::{
    EcmBounds, ElectricalConfig, ReferencePolicy, ThermalBounds, ThermalConfig, load_config,
    parse_config,
};
pub use electrical::{
    ElectricalSession, coarse_resistance, identify_electrical, identify_electrical_with_config,
};
pub use error::{IdentifyError, IdentifyResult};
pub use metrics::{Metrics, compute_metrics};
pub use predict::{KnownParameters, PredictedSeries, predict};
pub use result::{
    CalibrationResult, DerivedQuantities, FitDiagnostics, IdentifiedParameters, SampleRecord,
    SummaryRecord,
};
pub use thermal::{
    DEFAULT_INTERNAL_RESISTANCE, DEFAULT_THERMAL_CAPACITANCE, identify_thermal,
    identify_thermal_with_config,
};
