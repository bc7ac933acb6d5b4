//! ct-core: stable foundation for celltwin.
//!
//! Contains:
//! - units (uom SI types + constructors for cell quantities)
//! - numeric (Real + quadrature, percentiles and residual norms)
//! - table (columnar in-memory input records)
//! - series (cleaned time series consumed by the simulators)
//! - preprocess (schema check, sorting, cleaning, phase selection)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod preprocess;
pub mod series;
pub mod table;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use preprocess::{
    DISCHARGE_DEADBAND_A, MIN_SAMPLES, preprocess_electrical, preprocess_thermal,
    preprocess_electrical_with_deadband,
};
pub use series::{OutputKind, TimeSeries, columns};
pub use table::Table;
pub use units::*;
