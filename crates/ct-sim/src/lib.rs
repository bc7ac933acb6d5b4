//! Forward simulation of reduced-order cell models.
//!
//! Provides:
//! - Coulomb-counting state-of-charge and ambient temperature estimation
//! - Open-circuit-voltage reference curves (template + per-cell least-squares fit)
//! - 1RC Thevenin equivalent-circuit voltage recurrence
//! - Single-node lumped thermal recurrence with numeric guards
//! - `ForwardModel` trait binding a simulator to measured data for fitting

pub mod ecm;
pub mod error;
pub mod guard;
pub mod model;
pub mod reference;
pub mod state;
pub mod thermal;

// Re-exports for public API
pub use ecm::{EcmModel, EcmParameters, simulate_ecm};
pub use error::{SimError, SimResult};
pub use guard::{GuardHits, Simulation};
pub use model::ForwardModel;
pub use reference::ReferenceCurve;
pub use state::{AMBIENT_PERCENTILE, StateTrace, coulomb_count, estimate_ambient};
pub use thermal::{ThermalConditions, ThermalModel, ThermalParameters, simulate_thermal};
