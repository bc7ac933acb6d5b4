//! Bounded parameter identification.
//!
//! This crate searches a box-bounded parameter space for the vector that
//! minimises a scalar cost. Identification runs in two stages: a seeded
//! differential-evolution global search, then a projected limited-memory
//! quasi-Newton refinement started from the global optimum. Both stages work
//! in coordinates normalised to the unit box.

pub mod bounds;
pub mod error;
pub mod evolution;
pub mod gradient;
pub mod identify;
pub mod lbfgs;

pub use bounds::{Bounds, Interval};
pub use error::{SolverError, SolverResult};
pub use evolution::{EvolutionConfig, EvolutionResult, differential_evolution};
pub use identify::{IdentifyConfig, Identification, identify};
pub use lbfgs::{LocalConfig, LocalResult, minimize_bounded};
