//! Numeric guards applied inside the simulators.
//!
//! The clamp bounds and their order of application shape how the global
//! search explores unstable regions; they are not physical limits.

use tracing::trace;

/// Smallest time step used by either recurrence (s).
pub const DT_MIN_S: f64 = 1e-6;
/// Largest time step used by the thermal recurrence (s).
pub const DT_MAX_S: f64 = 600.0;
/// Temperature state clamp (°C).
pub const TEMP_MIN_C: f64 = -50.0;
pub const TEMP_MAX_C: f64 = 200.0;
/// Per-step temperature change clamp (K).
pub const DELTA_T_MAX: f64 = 50.0;
/// Floor on thermal capacitance in the step update (J/K).
pub const C_TH_MIN: f64 = 1e-6;
/// Time constants at or below this are treated as instantaneous (s).
pub const TAU_MIN_S: f64 = 1e-9;

/// Count of guard activations in one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardHits {
    pub dt: usize,
    pub state: usize,
    pub delta: usize,
}

impl GuardHits {
    pub fn any(&self) -> bool {
        self.total() > 0
    }

    pub fn total(&self) -> usize {
        self.dt + self.state + self.delta
    }

    /// Emit the diagnostic for a run that hit a guard. Never fatal.
    pub fn report(&self, model: &'static str) {
        if self.any() {
            trace!(
                model,
                dt = self.dt,
                state = self.state,
                delta = self.delta,
                "numeric guard triggered"
            );
        }
    }
}

/// Clamp `v` into `[lo, hi]`, counting the activation.
#[inline]
pub(crate) fn clamp_counted(v: f64, lo: f64, hi: f64, hits: &mut usize) -> f64 {
    if v < lo {
        *hits += 1;
        lo
    } else if v > hi {
        *hits += 1;
        hi
    } else {
        v
    }
}

/// Predicted output series plus guard diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub output: Vec<f64>,
    pub guards: GuardHits,
}
