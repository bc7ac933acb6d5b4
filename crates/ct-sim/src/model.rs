//! ForwardModel trait binding a simulator to one measured record.

use ct_core::rmse;

use crate::error::SimResult;
use crate::guard::{GuardHits, Simulation};

/// A simulator prepared against one measured series, evaluated at candidate
/// parameter vectors during identification.
///
/// Implementations must be pure: the same `x` always yields the same output.
/// `Sync` lets the global search evaluate candidates from worker threads.
pub trait ForwardModel: Sync {
    /// Short label used in logs.
    const NAME: &'static str;

    /// Number of free parameters in `x`.
    fn dimension(&self) -> usize;

    /// Measured output the simulation is compared against.
    fn measured(&self) -> &[f64];

    /// Predicted output for parameter vector `x`.
    fn simulate(&self, x: &[f64]) -> SimResult<Simulation>;

    /// Root-mean-square residual at `x` with the guard activity that produced
    /// it. The cost is NaN when the simulation fails.
    fn evaluate(&self, x: &[f64]) -> (f64, GuardHits) {
        match self.simulate(x) {
            Ok(sim) => {
                sim.guards.report(Self::NAME);
                (rmse(&sim.output, self.measured()), sim.guards)
            }
            Err(_) => (f64::NAN, GuardHits::default()),
        }
    }

    fn cost(&self, x: &[f64]) -> f64 {
        self.evaluate(x).0
    }
}
