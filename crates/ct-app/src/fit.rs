//! Model-agnostic fitting step shared by the electrical and thermal pipelines.

use std::sync::atomic::{AtomicUsize, Ordering};

use ct_sim::{ForwardModel, Simulation};
use ct_solver::{Bounds, IdentifyConfig, identify};
use tracing::debug;

use crate::error::{IdentifyError, IdentifyResult};
use crate::result::FitDiagnostics;

pub(crate) struct Fit {
    pub x: Vec<f64>,
    /// Simulation at `x`
    pub simulation: Simulation,
    pub diagnostics: FitDiagnostics,
}

/// Run the two-stage identifier on `model` and simulate the winner.
pub(crate) fn fit_model<M: ForwardModel>(
    model: &M,
    bounds: &Bounds,
    config: &IdentifyConfig,
) -> IdentifyResult<Fit> {
    if bounds.dim() != model.dimension() {
        return Err(IdentifyError::InvalidInput(format!(
            "{} model has {} parameters but {} bounds were given",
            M::NAME,
            model.dimension(),
            bounds.dim()
        )));
    }

    let guarded = AtomicUsize::new(0);
    let cost = |x: &[f64]| {
        let (cost, guards) = model.evaluate(x);
        if guards.any() {
            guarded.fetch_add(1, Ordering::Relaxed);
        }
        cost
    };
    let identification = identify(cost, bounds, config)?;

    let simulation = model.simulate(&identification.x)?;
    let guarded_evaluations = guarded.load(Ordering::Relaxed);
    if guarded_evaluations > 0 {
        debug!(
            model = M::NAME,
            guarded_evaluations,
            evaluations = identification.evaluations,
            "numeric guards were active during search"
        );
    }

    let diagnostics = FitDiagnostics {
        global_cost: identification.global_cost,
        final_cost: identification.cost,
        generations: identification.generations,
        local_iterations: identification.local_iterations,
        local_converged: identification.local_converged,
        evaluations: identification.evaluations,
        guarded_evaluations,
        final_guard_hits: simulation.guards.total(),
    };

    Ok(Fit {
        x: identification.x,
        simulation,
        diagnostics,
    })
}
