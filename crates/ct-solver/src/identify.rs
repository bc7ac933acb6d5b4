//! Two-stage identification: global evolution, then bounded local refinement.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bounds::Bounds;
use crate::error::{SolverError, SolverResult};
use crate::evolution::{EvolutionConfig, differential_evolution};
use crate::lbfgs::{LocalConfig, minimize_bounded};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifyConfig {
    pub global: EvolutionConfig,
    pub local: LocalConfig,
}

/// Identified parameter vector and how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    pub x: Vec<f64>,
    pub cost: f64,
    /// Best cost after the global stage
    pub global_cost: f64,
    pub generations: usize,
    pub local_iterations: usize,
    pub local_converged: bool,
    /// Cost evaluations across both stages
    pub evaluations: usize,
}

/// Minimise `cost` over `bounds`.
///
/// Fails with [`SolverError::Diverged`] when the global stage finds no finite
/// cost anywhere in the box.
pub fn identify<F>(cost: F, bounds: &Bounds, config: &IdentifyConfig) -> SolverResult<Identification>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    let global = differential_evolution(&cost, bounds, &config.global)?;
    if !global.cost.is_finite() {
        return Err(SolverError::Diverged {
            what: format!(
                "no finite cost after {} evaluations",
                global.evaluations
            ),
        });
    }
    info!(
        cost = global.cost,
        generations = global.generations,
        "global stage complete"
    );

    let local = minimize_bounded(&cost, &global.x, bounds, &config.local)?;
    info!(
        cost = local.cost,
        iterations = local.iterations,
        converged = local.converged,
        "local stage complete"
    );

    let (x, final_cost) = if local.cost.is_finite() && local.cost <= global.cost {
        (local.x, local.cost)
    } else {
        (global.x, global.cost)
    };

    Ok(Identification {
        x,
        cost: final_cost,
        global_cost: global.cost,
        generations: global.generations,
        local_iterations: local.iterations,
        local_converged: local.converged,
        evaluations: global.evaluations + local.evaluations,
    })
}
