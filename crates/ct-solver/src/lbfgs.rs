//! Projected limited-memory BFGS for box-constrained minimisation.

use std::cell::Cell;
use std::collections::VecDeque;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bounds::Bounds;
use crate::error::{SolverError, SolverResult};
use crate::gradient::bounded_forward_gradient;

/// Local stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Maximum accepted steps
    pub max_iterations: usize,
    /// Stop when the relative cost reduction of a step falls to this
    pub ftol: f64,
    /// Stop when the largest projected gradient component falls to this
    pub gtol: f64,
    /// Number of stored curvature pairs
    pub history: usize,
    /// Relative finite difference step
    pub fd_step: f64,
    /// Backtracking steps before giving up on a direction
    pub max_line_search: usize,
    /// Sufficient decrease constant
    pub armijo: f64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15_000,
            ftol: 2.220_446_049_250_313e-9,
            gtol: 1e-5,
            history: 10,
            fd_step: 1.490_116_119_384_765_6e-8,
            max_line_search: 20,
            armijo: 1e-4,
        }
    }
}

/// Local stage outcome, in parameter space.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalResult {
    pub x: Vec<f64>,
    pub cost: f64,
    pub iterations: usize,
    pub evaluations: usize,
    /// A tolerance was met (as opposed to hitting a cap or a failed line search)
    pub converged: bool,
}

struct Correction {
    s: DVector<f64>,
    y: DVector<f64>,
}

/// Minimise `cost` from `x0` without leaving `bounds`.
///
/// A failed line search or a non-finite gradient ends the search early; the
/// best point reached so far is returned rather than an error.
pub fn minimize_bounded<F>(
    cost: F,
    x0: &[f64],
    bounds: &Bounds,
    config: &LocalConfig,
) -> SolverResult<LocalResult>
where
    F: Fn(&[f64]) -> f64,
{
    if x0.len() != bounds.dim() {
        return Err(SolverError::InvalidArg {
            what: format!(
                "start point has {} entries, bounds have {}",
                x0.len(),
                bounds.dim()
            ),
        });
    }

    let evaluations = Cell::new(0usize);
    let eval = |u: &DVector<f64>| {
        evaluations.set(evaluations.get() + 1);
        cost(&bounds.from_unit(u.as_slice()))
    };
    let finish = |u: &DVector<f64>, f: f64, iterations: usize, converged: bool| LocalResult {
        x: bounds.from_unit(u.as_slice()),
        cost: f,
        iterations,
        evaluations: evaluations.get(),
        converged,
    };

    let mut u = DVector::from_vec(bounds.to_unit(x0));
    let mut f = eval(&u);
    if !f.is_finite() {
        return Ok(finish(&u, f, 0, false));
    }
    let mut g = match bounded_forward_gradient(&u, f, &eval, config.fd_step) {
        Ok(g) => g,
        Err(_) => return Ok(finish(&u, f, 0, false)),
    };

    let mut history: VecDeque<Correction> = VecDeque::with_capacity(config.history);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        let pg = projected_gradient(&u, &g);
        if pg.amax() <= config.gtol {
            converged = true;
            break;
        }
        let free: Vec<bool> = pg.iter().map(|v| *v != 0.0).collect();

        let mut d = two_loop_direction(&g, &history, &free);
        if d.dot(&g) >= 0.0 {
            history.clear();
            d = -pg.clone();
        }
        let mut alpha = if history.is_empty() {
            (1.0 / d.norm()).min(1.0)
        } else {
            1.0
        };

        let mut accepted = None;
        for _ in 0..config.max_line_search {
            let trial = project(&u + alpha * &d);
            let step = &trial - &u;
            if step.amax() == 0.0 {
                break;
            }
            let f_trial = eval(&trial);
            if f_trial.is_finite() && f_trial <= f + config.armijo * g.dot(&step) {
                accepted = Some((trial, f_trial, step));
                break;
            }
            alpha *= 0.5;
        }
        let Some((u_new, f_new, s)) = accepted else {
            debug!(iterations, cost = f, "line search exhausted");
            break;
        };

        let reduction = (f - f_new) / f.abs().max(f_new.abs()).max(1.0);
        iterations += 1;

        let g_new = match bounded_forward_gradient(&u_new, f_new, &eval, config.fd_step) {
            Ok(g_new) => g_new,
            Err(_) => {
                u = u_new;
                f = f_new;
                break;
            }
        };
        let y = &g_new - &g;
        if config.history > 0 && s.dot(&y) > f64::EPSILON * y.norm_squared() {
            if history.len() == config.history {
                history.pop_front();
            }
            history.push_back(Correction { s, y });
        }

        u = u_new;
        f = f_new;
        g = g_new;

        if reduction <= config.ftol {
            converged = true;
            break;
        }
    }

    debug!(iterations, converged, cost = f, "bounded quasi-Newton finished");
    Ok(finish(&u, f, iterations, converged))
}

fn project(mut u: DVector<f64>) -> DVector<f64> {
    u.apply(|v| *v = v.clamp(0.0, 1.0));
    u
}

/// Gradient with components zeroed where the unit box blocks descent.
fn projected_gradient(u: &DVector<f64>, g: &DVector<f64>) -> DVector<f64> {
    DVector::from_iterator(
        u.len(),
        u.iter().zip(g.iter()).map(|(&ui, &gi)| {
            if (ui <= 0.0 && gi > 0.0) || (ui >= 1.0 && gi < 0.0) {
                0.0
            } else {
                gi
            }
        }),
    )
}

fn masked(v: &DVector<f64>, free: &[bool]) -> DVector<f64> {
    DVector::from_iterator(
        v.len(),
        v.iter().zip(free).map(|(&x, &f)| if f { x } else { 0.0 }),
    )
}

/// L-BFGS two-loop recursion restricted to the free variables.
fn two_loop_direction(
    g: &DVector<f64>,
    history: &VecDeque<Correction>,
    free: &[bool],
) -> DVector<f64> {
    let pairs: Vec<(DVector<f64>, DVector<f64>, f64)> = history
        .iter()
        .filter_map(|c| {
            let s = masked(&c.s, free);
            let y = masked(&c.y, free);
            let sy = s.dot(&y);
            (sy > 0.0).then(|| (s, y, 1.0 / sy))
        })
        .collect();

    let mut q = masked(g, free);
    let mut alphas = Vec::with_capacity(pairs.len());
    for (s, y, rho) in pairs.iter().rev() {
        let a = rho * s.dot(&q);
        q -= a * y;
        alphas.push(a);
    }

    let gamma = pairs
        .last()
        .map(|(s, y, _)| s.dot(y) / y.norm_squared())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(1.0);
    let mut r = gamma * q;

    for ((s, y, rho), a) in pairs.iter().zip(alphas.iter().rev()) {
        let b = rho * y.dot(&r);
        r += (a - b) * s;
    }

    -masked(&r, free)
}
