//! Differential evolution (best/1/bin) global search.
//!
//! Each generation builds every trial vector from the seeded RNG first and
//! only then evaluates the batch, optionally on the rayon pool, before
//! selection. Results therefore do not depend on the number of threads.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bounds::Bounds;
use crate::error::SolverResult;

/// Global stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// RNG seed; equal seeds give equal results
    pub seed: u64,
    /// Generation cap
    pub max_generations: usize,
    /// Population size = multiplier × dimension (at least 5)
    pub population_multiplier: usize,
    /// Differential weight, redrawn uniformly from this range every generation
    pub mutation: (f64, f64),
    /// Crossover probability
    pub recombination: f64,
    /// Relative convergence tolerance on the population cost spread
    pub tol: f64,
    /// Absolute convergence tolerance on the population cost spread
    pub atol: f64,
    /// Evaluate each generation on the rayon thread pool
    pub parallel: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_generations: 1000,
            population_multiplier: 15,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            tol: 0.01,
            atol: 0.0,
            parallel: true,
        }
    }
}

/// Global stage outcome, in parameter space.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionResult {
    pub x: Vec<f64>,
    /// Best cost; `+inf` when no candidate produced a finite cost
    pub cost: f64,
    pub generations: usize,
    pub evaluations: usize,
    pub converged: bool,
}

/// Minimise `cost` over `bounds`. No local polishing is applied.
pub fn differential_evolution<F>(
    cost: F,
    bounds: &Bounds,
    config: &EvolutionConfig,
) -> SolverResult<EvolutionResult>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    let dim = bounds.dim();
    let pop_size = (config.population_multiplier * dim).max(5);
    let mut rng = StdRng::seed_from_u64(config.seed);

    let evaluate = |candidates: &[Vec<f64>]| -> Vec<f64> {
        let energy = |u: &Vec<f64>| sanitize(cost(&bounds.from_unit(u)));
        if config.parallel {
            candidates.par_iter().map(energy).collect()
        } else {
            candidates.iter().map(energy).collect()
        }
    };

    let mut population = latin_hypercube(pop_size, dim, &mut rng);
    let mut energies = evaluate(&population);
    let mut evaluations = pop_size;
    let mut best = argmin(&energies);

    let mut generations = 0;
    let mut converged = false;
    while generations < config.max_generations {
        generations += 1;

        let (lo, hi) = config.mutation;
        let weight = if hi > lo { rng.random_range(lo..hi) } else { lo };

        let trials: Vec<Vec<f64>> = (0..pop_size)
            .map(|i| {
                let (r0, r1) = pick_two(pop_size, i, &mut rng);
                let base = &population[best];
                let fill = rng.random_range(0..dim);
                (0..dim)
                    .map(|j| {
                        let crossover = j == fill || rng.random::<f64>() < config.recombination;
                        let v = if crossover {
                            base[j] + weight * (population[r0][j] - population[r1][j])
                        } else {
                            population[i][j]
                        };
                        if (0.0..=1.0).contains(&v) { v } else { rng.random::<f64>() }
                    })
                    .collect()
            })
            .collect();

        let trial_energies = evaluate(&trials);
        evaluations += pop_size;

        for (i, (trial, energy)) in trials.into_iter().zip(trial_energies).enumerate() {
            if energy <= energies[i] {
                population[i] = trial;
                energies[i] = energy;
                if energy < energies[best] {
                    best = i;
                }
            }
        }
        trace!(generation = generations, best = energies[best], "evolution step");

        if spread_converged(&energies, config.tol, config.atol) {
            converged = true;
            break;
        }
    }

    debug!(
        generations,
        evaluations,
        converged,
        cost = energies[best],
        "differential evolution finished"
    );

    Ok(EvolutionResult {
        x: bounds.from_unit(&population[best]),
        cost: energies[best],
        generations,
        evaluations,
        converged,
    })
}

/// Non-finite costs never win a selection.
fn sanitize(c: f64) -> f64 {
    if c.is_nan() { f64::INFINITY } else { c }
}

fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Two distinct indices in `0..n`, both different from `exclude`.
fn pick_two(n: usize, exclude: usize, rng: &mut StdRng) -> (usize, usize) {
    let mut draw = |taken: &[usize]| loop {
        let k = rng.random_range(0..n);
        if !taken.contains(&k) {
            return k;
        }
    };
    let r0 = draw(&[exclude]);
    let r1 = draw(&[exclude, r0]);
    (r0, r1)
}

/// Stratified initial population: every dimension has one sample per stratum.
fn latin_hypercube(n: usize, dim: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut population = vec![vec![0.0; dim]; n];
    let segment = 1.0 / n as f64;
    for j in 0..dim {
        let mut column: Vec<f64> = (0..n)
            .map(|k| (k as f64 + rng.random::<f64>()) * segment)
            .collect();
        column.shuffle(rng);
        for (member, value) in population.iter_mut().zip(column) {
            member[j] = value;
        }
    }
    population
}

fn spread_converged(energies: &[f64], tol: f64, atol: f64) -> bool {
    if energies.iter().any(|e| !e.is_finite()) {
        return false;
    }
    let n = energies.len() as f64;
    let mean = energies.iter().sum::<f64>() / n;
    let var = energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
    var.sqrt() <= atol + tol * mean.abs()
}
