//! Box constraints and the unit-box mapping both stages search in.

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

/// Closed interval of physically plausible values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.lo && v <= self.hi
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    intervals: Vec<Interval>,
}

impl Bounds {
    pub fn new(intervals: Vec<Interval>) -> SolverResult<Self> {
        if intervals.is_empty() {
            return Err(SolverError::InvalidBounds {
                what: "no parameters".to_string(),
            });
        }
        for (i, iv) in intervals.iter().enumerate() {
            if !(iv.lo.is_finite() && iv.hi.is_finite()) || iv.lo > iv.hi {
                return Err(SolverError::InvalidBounds {
                    what: format!("parameter {i}: [{}, {}]", iv.lo, iv.hi),
                });
            }
        }
        Ok(Self { intervals })
    }

    pub fn dim(&self) -> usize {
        self.intervals.len()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Map a point from the unit box into parameter space.
    pub fn from_unit(&self, u: &[f64]) -> Vec<f64> {
        self.intervals
            .iter()
            .zip(u)
            .map(|(iv, &ui)| iv.lo + ui.clamp(0.0, 1.0) * iv.width())
            .collect()
    }

    /// Map a parameter-space point into the unit box (clamped).
    pub fn to_unit(&self, x: &[f64]) -> Vec<f64> {
        self.intervals
            .iter()
            .zip(x)
            .map(|(iv, &xi)| {
                if iv.width() > 0.0 {
                    ((xi - iv.lo) / iv.width()).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            })
            .collect()
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dim() && self.intervals.iter().zip(x).all(|(iv, &v)| iv.contains(v))
    }
}
