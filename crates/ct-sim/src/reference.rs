//! Open-circuit-voltage reference curves.
//!
//! A curve is a polynomial in state-of-charge, stored highest power first.
//! Inputs are clamped to [0, 1] before evaluation.

use nalgebra::{DMatrix, DVector};

use crate::error::{SimError, SimResult, check_len};

/// Polynomial order used for both the template and per-cell fits.
pub const REFERENCE_DEGREE: usize = 8;

/// State-of-charge grid of the population-level lookup table.
const TEMPLATE_SOC_STEP: f64 = 0.05;

/// 18650 NMC open-circuit voltage (V) at SOC = 0.00, 0.05, ..., 1.00.
const TEMPLATE_OCV: [f64; 21] = [
    2.70, 2.90, 3.10, 3.22, 3.32, 3.40, 3.46, 3.51, 3.56, 3.60, 3.65, 3.69, 3.73, 3.77, 3.82,
    3.87, 3.93, 3.99, 4.05, 4.13, 4.20,
];

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCurve {
    coefficients: Vec<f64>,
}

impl ReferenceCurve {
    pub fn from_coefficients(coefficients: Vec<f64>) -> SimResult<Self> {
        if coefficients.is_empty() {
            return Err(SimError::InvalidArg {
                what: "reference curve needs at least one coefficient",
            });
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "reference curve coefficients must be finite",
            });
        }
        Ok(Self { coefficients })
    }

    /// Constant open-circuit voltage.
    pub fn flat(ocv: f64) -> Self {
        Self {
            coefficients: vec![ocv],
        }
    }

    /// Population-level starting curve fitted to the 18650 lookup table.
    pub fn template() -> SimResult<Self> {
        let soc: Vec<f64> = (0..TEMPLATE_OCV.len())
            .map(|i| i as f64 * TEMPLATE_SOC_STEP)
            .collect();
        Self::fit(&soc, &TEMPLATE_OCV, REFERENCE_DEGREE)
    }

    /// Least-squares polynomial fit of `ocv` against `soc`.
    ///
    /// Vandermonde columns are normalised before an SVD solve so high powers
    /// of small SOC values stay well conditioned; rank-deficient systems get the
    /// minimum-norm solution.
    pub fn fit(soc: &[f64], ocv: &[f64], degree: usize) -> SimResult<Self> {
        check_len("reference fit samples", soc.len(), ocv.len())?;
        if soc.is_empty() {
            return Err(SimError::Fit {
                what: "no samples",
            });
        }

        let n = soc.len();
        let cols = degree + 1;
        let mut lhs = DMatrix::from_fn(n, cols, |i, j| soc[i].powi((degree - j) as i32));
        let mut scale = vec![1.0; cols];
        for (j, s) in scale.iter_mut().enumerate() {
            let norm = lhs.column(j).norm();
            if norm > 0.0 && norm.is_finite() {
                *s = norm;
                lhs.column_mut(j).unscale_mut(norm);
            }
        }
        let rhs = DVector::from_column_slice(ocv);

        let svd = lhs.svd(true, true);
        let max_sv = svd.singular_values.max();
        let eps = n as f64 * f64::EPSILON * max_sv;
        let solution = svd
            .solve(&rhs, eps)
            .map_err(|what| SimError::Fit { what })?;

        let coefficients: Vec<f64> = solution
            .iter()
            .zip(&scale)
            .map(|(c, s)| c / s)
            .collect();
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(SimError::Fit {
                what: "non-finite coefficient",
            });
        }
        Ok(Self { coefficients })
    }

    /// Open-circuit voltage at `soc` (clamped to [0, 1]).
    #[inline]
    pub fn ocv(&self, soc: f64) -> f64 {
        let x = soc.clamp(0.0, 1.0);
        self.coefficients.iter().fold(0.0, |acc, c| acc * x + c)
    }

    /// Coefficients, highest power first.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }
}
