//! Finite difference gradients inside the unit box.

use nalgebra::DVector;

use crate::error::{SolverError, SolverResult};

/// One-sided finite difference gradient of `f` at `u`, `f_u = f(u)`.
///
/// Each coordinate steps forward by `epsilon * max(|u_j|, 1)`, or backward
/// when the forward step would leave the unit box.
pub fn bounded_forward_gradient<F>(
    u: &DVector<f64>,
    f_u: f64,
    f: F,
    epsilon: f64,
) -> SolverResult<DVector<f64>>
where
    F: Fn(&DVector<f64>) -> f64,
{
    let n = u.len();
    let mut grad = DVector::zeros(n);

    for j in 0..n {
        let mut h = epsilon * u[j].abs().max(1.0);
        if u[j] + h > 1.0 {
            h = -h;
        }
        let mut u_perturbed = u.clone();
        u_perturbed[j] += h;

        let f_perturbed = f(&u_perturbed);
        let df = (f_perturbed - f_u) / h;
        if !df.is_finite() {
            return Err(SolverError::Numeric {
                what: format!("non-finite gradient component {j}"),
            });
        }
        grad[j] = df;
    }

    Ok(grad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_quadratic() {
        // f(u) = (u0 - 0.2)^2 + 3 u1
        let f = |u: &DVector<f64>| (u[0] - 0.2).powi(2) + 3.0 * u[1];
        let u = DVector::from_vec(vec![0.5, 0.5]);
        let g = bounded_forward_gradient(&u, f(&u), f, 1e-7).unwrap();
        assert!((g[0] - 0.6).abs() < 1e-5);
        assert!((g[1] - 3.0).abs() < 1e-5);
    }

    #[test]
    fn steps_backward_at_upper_face() {
        let f = |u: &DVector<f64>| if u[0] > 1.0 { f64::NAN } else { 2.0 * u[0] };
        let u = DVector::from_vec(vec![1.0]);
        let g = bounded_forward_gradient(&u, f(&u), f, 1e-7).unwrap();
        assert!((g[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn non_finite_cost_is_reported() {
        let f = |u: &DVector<f64>| if u[0] > 0.5 { f64::NAN } else { u[0] };
        let u = DVector::from_vec(vec![0.5]);
        assert!(bounded_forward_gradient(&u, 0.5, f, 1e-3).is_err());
    }
}
