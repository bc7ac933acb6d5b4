//! Float helpers: quadrature, order statistics and residual norms.

/// Floating point type used throughout system
pub type Real = f64;

/// Cumulative trapezoidal integral of `y` over `x`, starting at zero.
///
/// The output has the same length as the inputs; `out[0] == 0`.
pub fn cumulative_trapezoid(y: &[Real], x: &[Real]) -> Vec<Real> {
    let n = y.len().min(x.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    let mut acc = 0.0;
    out.push(acc);
    for k in 1..n {
        acc += 0.5 * (y[k] + y[k - 1]) * (x[k] - x[k - 1]);
        out.push(acc);
    }
    out
}

/// Percentile with linear interpolation between closest ranks (`q` in 0..=100).
///
/// Returns `None` for an empty slice.
pub fn percentile(values: &[Real], q: Real) -> Option<Real> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as Real;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as Real;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median(values: &[Real]) -> Option<Real> {
    percentile(values, 50.0)
}

/// Root-mean-square difference of two equal-length slices.
///
/// Extra trailing elements of the longer slice are ignored; empty input gives NaN.
pub fn rmse(a: &[Real], b: &[Real]) -> Real {
    let n = a.len().min(b.len());
    if n == 0 {
        return Real::NAN;
    }
    let sum_sq: Real = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum_sq / n as Real).sqrt()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn percentile_is_monotone_and_within_range(
            v in prop::collection::vec(-50.0_f64..50.0, 1..64),
            p in 0.0_f64..100.0,
            q in 0.0_f64..100.0,
        ) {
            let (lo_p, hi_p) = if p <= q { (p, q) } else { (q, p) };
            let a = percentile(&v, lo_p).unwrap();
            let b = percentile(&v, hi_p).unwrap();
            let min = v.iter().copied().fold(f64::INFINITY, f64::min);
            let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(a <= b + 1e-9);
            prop_assert!(a >= min - 1e-9 && b <= max + 1e-9);
        }
    }
}
