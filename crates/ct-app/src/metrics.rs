//! Goodness-of-fit metrics between a measured and a predicted output.

use serde::{Deserialize, Serialize};

use crate::error::{IdentifyError, IdentifyResult};

/// Smallest |measured| used as a percentage-error denominator, in the output's
/// own unit.
pub const MAPE_FLOOR: f64 = 0.1;

/// Total sum of squares at or below which R² is undefined.
pub const SS_TOT_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub rmse: f64,
    pub mae: f64,
    /// NaN for a constant measured signal
    pub r2: f64,
    pub max_abs_error: f64,
    pub mape_pct: f64,
}

/// Compare two equal-length, non-empty sequences.
pub fn compute_metrics(measured: &[f64], predicted: &[f64]) -> IdentifyResult<Metrics> {
    if measured.len() != predicted.len() {
        return Err(IdentifyError::InvalidInput(format!(
            "metrics need equal lengths, got {} measured and {} predicted",
            measured.len(),
            predicted.len()
        )));
    }
    if measured.is_empty() {
        return Err(IdentifyError::InvalidInput(
            "metrics need at least one sample".to_string(),
        ));
    }

    let n = measured.len() as f64;
    let mean = measured.iter().sum::<f64>() / n;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    let mut abs_sum = 0.0;
    let mut max_abs = 0.0_f64;
    let mut pct_sum = 0.0;
    for (&m, &p) in measured.iter().zip(predicted) {
        let err = m - p;
        ss_res += err * err;
        ss_tot += (m - mean) * (m - mean);
        abs_sum += err.abs();
        max_abs = max_abs.max(err.abs());
        pct_sum += (err / m.abs().max(MAPE_FLOOR)).abs();
    }

    let r2 = if ss_tot > SS_TOT_EPS {
        1.0 - ss_res / ss_tot
    } else {
        f64::NAN
    };

    Ok(Metrics {
        rmse: (ss_res / n).sqrt(),
        mae: abs_sum / n,
        r2,
        max_abs_error: max_abs,
        mape_pct: pct_sum / n * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction() {
        let y = [3.9, 3.8, 3.75, 3.6, 3.4];
        let m = compute_metrics(&y, &y).unwrap();
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.max_abs_error, 0.0);
        assert_eq!(m.mape_pct, 0.0);
        assert!((m.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_measured_gives_nan_r2() {
        let m = compute_metrics(&[25.0; 4], &[25.0, 25.5, 24.5, 25.0]).unwrap();
        assert!(m.r2.is_nan());
        assert!((m.max_abs_error - 0.5).abs() < 1e-12);
        assert!((m.mae - 0.25).abs() < 1e-12);
    }

    #[test]
    fn known_values() {
        let m = compute_metrics(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 5.0]).unwrap();
        assert!((m.rmse - 0.5).abs() < 1e-12);
        assert!((m.mae - 0.25).abs() < 1e-12);
        assert!((m.max_abs_error - 1.0).abs() < 1e-12);
        // SS_res = 1, SS_tot = 5
        assert!((m.r2 - 0.8).abs() < 1e-12);
        assert!((m.mape_pct - 6.25).abs() < 1e-9);
    }

    #[test]
    fn mape_denominator_is_floored() {
        // |measured| = 0.01 < 0.1, so the error is divided by 0.1
        let m = compute_metrics(&[0.01, -0.01], &[0.02, -0.02]).unwrap();
        assert!((m.mape_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(matches!(
            compute_metrics(&[1.0, 2.0], &[1.0]),
            Err(IdentifyError::InvalidInput(_))
        ));
        assert!(compute_metrics(&[], &[]).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn identical_series_fit_perfectly(
            y in prop::collection::vec(-5.0f64..5.0, 2..64),
        ) {
            let m = compute_metrics(&y, &y).unwrap();
            prop_assert_eq!(m.rmse, 0.0);
            prop_assert_eq!(m.mae, 0.0);
            prop_assert!(m.r2.is_nan() || (m.r2 - 1.0).abs() < 1e-12);
        }

        #[test]
        fn rmse_bounds_mae(
            pairs in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0), 1..64),
        ) {
            let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            let m = compute_metrics(&a, &b).unwrap();
            prop_assert!(m.mae <= m.rmse + 1e-12);
            prop_assert!(m.rmse <= m.max_abs_error + 1e-12);
        }
    }
}
