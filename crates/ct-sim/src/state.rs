//! Estimation of quantities the cell does not report directly.

use ct_core::{cumulative_trapezoid, percentile};

use crate::error::{SimError, SimResult, check_len};

/// Percentile of the measured temperature taken as the ambient estimate.
pub const AMBIENT_PERCENTILE: f64 = 5.0;

/// Unobserved state derived for one identification run.
#[derive(Debug, Clone, PartialEq)]
pub enum StateTrace {
    /// Per-sample state-of-charge fraction in [0, 1].
    StateOfCharge(Vec<f64>),
    /// Ambient temperature (°C), one value for the whole record.
    Ambient(f64),
}

impl StateTrace {
    /// State value reported alongside sample `k`.
    pub fn at(&self, k: usize) -> f64 {
        match self {
            Self::StateOfCharge(soc) => soc.get(k).copied().unwrap_or(f64::NAN),
            Self::Ambient(t) => *t,
        }
    }

    pub fn state_of_charge(&self) -> Option<&[f64]> {
        match self {
            Self::StateOfCharge(soc) => Some(soc),
            Self::Ambient(_) => None,
        }
    }

    pub fn ambient(&self) -> Option<f64> {
        match self {
            Self::StateOfCharge(_) => None,
            Self::Ambient(t) => Some(*t),
        }
    }
}

/// Coulomb counting: SOC = clamp(1 - ∫|I|dt / Q, 0, 1), starting at 1.
///
/// `capacity_c` is the nominal capacity in coulombs.
pub fn coulomb_count(time: &[f64], current: &[f64], capacity_c: f64) -> SimResult<Vec<f64>> {
    check_len("coulomb counting current", time.len(), current.len())?;
    if !(capacity_c.is_finite() && capacity_c > 0.0) {
        return Err(SimError::InvalidArg {
            what: "nominal capacity must be positive and finite",
        });
    }

    let magnitude: Vec<f64> = current.iter().map(|i| i.abs()).collect();
    let charge_out = cumulative_trapezoid(&magnitude, time);
    Ok(charge_out
        .into_iter()
        .map(|q| (1.0 - q / capacity_c).clamp(0.0, 1.0))
        .collect())
}

/// Robust ambient temperature: the low percentile of the measured signal,
/// which tracks the resting temperature without chasing sensor spikes.
pub fn estimate_ambient(temperatures: &[f64]) -> SimResult<f64> {
    percentile(temperatures, AMBIENT_PERCENTILE).ok_or(SimError::InvalidArg {
        what: "cannot estimate ambient from an empty series",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_discharge_depletes_linearly() {
        let time: Vec<f64> = (0..=3600).step_by(600).map(|t| t as f64).collect();
        let current = vec![-1.0; time.len()];
        // 2 Ah = 7200 C; one hour at 1 A removes half
        let soc = coulomb_count(&time, &current, 7200.0).unwrap();
        assert_eq!(soc[0], 1.0);
        assert!((soc.last().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn soc_saturates_at_zero() {
        let time = vec![0.0, 3600.0, 7200.0];
        let current = vec![-2.0; 3];
        let soc = coulomb_count(&time, &current, 3600.0).unwrap();
        assert_eq!(soc, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(coulomb_count(&[0.0], &[-1.0], 0.0).is_err());
    }

    #[test]
    fn ambient_ignores_heating_tail() {
        let mut temps = vec![25.0; 20];
        temps.extend((0..80).map(|i| 25.0 + i as f64 * 0.1));
        assert_eq!(estimate_ambient(&temps).unwrap(), 25.0);
        assert!(estimate_ambient(&[]).is_err());
    }

    #[test]
    fn trace_accessors() {
        let soc = StateTrace::StateOfCharge(vec![1.0, 0.9]);
        assert_eq!(soc.at(1), 0.9);
        assert!(soc.at(5).is_nan());
        assert_eq!(soc.ambient(), None);
        let amb = StateTrace::Ambient(24.5);
        assert_eq!(amb.at(100), 24.5);
        assert_eq!(amb.state_of_charge(), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn soc_is_bounded_and_non_increasing(
            steps in prop::collection::vec((0.0_f64..30.0, -5.0_f64..-0.1), 2..200),
            capacity_ah in 0.1_f64..5.0,
        ) {
            let mut t = 0.0;
            let mut time = Vec::with_capacity(steps.len());
            let mut current = Vec::with_capacity(steps.len());
            for (dt, i) in steps {
                t += dt;
                time.push(t);
                current.push(i);
            }
            let soc = coulomb_count(&time, &current, capacity_ah * 3600.0).unwrap();
            prop_assert_eq!(soc[0], 1.0);
            prop_assert!(soc.iter().all(|s| (0.0..=1.0).contains(s)));
            prop_assert!(soc.windows(2).all(|w| w[1] <= w[0]));
        }
    }
}
