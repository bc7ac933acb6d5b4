//! Electrical identification: preprocess, count charge, calibrate the
//! open-circuit-voltage curve, fit `[R0, R1, C1]`, score.

use ct_core::constants::SECONDS_PER_HOUR;
use ct_core::{Charge, Table, TimeSeries, amp_hours, median, preprocess_electrical_with_deadband};
use ct_sim::reference::REFERENCE_DEGREE;
use ct_sim::{EcmModel, EcmParameters, ReferenceCurve, StateTrace, coulomb_count};
use tracing::{debug, info};

use crate::config::{ElectricalConfig, ReferencePolicy};
use crate::error::{IdentifyError, IdentifyResult};
use crate::fit::fit_model;
use crate::metrics::compute_metrics;
use crate::result::{CalibrationResult, IdentifiedParameters};

/// Leading samples inspected for the coarse resistance estimate.
pub const COARSE_WINDOW: usize = 6;
/// Current steps at or below this are too small to resolve a resistance (A).
pub const COARSE_CURRENT_FLOOR_A: f64 = 0.05;
pub const COARSE_R0_MIN: f64 = 0.01;
pub const COARSE_R0_MAX: f64 = 0.30;
pub const COARSE_R0_FALLBACK: f64 = 0.10;

/// Coarse ohmic resistance from the first few voltage/current steps.
///
/// Median of |ΔV|/|ΔI| over steps with |ΔI| above the floor, clamped into
/// `[COARSE_R0_MIN, COARSE_R0_MAX]`.
pub fn coarse_resistance(current: &[f64], voltage: &[f64]) -> f64 {
    let n = current.len().min(voltage.len()).min(COARSE_WINDOW);
    let ratios: Vec<f64> = (1..n)
        .filter_map(|k| {
            let di = (current[k] - current[k - 1]).abs();
            (di > COARSE_CURRENT_FLOOR_A).then(|| (voltage[k] - voltage[k - 1]).abs() / di)
        })
        .collect();
    median(&ratios)
        .unwrap_or(COARSE_R0_FALLBACK)
        .clamp(COARSE_R0_MIN, COARSE_R0_MAX)
}

/// One cell's electrical identification.
///
/// Owns the reference curve: it starts from the template (or the configured
/// fixed curve) and is re-fitted per record, never shared between sessions.
#[derive(Debug, Clone)]
pub struct ElectricalSession {
    config: ElectricalConfig,
    reference: ReferenceCurve,
}

impl ElectricalSession {
    pub fn new(config: ElectricalConfig) -> IdentifyResult<Self> {
        let reference = match &config.reference {
            ReferencePolicy::Calibrate => ReferenceCurve::template()?,
            ReferencePolicy::Fixed { coefficients } => {
                ReferenceCurve::from_coefficients(coefficients.clone())?
            }
        };
        Ok(Self { config, reference })
    }

    pub fn config(&self) -> &ElectricalConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceCurve {
        &self.reference
    }

    /// Re-fit the reference curve to `series`, returning the coarse resistance
    /// used to strip the ohmic drop.
    pub fn calibrate_reference(&mut self, series: &TimeSeries, soc: &[f64]) -> IdentifyResult<f64> {
        let r0 = coarse_resistance(series.current(), series.output());
        let ocv: Vec<f64> = series
            .output()
            .iter()
            .zip(series.current())
            .map(|(v, i)| v - i * r0)
            .collect();
        self.reference = ReferenceCurve::fit(soc, &ocv, REFERENCE_DEGREE)?;
        debug!(coarse_r0 = r0, "reference curve calibrated");
        Ok(r0)
    }

    /// Full pipeline on one discharge record.
    pub fn identify(&mut self, table: &Table, capacity: Charge) -> IdentifyResult<CalibrationResult> {
        let capacity_ah = amp_hours(capacity);
        if !(capacity_ah.is_finite() && capacity_ah > 0.0) {
            return Err(IdentifyError::InvalidInput(format!(
                "nominal capacity must be positive, got {capacity_ah} Ah"
            )));
        }

        let series = preprocess_electrical_with_deadband(table, self.config.discharge_deadband_a)?;
        info!(samples = series.len(), "electrical record preprocessed");

        let soc = coulomb_count(
            series.time(),
            series.current(),
            capacity_ah * SECONDS_PER_HOUR,
        )?;
        if self.config.reference == ReferencePolicy::Calibrate {
            self.calibrate_reference(&series, &soc)?;
        }

        let model = EcmModel::new(&series, &soc, &self.reference)?;
        let bounds = self.config.bounds.to_bounds()?;
        let fit = fit_model(&model, &bounds, &self.config.identify)?;
        let params = EcmParameters::from_slice(&fit.x)?;

        let metrics = compute_metrics(series.output(), &fit.simulation.output)?;
        info!(
            r0 = params.r0,
            r1 = params.r1,
            c1 = params.c1,
            rmse_v = metrics.rmse,
            "electrical identification complete"
        );

        let parameters = IdentifiedParameters::Electrical {
            params,
            nominal_capacity_ah: capacity_ah,
            reference: self.reference.clone(),
            discharge_deadband_a: self.config.discharge_deadband_a,
        };
        Ok(CalibrationResult::new(
            parameters,
            series,
            StateTrace::StateOfCharge(soc),
            fit.simulation.output,
            metrics,
            fit.diagnostics,
        ))
    }
}

/// Identify `[R0, R1, C1]` with the default configuration.
pub fn identify_electrical(table: &Table, capacity: Charge) -> IdentifyResult<CalibrationResult> {
    identify_electrical_with_config(table, capacity, &ElectricalConfig::default())
}

pub fn identify_electrical_with_config(
    table: &Table,
    capacity: Charge,
    config: &ElectricalConfig,
) -> IdentifyResult<CalibrationResult> {
    ElectricalSession::new(config.clone())?.identify(table, capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_core::{OutputKind, ah, columns};

    #[test]
    fn coarse_resistance_takes_median_step_ratio() {
        let current = [-1.0, -2.0, -2.0, -1.0, -3.0, -3.0, -10.0];
        // steps with |dI| > 0.05: k=1 (0.05 V/1 A), k=3 (0.06/1), k=4 (0.14/2)
        let voltage = [3.90, 3.85, 3.85, 3.91, 3.77, 3.77, 0.0];
        let r = coarse_resistance(&current, &voltage);
        assert!((r - 0.06).abs() < 1e-9, "{r}");
    }

    #[test]
    fn coarse_resistance_falls_back_and_clamps() {
        assert_eq!(coarse_resistance(&[-1.0; 6], &[3.7; 6]), COARSE_R0_FALLBACK);
        assert_eq!(
            coarse_resistance(&[-1.0, -2.0], &[3.7, 2.7]),
            COARSE_R0_MAX
        );
        assert_eq!(
            coarse_resistance(&[-1.0, -2.0], &[3.7, 3.7]),
            COARSE_R0_MIN
        );
    }

    #[test]
    fn new_session_starts_from_template() {
        let session = ElectricalSession::new(ElectricalConfig::default()).unwrap();
        assert_eq!(session.reference(), &ReferenceCurve::template().unwrap());
    }

    #[test]
    fn fixed_policy_keeps_curve() {
        let config = ElectricalConfig {
            reference: ReferencePolicy::fixed(&ReferenceCurve::flat(3.7)),
            ..ElectricalConfig::default()
        };
        let session = ElectricalSession::new(config).unwrap();
        assert_eq!(session.reference().ocv(0.3), 3.7);
    }

    #[test]
    fn calibration_removes_ohmic_drop() {
        // OCV linear in SOC, measured under a current step with R0 = 0.05;
        // SOC is held over the step so the voltage jump is purely ohmic
        let n: usize = 30;
        let time: Vec<f64> = (0..n).map(|k| k as f64 * 60.0).collect();
        let current: Vec<f64> = (0..n).map(|k| if k < 3 { -0.5 } else { -1.5 }).collect();
        let soc: Vec<f64> = (0..n)
            .map(|k| 1.0 - k.saturating_sub(3) as f64 / 100.0)
            .collect();
        let voltage: Vec<f64> = (0..n)
            .map(|k| 3.2 + 0.9 * soc[k] + 0.05 * current[k])
            .collect();
        let series =
            TimeSeries::new(OutputKind::Voltage, time, current, voltage, None).unwrap();

        let mut session = ElectricalSession::new(ElectricalConfig::default()).unwrap();
        let r0 = session.calibrate_reference(&series, &soc).unwrap();
        assert!((r0 - 0.05).abs() < 1e-9);
        for &s in &[0.75, 0.85, 0.95] {
            let expected = 3.2 + 0.9 * s;
            assert!((session.reference().ocv(s) - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn non_positive_capacity_rejected() {
        let table = Table::new()
            .with_column(columns::TIME, vec![0.0])
            .unwrap();
        let err = identify_electrical(&table, ah(0.0)).unwrap_err();
        assert!(matches!(err, IdentifyError::InvalidInput(_)));
    }
}
