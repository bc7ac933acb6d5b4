//! Forward simulation of already identified parameters on a held-out record.
//!
//! No fitting happens here: the record is cleaned the same way identification
//! cleans it, the state is re-derived, and the simulator runs once.

use ct_core::constants::SECONDS_PER_HOUR;
use ct_core::{
    DISCHARGE_DEADBAND_A, Table, TimeSeries, preprocess_electrical_with_deadband,
    preprocess_thermal,
};
use ct_sim::{
    EcmParameters, GuardHits, ReferenceCurve, StateTrace, ThermalConditions, ThermalParameters,
    coulomb_count, estimate_ambient, simulate_ecm, simulate_thermal,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{IdentifyError, IdentifyResult};
use crate::metrics::{Metrics, compute_metrics};

fn default_deadband() -> f64 {
    DISCHARGE_DEADBAND_A
}

/// Everything needed to re-simulate a record: identified parameters plus the
/// known state they were identified against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum KnownParameters {
    #[serde(rename = "ecm")]
    Electrical {
        r0_ohm: f64,
        r1_ohm: f64,
        c1_f: f64,
        nominal_capacity_ah: f64,
        /// Open-circuit-voltage polynomial, highest power first
        reference: Vec<f64>,
        #[serde(default = "default_deadband")]
        discharge_deadband_a: f64,
    },
    Thermal {
        ha_w_per_k: f64,
        c_th_j_per_k: f64,
        r_ohm: f64,
        /// Estimated from the record when unset
        #[serde(default)]
        ambient_c: Option<f64>,
    },
}

impl KnownParameters {
    pub fn model(&self) -> &'static str {
        match self {
            Self::Electrical { .. } => "ecm",
            Self::Thermal { .. } => "thermal",
        }
    }
}

/// Output of [`predict`].
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedSeries {
    series: TimeSeries,
    state: StateTrace,
    predicted: Vec<f64>,
    guards: GuardHits,
    metrics: Metrics,
}

impl PredictedSeries {
    /// Cleaned record the prediction was made on.
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn time(&self) -> &[f64] {
        self.series.time()
    }

    pub fn measured(&self) -> &[f64] {
        self.series.output()
    }

    pub fn predicted(&self) -> &[f64] {
        &self.predicted
    }

    pub fn state(&self) -> &StateTrace {
        &self.state
    }

    pub fn guards(&self) -> GuardHits {
        self.guards
    }

    /// Fit of the prediction against the record's own measurement.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Simulate `table` with `known` parameters.
///
/// Deterministic: identical inputs give bit-identical output.
pub fn predict(table: &Table, known: &KnownParameters) -> IdentifyResult<PredictedSeries> {
    let (series, state, simulation) = match known {
        KnownParameters::Electrical {
            r0_ohm,
            r1_ohm,
            c1_f,
            nominal_capacity_ah,
            reference,
            discharge_deadband_a,
        } => {
            let series = preprocess_electrical_with_deadband(table, *discharge_deadband_a)?;
            let curve = ReferenceCurve::from_coefficients(reference.clone())?;
            let soc = coulomb_count(
                series.time(),
                series.current(),
                nominal_capacity_ah * SECONDS_PER_HOUR,
            )?;
            let params = EcmParameters::new(*r0_ohm, *r1_ohm, *c1_f);
            let sim = simulate_ecm(series.time(), series.current(), &soc, &curve, &params)?;
            (series, StateTrace::StateOfCharge(soc), sim)
        }
        KnownParameters::Thermal {
            ha_w_per_k,
            c_th_j_per_k,
            r_ohm,
            ambient_c,
        } => {
            if !(r_ohm.is_finite() && *r_ohm >= 0.0) {
                return Err(IdentifyError::InvalidInput(format!(
                    "internal resistance must be finite and non-negative, got {r_ohm}"
                )));
            }
            let series = preprocess_thermal(table)?;
            let ambient = match ambient_c {
                Some(t) => *t,
                None => estimate_ambient(series.output())?,
            };
            let conditions = ThermalConditions {
                r_ohm: *r_ohm,
                ambient_c: ambient,
            };
            let params = ThermalParameters::new(*ha_w_per_k, *c_th_j_per_k);
            let sim = simulate_thermal(
                series.time(),
                series.current(),
                series.output()[0],
                &params,
                &conditions,
            )?;
            (series, StateTrace::Ambient(ambient), sim)
        }
    };

    simulation.guards.report(known.model());
    let metrics = compute_metrics(series.output(), &simulation.output)?;
    info!(
        model = known.model(),
        samples = series.len(),
        rmse = metrics.rmse,
        "prediction complete"
    );

    Ok(PredictedSeries {
        series,
        state,
        predicted: simulation.output,
        guards: simulation.guards,
        metrics,
    })
}
