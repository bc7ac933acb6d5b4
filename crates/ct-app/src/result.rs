//! Identification results and their flat tabular export.

use ct_core::TimeSeries;
use ct_sim::{EcmParameters, ReferenceCurve, StateTrace, ThermalParameters};
use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;
use crate::predict::KnownParameters;

/// Parameters found by one run, together with the known inputs they depend on.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifiedParameters {
    Electrical {
        params: EcmParameters,
        nominal_capacity_ah: f64,
        reference: ReferenceCurve,
        discharge_deadband_a: f64,
    },
    Thermal {
        params: ThermalParameters,
        r_ohm: f64,
        ambient_c: f64,
        capacitance_fixed: bool,
    },
}

impl IdentifiedParameters {
    pub fn model(&self) -> &'static str {
        match self {
            Self::Electrical { .. } => "ecm",
            Self::Thermal { .. } => "thermal",
        }
    }

    pub fn derived(&self) -> DerivedQuantities {
        match self {
            Self::Electrical { params, .. } => DerivedQuantities {
                tau_s: Some(params.tau()),
                thermal_time_constant_s: None,
            },
            Self::Thermal { params, .. } => DerivedQuantities {
                tau_s: None,
                thermal_time_constant_s: Some(params.time_constant()),
            },
        }
    }

    pub fn known(&self) -> KnownParameters {
        match self {
            Self::Electrical {
                params,
                nominal_capacity_ah,
                reference,
                discharge_deadband_a,
            } => KnownParameters::Electrical {
                r0_ohm: params.r0,
                r1_ohm: params.r1,
                c1_f: params.c1,
                nominal_capacity_ah: *nominal_capacity_ah,
                reference: reference.coefficients().to_vec(),
                discharge_deadband_a: *discharge_deadband_a,
            },
            Self::Thermal {
                params,
                r_ohm,
                ambient_c,
                ..
            } => KnownParameters::Thermal {
                ha_w_per_k: params.ha,
                c_th_j_per_k: params.c_th,
                r_ohm: *r_ohm,
                ambient_c: Some(*ambient_c),
            },
        }
    }
}

/// Quantities computed from the identified parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedQuantities {
    /// Polarization time constant R1·C1 (s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tau_s: Option<f64>,
    /// Thermal time constant C_th / hA (s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thermal_time_constant_s: Option<f64>,
}

/// How the optimizer got to the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub global_cost: f64,
    pub final_cost: f64,
    pub generations: usize,
    pub local_iterations: usize,
    pub local_converged: bool,
    pub evaluations: usize,
    /// Cost evaluations whose simulation hit at least one numeric guard
    pub guarded_evaluations: usize,
    /// Guard activations in the final simulation
    pub final_guard_hits: usize,
}

/// Outcome of a full identification run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResult {
    parameters: IdentifiedParameters,
    series: TimeSeries,
    state: StateTrace,
    predicted: Vec<f64>,
    metrics: Metrics,
    diagnostics: FitDiagnostics,
}

impl CalibrationResult {
    pub(crate) fn new(
        parameters: IdentifiedParameters,
        series: TimeSeries,
        state: StateTrace,
        predicted: Vec<f64>,
        metrics: Metrics,
        diagnostics: FitDiagnostics,
    ) -> Self {
        Self {
            parameters,
            series,
            state,
            predicted,
            metrics,
            diagnostics,
        }
    }

    pub fn parameters(&self) -> &IdentifiedParameters {
        &self.parameters
    }

    pub fn ecm_parameters(&self) -> Option<&EcmParameters> {
        match &self.parameters {
            IdentifiedParameters::Electrical { params, .. } => Some(params),
            IdentifiedParameters::Thermal { .. } => None,
        }
    }

    pub fn thermal_parameters(&self) -> Option<&ThermalParameters> {
        match &self.parameters {
            IdentifiedParameters::Thermal { params, .. } => Some(params),
            IdentifiedParameters::Electrical { .. } => None,
        }
    }

    /// Per-cell open-circuit-voltage curve the electrical fit ran against.
    pub fn reference(&self) -> Option<&ReferenceCurve> {
        match &self.parameters {
            IdentifiedParameters::Electrical { reference, .. } => Some(reference),
            IdentifiedParameters::Thermal { .. } => None,
        }
    }

    /// Cleaned record the parameters were fitted to.
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

    /// Measured minus predicted, per sample.
    pub fn residuals(&self) -> Vec<f64> {
        self.measured()
            .iter()
            .zip(&self.predicted)
            .map(|(m, p)| m - p)
            .collect()
    }

    pub fn state(&self) -> &StateTrace {
        &self.state
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn diagnostics(&self) -> &FitDiagnostics {
        &self.diagnostics
    }

    /// Inputs for [`crate::predict`] that reproduce [`Self::predicted`].
    pub fn known_parameters(&self) -> KnownParameters {
        self.parameters.known()
    }

    /// One record per time sample.
    pub fn samples(&self) -> Vec<SampleRecord> {
        let secondary = self.series.secondary();
        (0..self.series.len())
            .map(|k| {
                let measured = self.series.output()[k];
                let predicted = self.predicted[k];
                SampleRecord {
                    time_s: self.series.time()[k],
                    current_a: self.series.current()[k],
                    measured,
                    predicted,
                    error: measured - predicted,
                    state: self.state.at(k),
                    temperature_c: secondary.map(|t| t[k]),
                }
            })
            .collect()
    }

    pub fn summary(&self) -> SummaryRecord {
        SummaryRecord {
            model: self.parameters.model().to_string(),
            output: self.series.kind().column().to_string(),
            unit: self.series.kind().unit().to_string(),
            parameters: self.known_parameters(),
            derived: self.parameters.derived(),
            metrics: self.metrics,
            diagnostics: self.diagnostics,
            samples: self.series.len(),
        }
    }
}

/// Flat per-sample row. `state` is state of charge for the electrical model
/// and the ambient temperature for the thermal model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    pub time_s: f64,
    pub current_a: f64,
    pub measured: f64,
    pub predicted: f64,
    pub error: f64,
    pub state: f64,
    /// Cell temperature carried through from an electrical record
    pub temperature_c: Option<f64>,
}

/// Single summary row for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub model: String,
    /// Name of the fitted output column
    pub output: String,
    pub unit: String,
    pub parameters: KnownParameters,
    pub derived: DerivedQuantities,
    pub metrics: Metrics,
    pub diagnostics: FitDiagnostics,
    pub samples: usize,
}
