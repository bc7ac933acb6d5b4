//! Thermal identification: preprocess, estimate ambient, fit `hA` (and
//! optionally `C_th`), score.

use ct_core::{HeatCapacity, Resistance, Table, joules_per_kelvin, ohms, preprocess_thermal};
use ct_sim::{StateTrace, ThermalConditions, ThermalModel, estimate_ambient};
use tracing::info;

use crate::config::ThermalConfig;
use crate::error::{IdentifyError, IdentifyResult};
use crate::fit::fit_model;
use crate::metrics::compute_metrics;
use crate::result::{CalibrationResult, IdentifiedParameters};

/// Heat capacity of an 18650 cell, about 46 g at 1350 J/(kg·K).
pub const DEFAULT_THERMAL_CAPACITANCE: f64 = 62.1;

/// Internal resistance assumed when no electrical fit is available (Ω).
pub const DEFAULT_INTERNAL_RESISTANCE: f64 = 0.08;

/// Identify the thermal parameters with the default configuration.
///
/// With `fixed_capacitance` only `hA` is free; otherwise `C_th` is fitted too.
pub fn identify_thermal(
    table: &Table,
    internal_resistance: Resistance,
    fixed_capacitance: Option<HeatCapacity>,
) -> IdentifyResult<CalibrationResult> {
    identify_thermal_with_config(
        table,
        internal_resistance,
        fixed_capacitance,
        &ThermalConfig::default(),
    )
}

pub fn identify_thermal_with_config(
    table: &Table,
    internal_resistance: Resistance,
    fixed_capacitance: Option<HeatCapacity>,
    config: &ThermalConfig,
) -> IdentifyResult<CalibrationResult> {
    let r_ohm = ohms(internal_resistance);
    if !(r_ohm.is_finite() && r_ohm >= 0.0) {
        return Err(IdentifyError::InvalidInput(format!(
            "internal resistance must be finite and non-negative, got {r_ohm}"
        )));
    }
    let fixed_c_th = fixed_capacitance.map(joules_per_kelvin);
    if let Some(c_th) = fixed_c_th {
        if !(c_th.is_finite() && c_th > 0.0) {
            return Err(IdentifyError::InvalidInput(format!(
                "fixed thermal capacitance must be positive, got {c_th} J/K"
            )));
        }
    }

    let series = preprocess_thermal(table)?;
    let ambient_c = match config.ambient_c {
        Some(t) => t,
        None => estimate_ambient(series.output())?,
    };
    info!(samples = series.len(), ambient_c, "thermal record preprocessed");

    let conditions = ThermalConditions { r_ohm, ambient_c };
    let model = ThermalModel::new(&series, conditions, fixed_c_th)?;
    let bounds = config.bounds.to_bounds(fixed_c_th.is_some())?;
    let fit = fit_model(&model, &bounds, &config.identify)?;
    let params = model.parameters(&fit.x)?;

    let metrics = compute_metrics(series.output(), &fit.simulation.output)?;
    info!(
        ha = params.ha,
        c_th = params.c_th,
        rmse_c = metrics.rmse,
        "thermal identification complete"
    );

    let parameters = IdentifiedParameters::Thermal {
        params,
        r_ohm,
        ambient_c,
        capacitance_fixed: fixed_c_th.is_some(),
    };
    Ok(CalibrationResult::new(
        parameters,
        series,
        StateTrace::Ambient(ambient_c),
        fit.simulation.output,
        metrics,
        fit.diagnostics,
    ))
}
