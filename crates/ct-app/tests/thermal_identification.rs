//! Integration test: thermal identification end to end on a synthetic
//! rest-then-heat record.

use ct_app::{
    DEFAULT_INTERNAL_RESISTANCE, DEFAULT_THERMAL_CAPACITANCE, IdentifyError, KnownParameters,
    ThermalConfig, identify_thermal, identify_thermal_with_config, predict,
};
use ct_core::{Table, columns, j_per_k, ohm};
use ct_sim::{ThermalConditions, ThermalParameters, simulate_thermal};

const AMBIENT_C: f64 = 25.0;
const TRUE_HA: f64 = 0.05;

/// 600 s at rest, then 3600 s at 2 A, sampled every 10 s.
fn heating_record() -> Table {
    synthetic_record(600.0)
}

/// `rest_s` seconds at rest followed by 3600 s at 2 A, sampled every 10 s.
fn synthetic_record(rest_s: f64) -> Table {
    let dt = 10.0;
    let n = ((rest_s + 3600.0) / dt) as usize + 1;
    let time: Vec<f64> = (0..n).map(|k| k as f64 * dt).collect();
    let current: Vec<f64> = time
        .iter()
        .map(|&t| if t < rest_s { 0.0 } else { 2.0 })
        .collect();
    let conditions = ThermalConditions {
        r_ohm: DEFAULT_INTERNAL_RESISTANCE,
        ambient_c: AMBIENT_C,
    };
    let truth = ThermalParameters::new(TRUE_HA, DEFAULT_THERMAL_CAPACITANCE);
    let temperature = simulate_thermal(&time, &current, AMBIENT_C, &truth, &conditions)
        .unwrap()
        .output;

    Table::new()
        .with_column(columns::TIME, time)
        .unwrap()
        .with_column(columns::CURRENT, current)
        .unwrap()
        .with_column(columns::TEMPERATURE, temperature)
        .unwrap()
}

#[test]
fn recovers_heat_transfer_with_fixed_capacitance() {
    let table = heating_record();
    let result = identify_thermal(
        &table,
        ohm(DEFAULT_INTERNAL_RESISTANCE),
        Some(j_per_k(DEFAULT_THERMAL_CAPACITANCE)),
    )
    .unwrap();

    assert_eq!(result.state().ambient(), Some(AMBIENT_C));
    let found = result.thermal_parameters().unwrap();
    assert_eq!(found.c_th, DEFAULT_THERMAL_CAPACITANCE);
    assert!(
        ((found.ha - TRUE_HA) / TRUE_HA).abs() <= 0.10,
        "hA = {}",
        found.ha
    );
    assert!(result.metrics().rmse < 0.1, "RMSE = {}", result.metrics().rmse);
    assert!(result.predicted().iter().all(|t| t.is_finite()));
}

#[test]
fn constant_current_record_needs_known_ambient() {
    // Heating from t = 0 never rests, so the 5th percentile sits above ambient.
    let table = synthetic_record(0.0);
    let config = ThermalConfig {
        ambient_c: Some(AMBIENT_C),
        ..ThermalConfig::default()
    };
    let result = identify_thermal_with_config(
        &table,
        ohm(DEFAULT_INTERNAL_RESISTANCE),
        Some(j_per_k(DEFAULT_THERMAL_CAPACITANCE)),
        &config,
    )
    .unwrap();

    assert_eq!(result.state().ambient(), Some(AMBIENT_C));
    let found = result.thermal_parameters().unwrap();
    assert!(
        ((found.ha - TRUE_HA) / TRUE_HA).abs() <= 0.10,
        "hA = {}",
        found.ha
    );
    assert!(result.metrics().rmse < 0.1, "RMSE = {}", result.metrics().rmse);
}

#[test]
fn free_capacitance_is_identified_too() {
    let table = heating_record();
    let result = identify_thermal(&table, ohm(DEFAULT_INTERNAL_RESISTANCE), None).unwrap();
    let found = result.thermal_parameters().unwrap();

    assert!(((found.ha - TRUE_HA) / TRUE_HA).abs() <= 0.10, "hA = {}", found.ha);
    assert!(
        ((found.c_th - DEFAULT_THERMAL_CAPACITANCE) / DEFAULT_THERMAL_CAPACITANCE).abs() <= 0.10,
        "C_th = {}",
        found.c_th
    );
    let tau = result.summary().derived.thermal_time_constant_s.unwrap();
    assert!((tau - found.c_th / found.ha).abs() < 1e-9);
}

#[test]
fn result_round_trips_through_predict() {
    let table = heating_record();
    let result = identify_thermal(
        &table,
        ohm(DEFAULT_INTERNAL_RESISTANCE),
        Some(j_per_k(DEFAULT_THERMAL_CAPACITANCE)),
    )
    .unwrap();

    let known = result.known_parameters();
    assert!(matches!(
        known,
        KnownParameters::Thermal {
            ambient_c: Some(a),
            ..
        } if a == AMBIENT_C
    ));
    let replay = predict(&table, &known).unwrap();
    assert_eq!(replay.predicted(), result.predicted());
}

#[test]
fn summary_serializes_with_parameters() {
    let table = heating_record();
    let result = identify_thermal(
        &table,
        ohm(DEFAULT_INTERNAL_RESISTANCE),
        Some(j_per_k(DEFAULT_THERMAL_CAPACITANCE)),
    )
    .unwrap();

    let json = serde_json::to_value(result.summary()).unwrap();
    assert_eq!(json["model"], "thermal");
    assert_eq!(json["parameters"]["model"], "thermal");
    assert_eq!(json["parameters"]["r_ohm"], DEFAULT_INTERNAL_RESISTANCE);
    assert!(json["metrics"]["rmse"].as_f64().unwrap() < 0.1);

    let samples = result.samples();
    assert!(samples.iter().all(|s| s.state == AMBIENT_C));
    assert!(samples.iter().all(|s| s.temperature_c.is_none()));
}

#[test]
fn missing_temperature_is_schema_error() {
    let table = Table::new()
        .with_column(columns::TIME, vec![0.0, 1.0])
        .unwrap()
        .with_column(columns::CURRENT, vec![1.0, 1.0])
        .unwrap();
    let err = identify_thermal(&table, ohm(0.08), None).unwrap_err();
    assert!(matches!(
        err,
        IdentifyError::Schema { ref missing } if missing == &[columns::TEMPERATURE]
    ));
}
