//! Integration test: forward models bound to measured records.

use ct_core::{OutputKind, TimeSeries};
use ct_sim::reference::REFERENCE_DEGREE;
use ct_sim::{
    EcmModel, EcmParameters, ForwardModel, ReferenceCurve, ThermalConditions, ThermalModel,
    ThermalParameters, coulomb_count, estimate_ambient, simulate_ecm, simulate_thermal,
};

fn discharge(curve: &ReferenceCurve, truth: &EcmParameters) -> (TimeSeries, Vec<f64>) {
    let n = 361;
    let time: Vec<f64> = (0..n).map(|k| k as f64 * 10.0).collect();
    let current = vec![-1.0; n];
    let soc = coulomb_count(&time, &current, 7200.0).unwrap();
    let voltage = simulate_ecm(&time, &current, &soc, curve, truth)
        .unwrap()
        .output;
    let series = TimeSeries::new(OutputKind::Voltage, time, current, voltage, None).unwrap();
    (series, soc)
}

#[test]
fn ecm_cost_is_zero_only_at_generating_parameters() {
    let curve = ReferenceCurve::template().unwrap();
    let truth = EcmParameters::new(0.05, 0.02, 2000.0);
    let (series, soc) = discharge(&curve, &truth);
    let model = EcmModel::new(&series, &soc, &curve).unwrap();

    assert_eq!(model.dimension(), 3);
    assert_eq!(model.cost(&truth.to_vec()), 0.0);
    for off in [[0.06, 0.02, 2000.0], [0.05, 0.03, 2000.0], [0.05, 0.02, 500.0]] {
        assert!(model.cost(&off) > 1e-4, "{off:?}");
    }
}

#[test]
fn soc_from_one_hour_at_one_amp_halves_two_amp_hours() {
    let curve = ReferenceCurve::flat(3.7);
    let (_, soc) = discharge(&curve, &EcmParameters::new(0.05, 0.02, 2000.0));
    assert_eq!(soc[0], 1.0);
    assert!((soc.last().unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn template_refit_reproduces_curve() {
    let template = ReferenceCurve::template().unwrap();
    let soc: Vec<f64> = (0..=200).map(|k| k as f64 / 200.0).collect();
    let ocv: Vec<f64> = soc.iter().map(|&s| template.ocv(s)).collect();
    let refit = ReferenceCurve::fit(&soc, &ocv, REFERENCE_DEGREE).unwrap();
    for &s in &soc {
        assert!((refit.ocv(s) - template.ocv(s)).abs() < 1e-6);
    }
}

#[test]
fn thermal_model_tracks_rest_then_heat_record() {
    let dt = 10.0;
    let time: Vec<f64> = (0..421).map(|k| k as f64 * dt).collect();
    let current: Vec<f64> = time
        .iter()
        .map(|&t| if t < 600.0 { 0.0 } else { 2.0 })
        .collect();
    let conditions = ThermalConditions {
        r_ohm: 0.08,
        ambient_c: 25.0,
    };
    let truth = ThermalParameters::new(0.05, 62.1);
    let temps = simulate_thermal(&time, &current, 25.0, &truth, &conditions)
        .unwrap()
        .output;

    assert_eq!(estimate_ambient(&temps).unwrap(), 25.0);
    assert!(temps.windows(2).all(|w| w[1] >= w[0]));

    let series = TimeSeries::new(OutputKind::Temperature, time, current, temps, None).unwrap();
    let model = ThermalModel::new(&series, conditions, Some(62.1)).unwrap();
    assert_eq!(model.cost(&[0.05]), 0.0);
    assert!(model.cost(&[0.04]) > model.cost(&[0.049]));
}

#[test]
fn implausible_proposals_are_guarded_not_fatal() {
    let time: Vec<f64> = (0..50).map(|k| k as f64 * 10.0).collect();
    let current = vec![5.0; 50];
    let temps = vec![25.0; 50];
    let series = TimeSeries::new(OutputKind::Temperature, time, current, temps, None).unwrap();
    let model = ThermalModel::new(
        &series,
        ThermalConditions {
            r_ohm: 0.08,
            ambient_c: 25.0,
        },
        None,
    )
    .unwrap();

    // tiny capacitance, huge dissipation: explicit step overshoots every sample
    let (cost, guards) = model.evaluate(&[0.001, 2.0]);
    assert!(cost.is_finite());
    assert!(guards.any());
}
