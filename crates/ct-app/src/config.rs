//! Identification configuration.
//!
//! Every tuning value lives in one of these structs; nothing is module-level
//! state. All fields default, so partial YAML files are accepted.

use std::path::Path;

use ct_core::DISCHARGE_DEADBAND_A;
use ct_sim::ReferenceCurve;
use ct_solver::{Bounds, EvolutionConfig, IdentifyConfig, Interval, LocalConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{IdentifyError, IdentifyResult};

/// Search box for `[R0, R1, C1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcmBounds {
    pub r0: Interval,
    pub r1: Interval,
    pub c1: Interval,
}

impl Default for EcmBounds {
    fn default() -> Self {
        Self {
            r0: Interval::new(0.001, 0.5),
            r1: Interval::new(0.001, 0.5),
            c1: Interval::new(50.0, 20_000.0),
        }
    }
}

impl EcmBounds {
    pub fn to_bounds(&self) -> IdentifyResult<Bounds> {
        Ok(Bounds::new(vec![self.r0, self.r1, self.c1])?)
    }
}

/// Where the open-circuit-voltage curve used by the simulator comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// Start from the template and re-fit it to the record being identified.
    #[default]
    Calibrate,
    /// Use a known curve as-is (coefficients highest power first).
    Fixed { coefficients: Vec<f64> },
}

impl ReferencePolicy {
    pub fn fixed(curve: &ReferenceCurve) -> Self {
        Self::Fixed {
            coefficients: curve.coefficients().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricalConfig {
    pub bounds: EcmBounds,
    pub identify: IdentifyConfig,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub reference: ReferencePolicy,
    /// Rows with current at or above `-deadband` are not discharge (A)
    pub discharge_deadband_a: f64,
}

impl Default for ElectricalConfig {
    fn default() -> Self {
        Self {
            bounds: EcmBounds::default(),
            identify: IdentifyConfig {
                global: EvolutionConfig {
                    max_generations: 500,
                    tol: 1e-7,
                    mutation: (0.5, 1.5),
                    recombination: 0.75,
                    ..EvolutionConfig::default()
                },
                local: LocalConfig {
                    max_iterations: 3000,
                    ftol: 1e-13,
                    gtol: 1e-11,
                    ..LocalConfig::default()
                },
            },
            reference: ReferencePolicy::Calibrate,
            discharge_deadband_a: DISCHARGE_DEADBAND_A,
        }
    }
}

/// Search box for the thermal parameters. `c_th` is ignored when the
/// capacitance is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalBounds {
    pub c_th: Interval,
    pub ha: Interval,
}

impl Default for ThermalBounds {
    fn default() -> Self {
        Self {
            c_th: Interval::new(10.0, 500.0),
            ha: Interval::new(0.001, 2.0),
        }
    }
}

impl ThermalBounds {
    /// Box matching the thermal model's parameter vector layout.
    pub fn to_bounds(&self, capacitance_fixed: bool) -> IdentifyResult<Bounds> {
        let intervals = if capacitance_fixed {
            vec![self.ha]
        } else {
            vec![self.c_th, self.ha]
        };
        Ok(Bounds::new(intervals)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    pub bounds: ThermalBounds,
    pub identify: IdentifyConfig,
    /// Known ambient temperature (°C); estimated from the record when unset
    pub ambient_c: Option<f64>,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            bounds: ThermalBounds::default(),
            identify: IdentifyConfig {
                global: EvolutionConfig {
                    max_generations: 500,
                    tol: 1e-6,
                    mutation: (0.5, 1.5),
                    recombination: 0.8,
                    ..EvolutionConfig::default()
                },
                local: LocalConfig {
                    max_iterations: 5000,
                    ftol: 1e-15,
                    gtol: 1e-12,
                    ..LocalConfig::default()
                },
            },
            ambient_c: None,
        }
    }
}

/// Parse a config from YAML text.
pub fn parse_config<T: DeserializeOwned>(yaml: &str) -> IdentifyResult<T> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load a config from a YAML file.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> IdentifyResult<T> {
    let text = std::fs::read_to_string(path).map_err(|source| IdentifyError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_model_tables() {
        let e = ElectricalConfig::default();
        assert_eq!(e.bounds.c1, Interval::new(50.0, 20_000.0));
        assert_eq!(e.identify.global.seed, 42);
        assert_eq!(e.identify.local.max_iterations, 3000);
        assert_eq!(e.reference, ReferencePolicy::Calibrate);

        let t = ThermalConfig::default();
        assert_eq!(t.bounds.ha, Interval::new(0.001, 2.0));
        assert_eq!(t.identify.global.recombination, 0.8);
        assert!(t.ambient_c.is_none());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = r#"
identify:
  global:
    seed: 7
    max_generations: 40
bounds:
  r0: { lo: 0.01, hi: 0.2 }
"#;
        let cfg: ElectricalConfig = parse_config(yaml).unwrap();
        assert_eq!(cfg.identify.global.seed, 7);
        assert_eq!(cfg.identify.global.max_generations, 40);
        assert_eq!(cfg.identify.global.population_multiplier, 15);
        assert_eq!(cfg.bounds.r0, Interval::new(0.01, 0.2));
        assert_eq!(cfg.bounds.c1, EcmBounds::default().c1);
        assert_eq!(cfg.discharge_deadband_a, DISCHARGE_DEADBAND_A);
    }

    #[test]
    fn fixed_reference_policy_parses() {
        let yaml = "reference:\n  fixed:\n    coefficients: [3.7]\n";
        let cfg: ElectricalConfig = parse_config(yaml).unwrap();
        assert_eq!(
            cfg.reference,
            ReferencePolicy::Fixed {
                coefficients: vec![3.7]
            }
        );
    }

    #[test]
    fn calibrate_policy_parses_as_plain_name() {
        let cfg: ElectricalConfig = parse_config("reference: calibrate\n").unwrap();
        assert_eq!(cfg.reference, ReferencePolicy::Calibrate);
    }

    #[test]
    fn fixed_reference_policy_survives_yaml_round_trip() {
        let cfg = ElectricalConfig {
            reference: ReferencePolicy::Fixed {
                coefficients: vec![0.5, 3.6],
            },
            ..ElectricalConfig::default()
        };
        let text = serde_yaml::to_string(&cfg).unwrap();
        let back: ElectricalConfig = parse_config(&text).unwrap();
        assert_eq!(back.reference, cfg.reference);
    }

    #[test]
    fn thermal_ambient_override_parses() {
        let cfg: ThermalConfig = parse_config("ambient_c: 23.5\n").unwrap();
        assert_eq!(cfg.ambient_c, Some(23.5));
    }

    #[test]
    fn malformed_yaml_is_config_error() {
        let err = parse_config::<ThermalConfig>("ambient_c: [not, a, number]").unwrap_err();
        assert!(matches!(err, IdentifyError::Config(_)));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let bounds = ThermalBounds {
            ha: Interval::new(2.0, 0.001),
            ..ThermalBounds::default()
        };
        assert!(matches!(
            bounds.to_bounds(true),
            Err(IdentifyError::Config(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config::<ThermalConfig>(Path::new("/nonexistent/ct.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ct.yaml"));
    }
}
