//! Single-node lumped thermal model.
//!
//! ```text
//! T[k] = T[k-1] + dt / C_th * (I[k-1]^2 R - hA (T[k-1] - T_amb))
//! ```
//!
//! with the step size, the previous temperature and the per-step change each
//! clamped (see [`crate::guard`]).

use ct_core::TimeSeries;

use crate::error::{SimError, SimResult, check_len};
use crate::guard::{
    C_TH_MIN, DELTA_T_MAX, DT_MAX_S, DT_MIN_S, GuardHits, Simulation, TEMP_MAX_C, TEMP_MIN_C,
    clamp_counted,
};
use crate::model::ForwardModel;

/// Identified thermal constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalParameters {
    /// Heat-transfer coefficient × area (W/K)
    pub ha: f64,
    /// Lumped thermal capacitance (J/K)
    pub c_th: f64,
}

impl ThermalParameters {
    pub fn new(ha: f64, c_th: f64) -> Self {
        Self { ha, c_th }
    }

    /// Thermal time constant C_th / hA (s).
    pub fn time_constant(&self) -> f64 {
        self.c_th / self.ha
    }
}

/// Inputs held fixed during thermal identification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalConditions {
    /// Resistance generating Joule heat (Ω), supplied by the electrical fit.
    pub r_ohm: f64,
    /// Ambient temperature (°C)
    pub ambient_c: f64,
}

/// Forward simulation from `t0_c`; the first output sample equals `t0_c`.
pub fn simulate_thermal(
    time: &[f64],
    current: &[f64],
    t0_c: f64,
    params: &ThermalParameters,
    conditions: &ThermalConditions,
) -> SimResult<Simulation> {
    let n = time.len();
    check_len("thermal current", n, current.len())?;

    let mut guards = GuardHits::default();
    let mut output = Vec::with_capacity(n);
    if n == 0 {
        return Ok(Simulation { output, guards });
    }
    output.push(t0_c);

    let c_th = params.c_th.max(C_TH_MIN);
    for k in 1..n {
        let dt = clamp_counted(time[k] - time[k - 1], DT_MIN_S, DT_MAX_S, &mut guards.dt);
        let t_prev = clamp_counted(output[k - 1], TEMP_MIN_C, TEMP_MAX_C, &mut guards.state);
        let q_gen = current[k - 1] * current[k - 1] * conditions.r_ohm;
        let q_diss = params.ha * (t_prev - conditions.ambient_c);
        let delta = clamp_counted(
            (dt / c_th) * (q_gen - q_diss),
            -DELTA_T_MAX,
            DELTA_T_MAX,
            &mut guards.delta,
        );
        output.push(t_prev + delta);
    }

    Ok(Simulation { output, guards })
}

/// Lumped thermal model bound to one record.
///
/// With a fixed capacitance the parameter vector is `[hA]`; otherwise it is
/// `[C_th, hA]`.
pub struct ThermalModel<'a> {
    series: &'a TimeSeries,
    conditions: ThermalConditions,
    fixed_capacitance: Option<f64>,
}

impl<'a> ThermalModel<'a> {
    pub fn new(
        series: &'a TimeSeries,
        conditions: ThermalConditions,
        fixed_capacitance: Option<f64>,
    ) -> SimResult<Self> {
        if series.is_empty() {
            return Err(SimError::InvalidArg {
                what: "thermal model needs at least one sample",
            });
        }
        Ok(Self {
            series,
            conditions,
            fixed_capacitance,
        })
    }

    /// Map a free parameter vector onto the full parameter set.
    pub fn parameters(&self, x: &[f64]) -> SimResult<ThermalParameters> {
        match (self.fixed_capacitance, x) {
            (Some(c_th), [ha]) => Ok(ThermalParameters::new(*ha, c_th)),
            (None, [c_th, ha]) => Ok(ThermalParameters::new(*ha, *c_th)),
            _ => Err(SimError::Dimension {
                expected: self.dimension(),
                got: x.len(),
            }),
        }
    }

    pub fn conditions(&self) -> &ThermalConditions {
        &self.conditions
    }
}

impl ForwardModel for ThermalModel<'_> {
    const NAME: &'static str = "thermal";

    fn dimension(&self) -> usize {
        if self.fixed_capacitance.is_some() { 1 } else { 2 }
    }

    fn measured(&self) -> &[f64] {
        self.series.output()
    }

    fn simulate(&self, x: &[f64]) -> SimResult<Simulation> {
        let params = self.parameters(x)?;
        simulate_thermal(
            self.series.time(),
            self.series.current(),
            self.series.output()[0],
            &params,
            &self.conditions,
        )
    }
}
