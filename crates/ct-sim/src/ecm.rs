//! 1RC Thevenin equivalent-circuit model.
//!
//! ```text
//! V[k]    = OCV(SOC[k]) + R0 I[k] + Vp[k]
//! Vp[k]   = α Vp[k-1] + R1 (1 - α) I[k-1],   α = exp(-dt / (R1 C1))
//! ```

use ct_core::TimeSeries;

use crate::error::{SimError, SimResult, check_len};
use crate::guard::{DT_MIN_S, GuardHits, Simulation, TAU_MIN_S};
use crate::model::ForwardModel;
use crate::reference::ReferenceCurve;

/// Identified circuit constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcmParameters {
    /// Ohmic resistance (Ω)
    pub r0: f64,
    /// Polarization resistance (Ω)
    pub r1: f64,
    /// Polarization capacitance (F)
    pub c1: f64,
}

impl EcmParameters {
    pub const DIMENSION: usize = 3;

    pub fn new(r0: f64, r1: f64, c1: f64) -> Self {
        Self { r0, r1, c1 }
    }

    /// Polarization time constant τ = R1·C1 (s).
    pub fn tau(&self) -> f64 {
        self.r1 * self.c1
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.r0, self.r1, self.c1]
    }

    pub fn from_slice(x: &[f64]) -> SimResult<Self> {
        match x {
            [r0, r1, c1] => Ok(Self::new(*r0, *r1, *c1)),
            _ => Err(SimError::Dimension {
                expected: Self::DIMENSION,
                got: x.len(),
            }),
        }
    }
}

/// Zero-order-hold simulation of terminal voltage.
pub fn simulate_ecm(
    time: &[f64],
    current: &[f64],
    soc: &[f64],
    curve: &ReferenceCurve,
    params: &EcmParameters,
) -> SimResult<Simulation> {
    let n = time.len();
    check_len("ecm current", n, current.len())?;
    check_len("ecm state-of-charge", n, soc.len())?;

    let mut guards = GuardHits::default();
    let mut output = Vec::with_capacity(n);
    if n == 0 {
        return Ok(Simulation { output, guards });
    }

    let tau = params.tau();
    output.push(curve.ocv(soc[0]) + params.r0 * current[0]);

    let mut v_pol = 0.0;
    for k in 1..n {
        let raw_dt = time[k] - time[k - 1];
        let dt = if raw_dt < DT_MIN_S {
            guards.dt += 1;
            DT_MIN_S
        } else {
            raw_dt
        };
        let alpha = if tau > TAU_MIN_S { (-dt / tau).exp() } else { 0.0 };
        v_pol = alpha * v_pol + params.r1 * (1.0 - alpha) * current[k - 1];
        output.push(curve.ocv(soc[k]) + params.r0 * current[k] + v_pol);
    }

    Ok(Simulation { output, guards })
}

/// Equivalent-circuit model bound to one discharge record.
///
/// Parameter vector: `[R0, R1, C1]`.
pub struct EcmModel<'a> {
    series: &'a TimeSeries,
    soc: &'a [f64],
    curve: &'a ReferenceCurve,
}

impl<'a> EcmModel<'a> {
    pub fn new(
        series: &'a TimeSeries,
        soc: &'a [f64],
        curve: &'a ReferenceCurve,
    ) -> SimResult<Self> {
        check_len("ecm state-of-charge", series.len(), soc.len())?;
        Ok(Self { series, soc, curve })
    }
}

impl ForwardModel for EcmModel<'_> {
    const NAME: &'static str = "ecm";

    fn dimension(&self) -> usize {
        EcmParameters::DIMENSION
    }

    fn measured(&self) -> &[f64] {
        self.series.output()
    }

    fn simulate(&self, x: &[f64]) -> SimResult<Simulation> {
        let params = EcmParameters::from_slice(x)?;
        simulate_ecm(
            self.series.time(),
            self.series.current(),
            self.soc,
            self.curve,
            &params,
        )
    }
}
