//! Cleaned, time-ordered sample sequences.

use crate::error::{CoreError, CoreResult};

/// Input column headers.
pub mod columns {
    pub const TIME: &str = "Time";
    pub const CURRENT: &str = "Current_measured";
    pub const VOLTAGE: &str = "Voltage_measured";
    pub const TEMPERATURE: &str = "Temperature_measured";
}

/// Which measured signal a series treats as the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Terminal voltage (V); the secondary signal, if any, is temperature.
    Voltage,
    /// Cell surface temperature (°C).
    Temperature,
}

impl OutputKind {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Voltage => columns::VOLTAGE,
            Self::Temperature => columns::TEMPERATURE,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Voltage => "V",
            Self::Temperature => "°C",
        }
    }
}

/// Time series after cleaning: non-decreasing time, all required values finite.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    kind: OutputKind,
    time: Vec<f64>,
    current: Vec<f64>,
    output: Vec<f64>,
    secondary: Option<Vec<f64>>,
}

impl TimeSeries {
    pub fn new(
        kind: OutputKind,
        time: Vec<f64>,
        current: Vec<f64>,
        output: Vec<f64>,
        secondary: Option<Vec<f64>>,
    ) -> CoreResult<Self> {
        let n = time.len();
        let check = |column: &str, len: usize| {
            if len == n {
                Ok(())
            } else {
                Err(CoreError::LengthMismatch {
                    column: column.to_string(),
                    len,
                    expected: n,
                })
            }
        };
        check(columns::CURRENT, current.len())?;
        check(kind.column(), output.len())?;
        if let Some(sec) = &secondary {
            check(columns::TEMPERATURE, sec.len())?;
        }
        if time.windows(2).any(|w| w[1] < w[0]) {
            return Err(CoreError::InvalidArg {
                what: "time must be non-decreasing",
            });
        }

        Ok(Self {
            kind,
            time,
            current,
            output,
            secondary,
        })
    }

    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    pub fn output(&self) -> &[f64] {
        &self.output
    }

    pub fn secondary(&self) -> Option<&[f64]> {
        self.secondary.as_deref()
    }
}
