//! Sample preprocessing: schema check, time ordering, row cleaning and
//! operating-phase selection.

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::series::{OutputKind, TimeSeries, columns};
use crate::table::Table;

/// Fewest usable rows an identification can run on.
pub const MIN_SAMPLES: usize = 10;

/// Current magnitude (A) a sample must exceed, in the discharge direction, to
/// count as part of the discharge phase.
pub const DISCHARGE_DEADBAND_A: f64 = 0.1;

/// Electrical preprocessing with the default discharge deadband.
pub fn preprocess_electrical(table: &Table) -> CoreResult<TimeSeries> {
    preprocess_electrical_with_deadband(table, DISCHARGE_DEADBAND_A)
}

/// Keep complete rows in time order whose current is below `-deadband_a`.
///
/// `Temperature_measured` is optional and passed through unchanged.
pub fn preprocess_electrical_with_deadband(
    table: &Table,
    deadband_a: f64,
) -> CoreResult<TimeSeries> {
    let required = [columns::TIME, columns::CURRENT, columns::VOLTAGE];
    table.require(&required)?;

    let current = column(table, columns::CURRENT)?;
    let rows: Vec<usize> = ordered_complete_rows(table, &required)?
        .into_iter()
        .filter(|&i| current[i] < -deadband_a)
        .collect();
    debug!(
        total = table.rows(),
        kept = rows.len(),
        "electrical preprocessing selected discharge rows"
    );
    ensure_enough(rows.len())?;

    let secondary = table
        .column(columns::TEMPERATURE)
        .map(|temps| gather(temps, &rows));
    TimeSeries::new(
        OutputKind::Voltage,
        gather(column(table, columns::TIME)?, &rows),
        gather(current, &rows),
        gather(column(table, columns::VOLTAGE)?, &rows),
        secondary,
    )
}

/// Keep complete rows in time order. No phase selection: heating and resting
/// segments both carry information for the thermal balance.
pub fn preprocess_thermal(table: &Table) -> CoreResult<TimeSeries> {
    let required = [columns::TIME, columns::CURRENT, columns::TEMPERATURE];
    table.require(&required)?;

    let rows = ordered_complete_rows(table, &required)?;
    debug!(
        total = table.rows(),
        kept = rows.len(),
        "thermal preprocessing kept complete rows"
    );
    ensure_enough(rows.len())?;

    TimeSeries::new(
        OutputKind::Temperature,
        gather(column(table, columns::TIME)?, &rows),
        gather(column(table, columns::CURRENT)?, &rows),
        gather(column(table, columns::TEMPERATURE)?, &rows),
        None,
    )
}

fn column<'a>(table: &'a Table, name: &str) -> CoreResult<&'a [f64]> {
    table.column(name).ok_or_else(|| CoreError::Schema {
        missing: vec![name.to_string()],
    })
}

/// Row indices with every required value finite, stably sorted by time.
fn ordered_complete_rows(table: &Table, required: &[&str]) -> CoreResult<Vec<usize>> {
    let cols = required
        .iter()
        .map(|name| column(table, name))
        .collect::<CoreResult<Vec<_>>>()?;
    let time = column(table, columns::TIME)?;

    let mut rows: Vec<usize> = (0..table.rows())
        .filter(|&i| cols.iter().all(|c| c[i].is_finite()))
        .collect();
    rows.sort_by(|&a, &b| time[a].total_cmp(&time[b]));
    Ok(rows)
}

fn gather(values: &[f64], rows: &[usize]) -> Vec<f64> {
    rows.iter().map(|&i| values[i]).collect()
}

fn ensure_enough(remaining: usize) -> CoreResult<()> {
    if remaining < MIN_SAMPLES {
        Err(CoreError::InsufficientData {
            remaining,
            required: MIN_SAMPLES,
        })
    } else {
        Ok(())
    }
}
