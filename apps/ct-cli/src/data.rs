//! CSV input and CSV/JSON output for the command-line front end.

use std::path::{Path, PathBuf};

use ct_app::{IdentifyError, IdentifyResult, KnownParameters, SampleRecord, SummaryRecord};
use ct_core::Table;
use serde::{Deserialize, Serialize};

fn csv_error(path: &Path, err: csv::Error) -> IdentifyError {
    IdentifyError::InvalidInput(format!("{}: {err}", path.display()))
}

/// Read a headed CSV file into columns.
///
/// Header names are trimmed. Cells that are empty or not numeric become NaN,
/// which the preprocessors treat as missing.
pub fn read_table(path: &Path) -> IdentifyResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    for rec in rdr.records() {
        let rec = rec.map_err(|e| csv_error(path, e))?;
        for (j, column) in columns.iter_mut().enumerate() {
            let value = rec
                .get(j)
                .and_then(|cell| cell.parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            column.push(value);
        }
    }

    let mut table = Table::new();
    for (name, values) in headers.iter().zip(columns) {
        if !name.is_empty() {
            table.push_column(name, values)?;
        }
    }
    Ok(table)
}

/// `<outdir>/<stem of input><suffix>`
pub fn output_path(outdir: &Path, input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string());
    outdir.join(format!("{stem}{suffix}"))
}

pub fn write_samples(path: &Path, samples: &[SampleRecord]) -> IdentifyResult<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for sample in samples {
        wtr.serialize(sample).map_err(|e| csv_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_summary(path: &Path, summary: &SummaryRecord) -> IdentifyResult<()> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| IdentifyError::InvalidInput(format!("summary encoding: {e}")))?;
    std::fs::write(path, json)?;
    Ok(())
}

/// The part of a summary file needed to replay a run.
#[derive(Deserialize)]
struct SummaryParameters {
    parameters: KnownParameters,
}

pub fn read_summary_parameters(path: &Path) -> IdentifyResult<KnownParameters> {
    let text = std::fs::read_to_string(path)?;
    let summary: SummaryParameters = serde_json::from_str(&text).map_err(|e| {
        IdentifyError::InvalidInput(format!("{}: not a summary file: {e}", path.display()))
    })?;
    Ok(summary.parameters)
}

/// One row of a prediction export.
#[derive(Serialize)]
pub struct PredictionRecord {
    pub time_s: f64,
    pub measured: f64,
    pub predicted: f64,
    pub error: f64,
}

pub fn write_predictions(path: &Path, records: &[PredictionRecord]) -> IdentifyResult<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for record in records {
        wtr.serialize(record).map_err(|e| csv_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_core::columns;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ct-cli-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_trimmed_headers_and_marks_bad_cells_missing() {
        let dir = scratch("read");
        let path = dir.join("cycle.csv");
        std::fs::write(
            &path,
            " Time , Current_measured ,Voltage_measured,Type\n0,-1.0,3.9,discharge\n10,,3.8,discharge\n20,-1.0,x,discharge\n",
        )
        .unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.rows(), 3);
        assert_eq!(table.column(columns::TIME).unwrap(), &[0.0, 10.0, 20.0]);
        assert!(table.column(columns::CURRENT).unwrap()[1].is_nan());
        assert!(table.column(columns::VOLTAGE).unwrap()[2].is_nan());
        assert!(table.column("Type").unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn output_path_uses_input_stem() {
        let p = output_path(Path::new("/tmp/out"), Path::new("data/B0005_12.csv"), "_ecm_output.csv");
        assert_eq!(p, PathBuf::from("/tmp/out/B0005_12_ecm_output.csv"));
    }

    #[test]
    fn summary_parameters_ignore_other_fields() {
        let dir = scratch("summary");
        let path = dir.join("s.json");
        std::fs::write(
            &path,
            r#"{"model":"thermal","metrics":{"r2":null},"parameters":
                {"model":"thermal","ha_w_per_k":0.05,"c_th_j_per_k":62.1,"r_ohm":0.08,"ambient_c":25.0}}"#,
        )
        .unwrap();
        let known = read_summary_parameters(&path).unwrap();
        assert_eq!(
            known,
            KnownParameters::Thermal {
                ha_w_per_k: 0.05,
                c_th_j_per_k: 62.1,
                r_ohm: 0.08,
                ambient_c: Some(25.0),
            }
        );
    }
}
