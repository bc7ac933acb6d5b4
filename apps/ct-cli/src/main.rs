mod data;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use ct_app::{
    CalibrationResult, DEFAULT_INTERNAL_RESISTANCE, DEFAULT_THERMAL_CAPACITANCE,
    ElectricalConfig, IdentifyError, IdentifyResult, KnownParameters, Metrics, ThermalConfig,
    identify_electrical_with_config, identify_thermal_with_config, load_config, predict,
};
use ct_core::{ah, j_per_k, ohm};
use tracing::Level;

use crate::data::PredictionRecord;

#[derive(Parser)]
#[command(name = "ct-cli")]
#[command(about = "CellTwin CLI - battery cell parameter identification", long_about = None)]
struct Cli {
    /// Log per-generation and guard diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify R0, R1, C1 from a discharge record
    Ecm {
        /// Discharge CSV file
        #[arg(long)]
        file: PathBuf,
        /// Nominal capacity in Ah
        #[arg(long, default_value_t = 2.0)]
        qnom: f64,
        /// Directory for the output CSV and summary JSON
        #[arg(long, default_value = ".")]
        outdir: PathBuf,
        /// YAML identification config
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Identify the lumped thermal parameters, then validate on held-out files
    Thermal {
        /// Calibration CSV file
        #[arg(long)]
        file: PathBuf,
        /// Internal resistance in ohms
        #[arg(long, default_value_t = DEFAULT_INTERNAL_RESISTANCE)]
        r_ohm: f64,
        /// Fixed thermal capacitance in J/K
        #[arg(long, conflicts_with = "free_cth")]
        cth: Option<f64>,
        /// Fit the thermal capacitance instead of fixing it
        #[arg(long)]
        free_cth: bool,
        /// Validation CSV files
        #[arg(long, num_args = 1..)]
        valid: Vec<PathBuf>,
        /// Directory for the output CSV and summary JSON
        #[arg(long, default_value = ".")]
        outdir: PathBuf,
        /// YAML identification config
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Forward-simulate a record with parameters from a summary file
    Predict {
        /// Record CSV file
        #[arg(long)]
        file: PathBuf,
        /// Summary JSON written by `ecm` or `thermal`
        #[arg(long)]
        summary: PathBuf,
        /// Output CSV file path (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> IdentifyResult<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    match cli.command {
        Commands::Ecm {
            file,
            qnom,
            outdir,
            config,
        } => cmd_ecm(&file, qnom, &outdir, config.as_deref()),
        Commands::Thermal {
            file,
            r_ohm,
            cth,
            free_cth,
            valid,
            outdir,
            config,
        } => {
            let fixed_cth = if free_cth {
                None
            } else {
                Some(cth.unwrap_or(DEFAULT_THERMAL_CAPACITANCE))
            };
            cmd_thermal(&file, r_ohm, fixed_cth, &valid, &outdir, config.as_deref())
        }
        Commands::Predict {
            file,
            summary,
            output,
        } => cmd_predict(&file, &summary, output.as_deref()),
    }
}

fn require_file(path: &Path) -> IdentifyResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(IdentifyError::InvalidInput(format!(
            "File not found: {}",
            path.display()
        )))
    }
}

fn cmd_ecm(file: &Path, qnom: f64, outdir: &Path, config: Option<&Path>) -> IdentifyResult<()> {
    require_file(file)?;
    let config: ElectricalConfig = match config {
        Some(path) => load_config(path)?,
        None => ElectricalConfig::default(),
    };

    println!("Identifying equivalent circuit: {}", file.display());
    let table = data::read_table(file)?;
    let start = Instant::now();
    let result = identify_electrical_with_config(&table, ah(qnom), &config)?;
    println!("✓ Identification completed in {:.2}s", start.elapsed().as_secs_f64());

    if let Some(p) = result.ecm_parameters() {
        println!("\nParameters:");
        println!("  R0  = {:.3} mΩ", p.r0 * 1e3);
        println!("  R1  = {:.3} mΩ", p.r1 * 1e3);
        println!("  C1  = {:.1} F", p.c1);
        println!("  tau = {:.1} s", p.tau());
    }
    print_metrics(result.metrics(), "V");
    if let Some(soc) = result.state().state_of_charge() {
        if let (Some(first), Some(last)) = (soc.first(), soc.last()) {
            println!("\nState of charge:");
            println!("  Initial: {:.1}%", first * 100.0);
            println!("  Final:   {:.1}%", last * 100.0);
            println!("  DoD:     {:.1}%", (first - last) * 100.0);
        }
    }
    print_diagnostics(&result);

    write_outputs(&result, file, outdir, "ecm")
}

fn cmd_thermal(
    file: &Path,
    r_ohm: f64,
    fixed_cth: Option<f64>,
    valid: &[PathBuf],
    outdir: &Path,
    config: Option<&Path>,
) -> IdentifyResult<()> {
    require_file(file)?;
    let config: ThermalConfig = match config {
        Some(path) => load_config(path)?,
        None => ThermalConfig::default(),
    };

    println!("Identifying thermal model: {}", file.display());
    let table = data::read_table(file)?;
    let start = Instant::now();
    let result = identify_thermal_with_config(&table, ohm(r_ohm), fixed_cth.map(j_per_k), &config)?;
    println!("✓ Identification completed in {:.2}s", start.elapsed().as_secs_f64());

    if let Some(p) = result.thermal_parameters() {
        let fixed = if fixed_cth.is_some() { " (fixed)" } else { "" };
        println!("\nParameters:");
        println!("  C_th  = {:.2} J/K{fixed}", p.c_th);
        println!("  hA    = {:.4} W/K", p.ha);
        println!("  tau   = {:.0} s", p.time_constant());
    }
    if let Some(ambient) = result.state().ambient() {
        println!("  T_amb = {ambient:.2} °C");
    }
    print_metrics(result.metrics(), "°C");
    print_diagnostics(&result);
    write_outputs(&result, file, outdir, "thermal")?;

    if valid.is_empty() {
        return Ok(());
    }

    // held-out files get their own ambient estimate unless one is configured
    let known = match result.known_parameters() {
        KnownParameters::Thermal {
            ha_w_per_k,
            c_th_j_per_k,
            r_ohm,
            ..
        } => KnownParameters::Thermal {
            ha_w_per_k,
            c_th_j_per_k,
            r_ohm,
            ambient_c: config.ambient_c,
        },
        other => other,
    };

    println!("\nValidation:");
    for path in valid {
        if !path.is_file() {
            eprintln!("  ✗ File not found: {}", path.display());
            continue;
        }
        println!("\n  {}", path.display());
        let prediction = predict(&data::read_table(path)?, &known)?;
        print_metrics(prediction.metrics(), "°C");
    }
    Ok(())
}

fn cmd_predict(file: &Path, summary: &Path, output: Option<&Path>) -> IdentifyResult<()> {
    require_file(file)?;
    require_file(summary)?;
    let known = data::read_summary_parameters(summary)?;

    println!("Predicting {} with {}", file.display(), summary.display());
    let prediction = predict(&data::read_table(file)?, &known)?;
    let unit = prediction.series().kind().unit();
    print_metrics(prediction.metrics(), unit);

    if prediction.guards().any() {
        println!(
            "  Numeric guards triggered: {} (dt {}, state {}, delta {})",
            prediction.guards().total(),
            prediction.guards().dt,
            prediction.guards().state,
            prediction.guards().delta
        );
    }

    if let Some(path) = output {
        let records: Vec<PredictionRecord> = prediction
            .time()
            .iter()
            .zip(prediction.measured())
            .zip(prediction.predicted())
            .map(|((&time_s, &measured), &predicted)| PredictionRecord {
                time_s,
                measured,
                predicted,
                error: measured - predicted,
            })
            .collect();
        data::write_predictions(path, &records)?;
        println!("✓ Exported {} samples to {}", records.len(), path.display());
    }
    Ok(())
}

fn print_metrics(metrics: &Metrics, unit: &str) {
    println!("\nMetrics:");
    println!("  RMSE    = {:.6} {unit}", metrics.rmse);
    println!("  MAE     = {:.6} {unit}", metrics.mae);
    println!("  R²      = {:.6}", metrics.r2);
    println!("  MaxErr  = {:.6} {unit}", metrics.max_abs_error);
    println!("  MAPE    = {:.4}%", metrics.mape_pct);
}

fn print_diagnostics(result: &CalibrationResult) {
    let d = result.diagnostics();
    println!("\nOptimizer:");
    println!("  Global stage: cost {:.6e} after {} generations", d.global_cost, d.generations);
    println!(
        "  Local stage:  cost {:.6e} after {} iterations{}",
        d.final_cost,
        d.local_iterations,
        if d.local_converged { "" } else { " (not converged)" }
    );
    println!("  Evaluations:  {} ({} hit numeric guards)", d.evaluations, d.guarded_evaluations);
}

fn write_outputs(
    result: &CalibrationResult,
    input: &Path,
    outdir: &Path,
    model: &str,
) -> IdentifyResult<()> {
    std::fs::create_dir_all(outdir)?;

    let samples_path = data::output_path(outdir, input, &format!("_{model}_output.csv"));
    data::write_samples(&samples_path, &result.samples())?;
    println!("\n✓ Results -> {}", samples_path.display());

    let summary_path = data::output_path(outdir, input, &format!("_{model}_summary.json"));
    data::write_summary(&summary_path, &result.summary())?;
    println!("✓ Summary -> {}", summary_path.display());
    Ok(())
}
