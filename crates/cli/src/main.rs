//! # salve
//!
//! Command-line interface for the synthetic clinic surveillance simulator
//! and per-disease forecaster.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use surveillance_facade::prelude::*;
use surveillance_facade::{SurveillancePipeline, SurveillanceRun};
use tracing::info;

#[derive(Parser)]
#[command(name = "salve")]
#[command(about = "Synthetic clinic surveillance and case forecasting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the weekly historical table
    Simulate {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Simulate, train per-disease models and forecast next week
    Forecast {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the default configuration as JSON
    Config,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Seed for every random draw (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON configuration file; missing fields take defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

impl RunArgs {
    fn load_config(&self) -> Result<SurveillanceConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open config {}", path.display()))?;
                serde_json::from_reader(io::BufReader::new(file))
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => SurveillanceConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Logs go to stderr so tables on stdout stay machine-readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,salve=info,surveillance_core=info".into()),
        )
        .init();
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

/// Write rows as CSV with a header, or as a pretty JSON array
fn write_rows<T: Serialize>(
    rows: &[T],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let mut writer = open_output(output)?;
    match format {
        OutputFormat::Csv => {
            let mut csv = csv::Writer::from_writer(&mut writer);
            for row in rows {
                csv.serialize(row).context("Failed to write CSV row")?;
            }
            csv.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, rows).context("Failed to write JSON")?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;

    if let Some(path) = output {
        info!(rows = rows.len(), path = %path.display(), "table written");
    }
    Ok(())
}

fn run_simulate(args: RunArgs) -> Result<()> {
    let config = args.load_config()?;
    let run = SurveillancePipeline::new().simulate(&config)?;
    write_rows(run.historical.rows(), args.format, args.output.as_deref())
}

fn print_importances(run: &SurveillanceRun) {
    eprintln!("\n=== Feature Importance ===");
    for importance in run.report.importances() {
        eprintln!("{}:", importance.disease);
        for entry in &importance.entries {
            eprintln!("  {:<24} {:.4}", entry.label, entry.importance);
        }
    }
}

fn print_summary(run: &SurveillanceRun) {
    let summary = run.summary();
    eprintln!("\n=== Risk Summary ===");
    eprintln!("Monitored clinics: {}", summary.monitored_clinics);
    if let Some(disease) = &summary.highest_risk_disease {
        eprintln!("Highest-risk disease: {}", disease);
    }
    if let (Some(clinic), Some(cases)) =
        (&summary.highest_risk_clinic, summary.highest_risk_cases)
    {
        eprintln!("Highest-risk clinic: {} ({} predicted cases)", clinic, cases);
    }
    for (disease, total) in &summary.disease_totals {
        eprintln!("  {:<12} {}", disease, total);
    }
}

fn run_forecast(args: RunArgs) -> Result<()> {
    let config = args.load_config()?;
    let run = SurveillancePipeline::new().run(&config)?;

    let forecasts: Vec<&ForecastRecord> = run.report.forecasts();
    write_rows(&forecasts, args.format, args.output.as_deref())?;
    print_importances(&run);
    print_summary(&run);

    let failures = run.report.failures();
    if failures.len() > 1 {
        for (disease, error) in &failures {
            eprintln!("Training failed for {}: {}", disease, error);
        }
        bail!("{} disease categories failed to train", failures.len());
    }
    run.report.ensure_complete()?;
    Ok(())
}

fn run_config() -> Result<()> {
    let json = serde_json::to_string_pretty(&SurveillanceConfig::default())?;
    println!("{}", json);
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate { run } => run_simulate(run),
        Commands::Forecast { run } => run_forecast(run),
        Commands::Config => run_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
