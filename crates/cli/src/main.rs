use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trajet_core::{ExpenseReceipt, SystemClock, Trip};
use trajet_import::{import_csv, import_csv_as, AdapterOptions, ImportBatch, Platform};
use trajet_ocr::ReceiptExtractor;
use trajet_tax::{summarize, TaxConfig};

#[derive(Parser)]
#[command(name = "trajet", about = "Rideshare mileage and expense import for CRA filings.")]
struct Cli {
    /// TOML file overriding tax rates, mileage tiers and categories
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a platform CSV export and print the trips, receipts and report.
    Import {
        file: PathBuf,
        /// Skip detection and read the file as this platform (uber, lyft, generic)
        #[arg(long)]
        platform: Option<Platform>,
    },
    /// Extract fields from receipt text.
    Receipt { file: PathBuf },
    /// Summarize CSV exports and receipt text files for one tax year.
    Summary {
        /// Two-letter province code, e.g. QC
        #[arg(long)]
        province: String,
        #[arg(long)]
        year: i32,
        /// `.csv` exports and `.txt` receipt texts
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let clock = SystemClock;

    match cli.command {
        Commands::Import { file, platform } => {
            let text = read(&file)?;
            let options = adapter_options(&config);
            let batch = match platform {
                Some(p) => import_csv_as(p, &text, &options, &clock),
                None => import_csv(&text, &options, &clock),
            };
            print_json(&batch)
        }
        Commands::Receipt { file } => {
            let text = read(&file)?;
            let extractor = ReceiptExtractor::new().with_categories(config.categories.clone());
            print_json(&extractor.extract(&text))
        }
        Commands::Summary { province, year, files } => {
            let (trips, receipts) = load_records(&files, &config, &clock)?;
            let summary = summarize(&receipts, &trips, &province, year, &config, &clock);
            print_json(&summary)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<TaxConfig> {
    match path {
        Some(p) => {
            let text = read(p)?;
            TaxConfig::from_toml(&text).with_context(|| format!("Invalid config {}", p.display()))
        }
        None => Ok(TaxConfig::default()),
    }
}

fn adapter_options(config: &TaxConfig) -> AdapterOptions {
    AdapterOptions {
        retention: config.retention(),
        categories: config.categories.clone(),
        ..AdapterOptions::default()
    }
}

fn load_records(
    files: &[PathBuf],
    config: &TaxConfig,
    clock: &SystemClock,
) -> Result<(Vec<Trip>, Vec<ExpenseReceipt>)> {
    let options = adapter_options(config);
    let extractor = ReceiptExtractor::new().with_categories(config.categories.clone());
    let mut trips = Vec::new();
    let mut receipts = Vec::new();

    for file in files {
        let text = read(file)?;
        let ext = file
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => {
                let ImportBatch { trips: t, receipts: r, summary, error } =
                    import_csv(&text, &options, clock);
                if let Some(e) = error {
                    tracing::warn!(file = %file.display(), error = %e, "nothing imported");
                }
                tracing::info!(
                    file = %file.display(),
                    platform = %summary.platform,
                    imported = summary.imported_rows,
                    skipped = summary.skipped.len(),
                    "loaded csv"
                );
                trips.extend(t);
                receipts.extend(r);
            }
            "txt" => {
                let extraction = extractor.extract(&text);
                if extraction.needs_review() {
                    tracing::warn!(
                        file = %file.display(),
                        confidence = extraction.confidence,
                        "receipt needs review"
                    );
                }
                let receipt = extraction
                    .into_receipt(clock, config.retention(), "ocr")
                    .with_context(|| format!("Cannot record receipt {}", file.display()))?;
                receipts.push(receipt);
            }
            _ => bail!("Unsupported file type: {} (expected .csv or .txt)", file.display()),
        }
    }
    Ok((trips, receipts))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
