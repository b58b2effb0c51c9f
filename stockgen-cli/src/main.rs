//! StockGen CLI — generate, defaults and validate commands.
//!
//! Commands:
//! - `generate` — build a transaction table from a config file (or the
//!   defaults) and print it or export it as CSV/JSON
//! - `defaults` — print the default configuration as TOML
//! - `validate` — check a config file without fetching any data

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stockgen_core::domain::{Columns, TaxYear, TransactionTable};
use stockgen_core::rng::RunSeed;
use stockgen_runner::{
    run_with_source, save_artifacts, ExportFormat, GenerationConfig, RunResult, SourceKind,
    SourceOptions,
};

#[derive(Parser)]
#[command(
    name = "stockgen",
    version,
    about = "StockGen CLI — synthetic stock transaction histories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a transaction table.
    Generate {
        /// Path to a TOML (or .json) config file. Defaults are used without one.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed: a number, or any text hashed into one. Random if omitted.
        #[arg(long)]
        seed: Option<String>,

        /// Price data source: yahoo, csv or synthetic.
        #[arg(long, default_value = "yahoo")]
        source: SourceKind,

        /// Directory of <TICKER>.csv files (with --source csv).
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Generate over the UK tax year starting 6 April of this year.
        #[arg(long)]
        tax_year: Option<i32>,

        /// Write the table as csv or json instead of printing it.
        #[arg(long)]
        export: Option<ExportFormat>,

        /// Output directory for exported files.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Include NetShare and CumulativeShare columns.
        #[arg(long, default_value_t = false)]
        extended: bool,
    },
    /// Print the default configuration as TOML.
    Defaults,
    /// Validate a config file.
    Validate {
        /// Path to a TOML (or .json) config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            seed,
            source,
            csv_dir,
            tax_year,
            export,
            output_dir,
            extended,
        } => run_generate_cmd(
            config.as_deref(),
            seed.as_deref(),
            SourceOptions {
                kind: source,
                csv_dir,
            },
            tax_year,
            export,
            &output_dir,
            extended,
        ),
        Commands::Defaults => run_defaults(),
        Commands::Validate { config } => run_validate(&config),
    }
}

/// Logs go to stderr so printed tables and TOML stay clean on stdout.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GenerationConfig> {
    match path {
        Some(path) => GenerationConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(GenerationConfig::default()),
    }
}

fn run_generate_cmd(
    config_path: Option<&Path>,
    seed: Option<&str>,
    source: SourceOptions,
    tax_year: Option<i32>,
    export: Option<ExportFormat>,
    output_dir: &Path,
    extended: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(year) = tax_year {
        config = config.with_tax_year(TaxYear::starting(year));
    }

    let seed = seed.map(RunSeed::parse);
    let result = run_with_source(&config, &source, seed)?;
    let columns = if extended {
        Columns::Extended
    } else {
        Columns::Standard
    };

    match export {
        Some(format) => {
            let saved = save_artifacts(&result, columns, format, output_dir)?;
            println!("Table saved to:    {}", saved.table.display());
            println!("Manifest saved to: {}", saved.manifest.display());
        }
        None => print_table(&result.table, columns),
    }
    print_summary(&result);
    Ok(())
}

fn run_defaults() -> Result<()> {
    print!("{}", GenerationConfig::default().to_toml_string()?);
    Ok(())
}

fn run_validate(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    println!(
        "OK: {} stock(s), period {} to {}",
        config.stocks.len(),
        config.params.period_start,
        config.params.period_end
    );
    println!("Fingerprint: {}", config.fingerprint());
    Ok(())
}

fn print_table(table: &TransactionTable, columns: Columns) {
    let headers = columns.headers();
    let records = table.records(columns);

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for record in &records {
        for (w, cell) in widths.iter_mut().zip(record) {
            *w = (*w).max(cell.len());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:>w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(headers.to_vec()));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));
    for record in &records {
        println!("{}", line(record.iter().map(String::as_str).collect()));
    }
}

fn print_summary(result: &RunResult) {
    let m = &result.manifest;
    println!();
    println!("=== Generation Summary ===");
    println!("Seed:           {}", m.seed);
    println!("Fingerprint:    {}", m.config_fingerprint);
    println!("Provider:       {}", m.provider);
    println!("Period:         {} to {}", m.period_start, m.period_end);
    println!("Fee rate:       {:.4}", m.fee_rate);
    println!("Transactions:   {}", m.total_transactions);
    println!();
    println!(
        "{:<8} {:>6} {:>6} {:>8} {:>8} {:>8}",
        "Ticker", "Days", "Txs", "Final", "Flipped", "Clamped"
    );
    println!("{}", "-".repeat(49));
    for t in &m.tickers {
        println!(
            "{:<8} {:>6} {:>6} {:>8} {:>8} {:>8}",
            t.ticker,
            t.trading_days,
            t.transactions,
            t.repair.final_holding,
            t.repair.flipped_to_buy,
            t.repair.clamped
        );
    }
}
