//! Generation runner — wires config, provider, seed and the core generator.
//!
//! Two entry points:
//! - `run_generation()`: takes an already-built provider. Used by tests and embedders.
//! - `run_with_source()`: builds the provider from [`SourceOptions`]. Used by the CLI.
//!
//! Every run produces a [`RunManifest`] recording the seed and config
//! fingerprint, so any table can be regenerated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stockgen_core::data::{DataSource, MarketDataProvider};
use stockgen_core::domain::TransactionTable;
use stockgen_core::rng::RunSeed;
use stockgen_core::{generate_detailed, ConfigError, GenerateError, TickerSummary};
use thiserror::Error;
use tracing::info;

use crate::config::GenerationConfig;
use crate::source::{build_provider, SourceError, SourceOptions};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),
}

/// Current schema version for persisted manifests.
pub const SCHEMA_VERSION: u32 = 1;

/// What was generated, from what, and how to get it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub seed: u64,
    pub config_fingerprint: String,
    pub provider: String,
    pub source: DataSource,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub fee_rate: f64,
    pub total_transactions: usize,
    pub tickers: Vec<TickerSummary>,
    /// Local wall-clock time of the run, RFC 3339.
    pub generated_at: String,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Table plus manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub table: TransactionTable,
    pub manifest: RunManifest,
}

/// Run a generation against an existing provider.
pub fn run_generation(
    config: &GenerationConfig,
    provider: &dyn MarketDataProvider,
    seed: RunSeed,
) -> Result<RunResult, RunError> {
    config.validate()?;

    let fingerprint = config.fingerprint();
    info!(
        seed = seed.value(),
        fingerprint = %fingerprint,
        provider = provider.name(),
        tickers = config.stocks.len(),
        "starting generation"
    );

    let mut rng = seed.rng();
    let generation = generate_detailed(&config.stocks, &config.params, provider, &mut rng)?;

    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        seed: seed.value(),
        config_fingerprint: fingerprint,
        provider: provider.name().to_string(),
        source: provider.source(),
        period_start: config.params.period_start,
        period_end: config.params.period_end,
        fee_rate: config.params.fee(),
        total_transactions: generation.table.len(),
        tickers: generation.summaries,
        generated_at: chrono::Local::now().to_rfc3339(),
    };

    Ok(RunResult {
        table: generation.table,
        manifest,
    })
}

/// Build the provider for `source` and run. Without a seed, one is drawn from
/// OS entropy and recorded in the manifest.
pub fn run_with_source(
    config: &GenerationConfig,
    source: &SourceOptions,
    seed: Option<RunSeed>,
) -> Result<RunResult, RunError> {
    config.validate()?;
    let provider = build_provider(source)?;
    let seed = seed.unwrap_or_else(RunSeed::from_entropy);
    run_generation(config, provider.as_ref(), seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockgen_core::data::SyntheticProvider;

    #[test]
    fn manifest_records_seed_and_fingerprint() {
        let config = GenerationConfig::default();
        let result =
            run_generation(&config, &SyntheticProvider::new(), RunSeed::fixed(17)).unwrap();

        let m = &result.manifest;
        assert_eq!(m.schema_version, SCHEMA_VERSION);
        assert_eq!(m.seed, 17);
        assert_eq!(m.config_fingerprint, config.fingerprint());
        assert_eq!(m.source, DataSource::Synthetic);
        assert_eq!(m.total_transactions, result.table.len());
        assert_eq!(m.tickers.len(), 2);
        assert!((m.fee_rate - 0.01).abs() < 1e-12);
    }

    #[test]
    fn same_seed_same_table() {
        let config = GenerationConfig::default();
        let provider = SyntheticProvider::new();
        let a = run_generation(&config, &provider, RunSeed::fixed(5)).unwrap();
        let b = run_generation(&config, &provider, RunSeed::fixed(5)).unwrap();
        assert_eq!(a.table, b.table);
    }

    #[test]
    fn invalid_config_is_a_config_error() {
        let mut config = GenerationConfig::default();
        config.params.same_day_min = 6;
        let err = run_generation(&config, &SyntheticProvider::new(), RunSeed::fixed(0))
            .unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::Range(_))));
    }

    #[test]
    fn invalid_config_fails_before_provider_setup() {
        let mut config = GenerationConfig::default();
        config.params.buy_prob = -0.1;
        // A csv source without a directory would fail with a source error.
        let source = SourceOptions {
            kind: crate::source::SourceKind::Csv,
            csv_dir: None,
        };
        let err = run_with_source(&config, &source, None).unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[test]
    fn unlisted_ticker_aborts_the_run() {
        let provider = SyntheticProvider::new().with_unlisted(["TSLA"]);
        let err = run_generation(&GenerationConfig::default(), &provider, RunSeed::fixed(1))
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Generate(GenerateError::NoSuchInstrument { .. })
        ));
    }

    #[test]
    fn manifest_json_defaults_missing_schema_version() {
        let config = GenerationConfig::default();
        let result =
            run_generation(&config, &SyntheticProvider::new(), RunSeed::fixed(3)).unwrap();
        let mut json = serde_json::to_value(&result.manifest).unwrap();
        json.as_object_mut().unwrap().remove("schema_version");
        let back: RunManifest = serde_json::from_value(json).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
    }
}
