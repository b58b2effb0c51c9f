//! Market data source selection.
//!
//! Maps a user-facing source choice onto a core provider:
//! - `yahoo` → Yahoo Finance chart API, guarded by a circuit breaker
//! - `csv` → a directory of `<TICKER>.csv` files
//! - `synthetic` → deterministic offline random walks

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stockgen_core::data::{
    CircuitBreaker, CsvDirProvider, DataError, MarketDataProvider, SyntheticProvider,
    YahooProvider,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unknown data source '{0}' (expected yahoo, csv or synthetic)")]
    Unknown(String),

    #[error("the csv source needs a directory (--csv-dir)")]
    MissingCsvDir,

    #[error("csv directory does not exist: {}", .0.display())]
    CsvDirNotFound(PathBuf),

    #[error("failed to set up provider: {0}")]
    Provider(#[from] DataError),
}

/// Which kind of provider to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Yahoo => "yahoo",
            SourceKind::Csv => "csv",
            SourceKind::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(SourceKind::Yahoo),
            "csv" => Ok(SourceKind::Csv),
            "synthetic" => Ok(SourceKind::Synthetic),
            other => Err(SourceError::Unknown(other.to_string())),
        }
    }
}

/// Source choice plus the settings it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    pub kind: SourceKind,
    /// Directory for the `csv` source.
    pub csv_dir: Option<PathBuf>,
}

impl SourceOptions {
    pub fn synthetic() -> Self {
        Self {
            kind: SourceKind::Synthetic,
            csv_dir: None,
        }
    }

    pub fn csv(dir: impl Into<PathBuf>) -> Self {
        Self {
            kind: SourceKind::Csv,
            csv_dir: Some(dir.into()),
        }
    }
}

/// Build the provider for `opts`.
pub fn build_provider(opts: &SourceOptions) -> Result<Box<dyn MarketDataProvider>, SourceError> {
    let provider: Box<dyn MarketDataProvider> = match opts.kind {
        SourceKind::Yahoo => {
            let breaker = Arc::new(CircuitBreaker::default_provider());
            Box::new(YahooProvider::new(breaker)?)
        }
        SourceKind::Csv => {
            let dir = opts.csv_dir.clone().ok_or(SourceError::MissingCsvDir)?;
            if !dir.is_dir() {
                return Err(SourceError::CsvDirNotFound(dir));
            }
            Box::new(CsvDirProvider::new(dir))
        }
        SourceKind::Synthetic => Box::new(SyntheticProvider::new()),
    };
    info!(source = %opts.kind, provider = provider.name(), "data source ready");
    Ok(provider)
}
