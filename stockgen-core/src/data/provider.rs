//! Market data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over history sources (Yahoo Finance,
//! a directory of CSV files, synthetic data) so the generator can be driven
//! offline and mocked in tests. An empty history is a normal provider result;
//! deciding that it means "no such instrument" is the calendar adapter's job.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Raw daily bar from a provider (before calendar filtering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Structured error types for provider operations.
///
/// These are designed to be displayable in CLI output.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("I/O error reading {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed price data in {source_name}: {reason}")]
    Malformed { source_name: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Where a history came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
    InMemory,
}

/// Source of daily price history.
///
/// Implementations return bars in ascending date order, restricted to
/// `start..end`: the end date itself is excluded. No data for the ticker/period is `Ok(vec![])`, not an error.
pub trait MarketDataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Which kind of source this is, for run manifests.
    fn source(&self) -> DataSource;

    /// Fetch daily bars for a ticker over a date range.
    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError>;
}

/// Provider backed by fixed per-ticker bar lists.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    bars: HashMap<String, Vec<RawBar>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, ticker: impl Into<String>, bars: Vec<RawBar>) -> Self {
        self.bars.insert(ticker.into(), bars);
        self
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn source(&self) -> DataSource {
        DataSource::InMemory
    }

    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        Ok(self
            .bars
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| (start..end).contains(&b.date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn bar(d: u32, low: f64, high: f64) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            open: low,
            high,
            low,
            close: high,
            volume: 1_000,
        }
    }

    #[test]
    fn in_memory_filters_period() {
        let provider = InMemoryProvider::new().with_bars("SPY", vec![bar(2, 1.0, 2.0), bar(3, 1.0, 2.0), bar(4, 1.0, 2.0)]);
        let bars = provider
            .get_history(
                "SPY",
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )
            .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn end_date_is_excluded() {
        let provider = InMemoryProvider::new().with_bars("SPY", vec![bar(2, 1.0, 2.0), bar(3, 1.0, 2.0), bar(4, 1.0, 2.0)]);
        let bars = provider
            .get_history(
                "SPY",
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            )
            .unwrap();
        let dates: Vec<u32> = bars.iter().map(|b| b.date.day()).collect();
        assert_eq!(dates, vec![2, 3]);
    }

    #[test]
    fn unknown_ticker_is_empty_not_error() {
        let provider = InMemoryProvider::new();
        let bars = provider
            .get_history(
                "ZZZZ",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            )
            .unwrap();
        assert!(bars.is_empty());
    }
}
