//! Typed generation configuration: per-stock parameters, run parameters, defaults.
//!
//! These structs replace ambient default dictionaries. They are passed
//! explicitly into the generator and validated before any sampling starts
//! (see [`crate::validate`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-ticker generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockConfig {
    /// Shares held before the first generated transaction.
    pub initial_holding: u64,
    /// Value of the initial holding. Informational only.
    pub initial_value: f64,
    pub min_trade_qty: u64,
    pub max_trade_qty: u64,
    /// Quantity grid step: quantities are `min_trade_qty + k * step`.
    pub step: u64,
    /// Force the last transaction to sell off the whole holding.
    pub force_final_sale: bool,
}

impl StockConfig {
    /// Number of points on the quantity grid.
    pub fn grid_len(&self) -> u64 {
        (self.max_trade_qty - self.min_trade_qty) / self.step.max(1) + 1
    }
}

/// Ordered set of tickers and their configs.
///
/// Processing order is insertion order, never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockSet {
    entries: Vec<(String, StockConfig)>,
}

impl StockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. A repeated ticker replaces the earlier config in place.
    pub fn with(mut self, ticker: impl Into<String>, config: StockConfig) -> Self {
        self.insert(ticker, config);
        self
    }

    pub fn insert(&mut self, ticker: impl Into<String>, config: StockConfig) {
        let ticker = ticker.into();
        match self.entries.iter_mut().find(|(t, _)| *t == ticker) {
            Some((_, existing)) => *existing = config,
            None => self.entries.push((ticker, config)),
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&StockConfig> {
        self.entries.iter().find(|(t, _)| t == ticker).map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StockConfig)> {
        self.entries.iter().map(|(t, c)| (t.as_str(), c))
    }

    pub fn tickers(&self) -> Vec<&str> {
        self.entries.iter().map(|(t, _)| t.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stock set used when the caller supplies none.
    pub fn default_set() -> Self {
        Self::new()
            .with(
                "META",
                StockConfig {
                    initial_holding: 0,
                    initial_value: 0.0,
                    min_trade_qty: 10,
                    max_trade_qty: 50,
                    step: 10,
                    force_final_sale: true,
                },
            )
            .with(
                "TSLA",
                StockConfig {
                    initial_holding: 0,
                    initial_value: 0.0,
                    min_trade_qty: 20,
                    max_trade_qty: 20,
                    step: 10,
                    force_final_sale: false,
                },
            )
    }
}

/// UK-style tax year span: 6 April of the start year to 5 April of the end year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYear {
    pub start_year: i32,
    pub end_year: i32,
}

impl TaxYear {
    /// Single tax year starting in `start_year`.
    pub fn starting(start_year: i32) -> Self {
        Self {
            start_year,
            end_year: start_year + 1,
        }
    }

    /// `(period_start, period_end)` for this span, or `None` for an out-of-range year.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.start_year, 4, 6)?;
        let end = NaiveDate::from_ymd_opt(self.end_year, 4, 5)?;
        Some((start, end))
    }
}

/// Run-wide generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub min_tx_count: u64,
    pub max_tx_count: u64,
    /// Probability that a sampled date starts a same-day cluster.
    pub same_day_prob: f64,
    pub same_day_min: u64,
    pub same_day_max: u64,
    pub buy_prob: f64,
    /// Proportional transaction fee. `None` means no fee.
    pub fee_rate: Option<f64>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

impl GenerationParams {
    /// Fee rate with an absent fee treated as zero.
    pub fn fee(&self) -> f64 {
        self.fee_rate.unwrap_or(0.0)
    }

    /// Replace the period with a tax-year span. Leaves the period unchanged if
    /// the years are out of range.
    pub fn with_tax_years(mut self, tax_year: TaxYear) -> Self {
        if let Some((start, end)) = tax_year.span() {
            self.period_start = start;
            self.period_end = end;
        }
        self
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        let base = Self {
            min_tx_count: 2,
            max_tx_count: 100,
            same_day_prob: 0.1,
            same_day_min: 2,
            same_day_max: 5,
            buy_prob: 0.5,
            fee_rate: Some(0.01),
            period_start: NaiveDate::MIN,
            period_end: NaiveDate::MIN,
        };
        base.with_tax_years(TaxYear::starting(2023))
    }
}
