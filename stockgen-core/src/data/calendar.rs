//! Trading calendar adapter.
//!
//! Wraps one ticker's provider history into the ordered `(date, low, high)`
//! bars the samplers work from. An empty history (or one with no usable
//! bars) means the instrument does not exist for the period, which is fatal
//! for the whole run.

use super::provider::{DataError, MarketDataProvider, RawBar};
use crate::domain::PriceBar;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("no price data for '{ticker}' between {start} and {end}")]
    NoSuchInstrument {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Ordered trading days for one ticker over the requested period.
///
/// Bars keep the provider's order; that stored order is what the nearest-date
/// tie-break refers to.
#[derive(Debug, Clone)]
pub struct TradingCalendar {
    period_start: NaiveDate,
    period_end: NaiveDate,
    bars: Vec<PriceBar>,
}

impl TradingCalendar {
    /// Fetch history from the provider and build the calendar.
    pub fn fetch(
        provider: &dyn MarketDataProvider,
        ticker: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Self, CalendarError> {
        let raw = provider.get_history(ticker, period_start, period_end)?;
        debug!(
            ticker,
            provider = provider.name(),
            bars = raw.len(),
            "fetched price history"
        );
        Self::from_raw(ticker, period_start, period_end, &raw)
    }

    /// Build a calendar from raw bars, dropping bars without a usable low/high range.
    pub fn from_raw(
        ticker: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
        raw: &[RawBar],
    ) -> Result<Self, CalendarError> {
        let mut bars = Vec::with_capacity(raw.len());
        for r in raw {
            let bar = PriceBar::new(r.date, r.low, r.high);
            if bar.is_sane() {
                bars.push(bar);
            } else {
                warn!(ticker, date = %r.date, low = r.low, high = r.high, "dropping unusable bar");
            }
        }
        Self::from_bars(ticker, period_start, period_end, bars)
    }

    /// Build a calendar from already-clean bars.
    pub fn from_bars(
        ticker: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
        bars: Vec<PriceBar>,
    ) -> Result<Self, CalendarError> {
        if bars.is_empty() {
            return Err(CalendarError::NoSuchInstrument {
                ticker: ticker.to_string(),
                start: period_start,
                end: period_end,
            });
        }
        Ok(Self {
            period_start,
            period_end,
            bars,
        })
    }

    pub fn period_start(&self) -> NaiveDate {
        self.period_start
    }

    pub fn period_end(&self) -> NaiveDate {
        self.period_end
    }

    /// Bar at a calendar index. Indices come from [`Self::nearest_index`].
    pub fn bar(&self, index: usize) -> &PriceBar {
        &self.bars[index]
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Index of the bar closest to `date` in whole days.
    ///
    /// Ties go to the first such bar in stored order, not to the earliest date.
    pub fn nearest_index(&self, date: NaiveDate) -> usize {
        debug_assert!(!self.is_empty());
        self.bars
            .iter()
            .enumerate()
            .min_by_key(|(_, bar)| (bar.date - date).num_days().abs())
            .map_or(0, |(i, _)| i)
    }
}
