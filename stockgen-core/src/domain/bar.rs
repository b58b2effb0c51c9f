//! PriceBar — one trading day's low/high range for one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Low/high range for a single ticker on a single trading day.
///
/// Built by the trading calendar adapter from provider bars; immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub low: f64,
    pub high: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, low: f64, high: f64) -> Self {
        Self { date, low, high }
    }

    /// True if both bounds are finite, non-negative and `low <= high`.
    pub fn is_sane(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low >= 0.0 && self.low <= self.high
    }

    /// Width of the day's range.
    pub fn spread(&self) -> f64 {
        self.high - self.low
    }
}
