//! Synthetic price history for offline runs and tests.
//!
//! Each weekday gets a mid price from a multiplicative random walk and a
//! low/high range around it sized by a per-ticker volatility. Open and close
//! fall inside that range. The walk is seeded from the ticker name, so the
//! same ticker always gets the same history regardless of the generator's
//! own seed.

use super::provider::{DataError, DataSource, MarketDataProvider, RawBar};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random-walk provider. Tickers listed as unlisted return an empty history.
#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    unlisted: Vec<String>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat these tickers as unknown instruments.
    pub fn with_unlisted<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unlisted.extend(tickers.into_iter().map(Into::into));
        self
    }

    fn rng_for(ticker: &str) -> StdRng {
        let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
        StdRng::from_seed(seed)
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        if self.unlisted.iter().any(|t| t == ticker) {
            return Ok(Vec::new());
        }

        let mut rng = Self::rng_for(ticker);
        let volatility = rng.gen_range(0.005..0.025);
        let mut mid = 100.0 * rng.gen_range(0.5..2.0);

        let bars: Vec<RawBar> = start
            .iter_days()
            .take_while(|day| *day < end)
            .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|date| {
                mid *= 1.0 + rng.gen_range(-volatility..volatility);
                // Intraday range around the mid price, at most two volatilities wide.
                let half_range = mid * volatility * rng.gen_range(0.2..1.0);
                let (low, high) = (mid - half_range, mid + half_range);
                RawBar {
                    date,
                    open: rng.gen_range(low..=high),
                    high,
                    low,
                    close: rng.gen_range(low..=high),
                    volume: rng.gen_range(100_000..2_000_000),
                }
            })
            .collect();

        Ok(bars)
    }
}
