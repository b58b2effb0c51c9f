//! Yahoo Finance market data provider.
//!
//! Fetches daily bars from Yahoo's v8 chart API. Handles rate limiting,
//! retries with exponential backoff, response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.
//! The CSV directory provider is the fallback when Yahoo is unavailable.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataSource, MarketDataProvider, RawBar};
use chrono::{NaiveDate, NaiveTime};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const CHART_ENDPOINT: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    /// Build a provider with a 30 second request timeout.
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        Self::with_timeout(circuit_breaker, Duration::from_secs(30))
    }

    pub fn with_timeout(
        circuit_breaker: Arc<CircuitBreaker>,
        timeout: Duration,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Build the chart API URL for `start..end`, end day excluded.
    fn chart_url(ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let midnight = |d: NaiveDate| d.and_time(NaiveTime::MIN).and_utc().timestamp();
        let (start_ts, end_ts) = (midnight(start), midnight(end));
        format!(
            "{CHART_ENDPOINT}/{ticker}?period1={start_ts}&period2={end_ts}&interval=1d"
        )
    }

    /// Parse the chart API response into RawBars. "Not Found" is an empty history.
    fn parse_response(resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let Some(result) = resp.chart.result else {
            return match resp.chart.error {
                Some(err) if err.code == "Not Found" => Ok(Vec::new()),
                Some(err) => Err(DataError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                ))),
                None => Err(DataError::ResponseFormatChanged(
                    "chart has neither result nor error".into(),
                )),
            };
        };

        // A listed ticker with no trades in the window has no timestamps.
        let Some((timestamps, quote)) = result.into_iter().next().and_then(|data| {
            let quote = data.indicators.quote.into_iter().next();
            data.timestamp.zip(quote)
        }) else {
            return Ok(Vec::new());
        };

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.into_iter().enumerate() {
            let (low, high) = (cell(&quote.low, i), cell(&quote.high, i));
            // Holidays come back as all-null rows; only the range matters here.
            if low.is_none() && high.is_none() {
                continue;
            }
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| DataError::ResponseFormatChanged(format!("bad timestamp {ts}")))?;

            bars.push(RawBar {
                date,
                open: cell(&quote.open, i).unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: cell(&quote.close, i).unwrap_or(f64::NAN),
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            });
        }
        Ok(bars)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt.saturating_sub(1))
    }

    /// One HTTP round trip, classified for the retry loop.
    fn attempt(&self, ticker: &str, url: &str) -> Attempt {
        let resp = match self.client.get(url).send() {
            Ok(resp) => resp,
            Err(e) if e.is_connect() || e.is_timeout() => {
                return Attempt::Retry(DataError::NetworkUnreachable(e.to_string()))
            }
            Err(e) => return Attempt::Done(Err(DataError::NetworkUnreachable(e.to_string()))),
        };

        match resp.status() {
            StatusCode::FORBIDDEN => {
                // Blocked outright; stop hitting the endpoint.
                self.circuit_breaker.trip();
                Attempt::Done(Err(DataError::CircuitBreakerTripped))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                self.circuit_breaker.record_failure();
                let retry_after_secs = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!(ticker, retry_after_secs, "rate limited by Yahoo");
                Attempt::Retry(DataError::RateLimited { retry_after_secs })
            }
            StatusCode::UNAUTHORIZED => Attempt::Done(Err(DataError::AuthenticationRequired(
                "Yahoo Finance requires authentication".into(),
            ))),
            StatusCode::NOT_FOUND => {
                self.circuit_breaker.record_success();
                Attempt::Done(Ok(Vec::new()))
            }
            status if !status.is_success() => {
                self.circuit_breaker.record_failure();
                Attempt::Retry(DataError::Other(format!("HTTP {status} for {ticker}")))
            }
            _ => {
                let parsed = resp
                    .json::<ChartResponse>()
                    .map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "unreadable chart for {ticker}: {e}"
                        ))
                    })
                    .and_then(Self::parse_response);
                if parsed.is_ok() {
                    self.circuit_breaker.record_success();
                }
                Attempt::Done(parsed)
            }
        }
    }

    fn fetch_with_retry(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let url = Self::chart_url(ticker, start, end);
        let mut last_error = DataError::Other("no request attempted".into());

        for attempt in 0..=self.max_retries {
            if !self.circuit_breaker.is_allowed() {
                warn!(
                    ticker,
                    cooldown = ?self.circuit_breaker.remaining_cooldown(),
                    "circuit breaker open, skipping request"
                );
                return Err(DataError::CircuitBreakerTripped);
            }
            if attempt > 0 {
                let delay = self.backoff(attempt);
                debug!(ticker, attempt, ?delay, "retrying Yahoo request");
                std::thread::sleep(delay);
            }
            match self.attempt(ticker, &url) {
                Attempt::Done(result) => return result,
                Attempt::Retry(err) => last_error = err,
            }
        }
        Err(last_error)
    }
}

fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

/// Outcome of a single request.
enum Attempt {
    Done(Result<Vec<RawBar>, DataError>),
    Retry(DataError),
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let bars = self.fetch_with_retry(ticker, start, end)?;
        Ok(bars
            .into_iter()
            .filter(|b| (start..end).contains(&b.date))
            .collect())
    }
}
