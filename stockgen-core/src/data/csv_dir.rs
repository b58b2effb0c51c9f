//! CSV directory provider: one `<TICKER>.csv` file per ticker.
//!
//! Headers are matched case-insensitively, so both a plain
//! `date,open,high,low,close,volume` file and a Yahoo-style
//! `Date,Open,High,Low,Close,Adj Close,Volume` download load as-is.
//! Only `date`, `low` and `high` are required; other columns default.

use super::provider::{DataError, DataSource, MarketDataProvider, RawBar};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Reads price history from a directory of per-ticker CSV files.
#[derive(Debug, Clone)]
pub struct CsvDirProvider {
    dir: PathBuf,
}

struct ColumnMap {
    date: usize,
    low: usize,
    high: usize,
    open: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord, source_name: &str) -> Result<Self, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| DataError::Malformed {
                source_name: source_name.to_string(),
                reason: format!("missing '{name}' column"),
            })
        };
        Ok(Self {
            date: require("date")?,
            low: require("low")?,
            high: require("high")?,
            open: find("open"),
            close: find("close"),
            volume: find("volume"),
        })
    }
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }

    fn read_file(path: &Path) -> Result<Vec<RawBar>, DataError> {
        let source_name = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataError::Io {
                path: source_name.clone(),
                reason: e.to_string(),
            })?;

        let headers = reader.headers().map_err(|e| DataError::Malformed {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;
        let cols = ColumnMap::from_headers(headers, &source_name)?;

        let mut bars = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| DataError::Malformed {
                source_name: source_name.clone(),
                reason: e.to_string(),
            })?;
            let malformed = |what: &str| DataError::Malformed {
                source_name: source_name.clone(),
                reason: format!("row {}: {what}", line + 1),
            };

            let date_text = record.get(cols.date).unwrap_or_default();
            // Accept both plain dates and datetime stamps; only the date part matters.
            let date_part = date_text.get(..10).unwrap_or(date_text);
            let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map_err(|_| malformed(&format!("invalid date '{date_text}'")))?;

            let price = |idx: Option<usize>| -> Result<f64, DataError> {
                match idx.and_then(|i| record.get(i)) {
                    None | Some("") | Some("null") => Ok(f64::NAN),
                    Some(text) => text
                        .parse::<f64>()
                        .map_err(|_| malformed(&format!("invalid number '{text}'"))),
                }
            };

            bars.push(RawBar {
                date,
                open: price(cols.open)?,
                high: price(Some(cols.high))?,
                low: price(Some(cols.low))?,
                close: price(cols.close)?,
                volume: cols
                    .volume
                    .and_then(|i| record.get(i))
                    .and_then(|v| v.parse::<f64>().ok())
                    .map(|v| v.max(0.0) as u64)
                    .unwrap_or(0),
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl MarketDataProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_directory"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let path = self.path_for(ticker);
        if !path.exists() {
            return Ok(Vec::new());
        }
        Ok(Self::read_file(&path)?
            .into_iter()
            .filter(|b| (start..end).contains(&b.date))
            .collect())
    }
}
