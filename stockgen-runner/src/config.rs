//! Generation config files.
//!
//! A config file holds the run-wide parameters and the ordered stock set:
//!
//! ```toml
//! [params]
//! min_tx_count = 2
//! max_tx_count = 100
//! same_day_prob = 0.1
//! same_day_min = 2
//! same_day_max = 5
//! buy_prob = 0.5
//! fee_rate = 0.01
//! period_start = 2023-04-06
//! period_end = 2024-04-05
//!
//! [stocks.META]
//! initial_holding = 0
//! initial_value = 0.0
//! min_trade_qty = 10
//! max_trade_qty = 50
//! step = 10
//! force_final_sale = true
//! ```
//!
//! `[params]` may be omitted, in which case the defaults apply. Both tables go
//! through the core validator, so key sets are exact and ranges are checked
//! before anything is generated. Files ending in `.json` are read as JSON with
//! the same layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stockgen_core::domain::{GenerationParams, StockConfig, StockSet, TaxYear};
use stockgen_core::validate::{
    raw_from_json, validate_all, validate_generation_params, validate_stock_set,
};
use stockgen_core::ConfigError;
use thiserror::Error;
use toml::value::{Date, Datetime};
use toml::{Table, Value};

/// Errors from loading or rendering a config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render TOML: {0}")]
    Render(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Complete input for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub params: GenerationParams,
    pub stocks: StockSet,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            params: GenerationParams::default(),
            stocks: StockSet::default_set(),
        }
    }
}

impl GenerationConfig {
    /// Load a config file. `.json` files are parsed as JSON, everything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigFileError> {
        let table: Table = text.parse()?;
        Ok(Self::from_raw(&Value::Table(table))?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigFileError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::from_raw(&raw_from_json(&json)?)?)
    }

    /// Validate a raw document with `params` (optional) and `stocks` tables.
    pub fn from_raw(raw: &Value) -> Result<Self, ConfigError> {
        let root = raw
            .as_table()
            .ok_or_else(|| ConfigError::Shape("config document is not a table".into()))?;

        let unexpected: Vec<&str> = root
            .keys()
            .map(String::as_str)
            .filter(|k| *k != "params" && *k != "stocks")
            .collect();
        if !unexpected.is_empty() {
            return Err(ConfigError::Shape(format!(
                "unexpected top-level keys: [{}]",
                unexpected.join(", ")
            )));
        }

        let stocks = root
            .get("stocks")
            .ok_or_else(|| ConfigError::Shape("missing [stocks] table".into()))
            .and_then(validate_stock_set)?;
        let params = match root.get("params") {
            Some(raw) => validate_generation_params(raw)?,
            None => GenerationParams::default(),
        };

        let config = Self { params, stocks };
        config.validate()?;
        Ok(config)
    }

    /// Re-check a config that may have been modified after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_all(&self.stocks, &self.params)
    }

    /// Move the generation period to a UK tax year.
    pub fn with_tax_year(mut self, tax_year: TaxYear) -> Self {
        self.params = self.params.with_tax_years(tax_year);
        self
    }

    /// Render as a TOML document that [`GenerationConfig::from_toml_str`] accepts.
    pub fn to_toml_string(&self) -> Result<String, ConfigFileError> {
        let mut stocks = Table::new();
        for (ticker, config) in self.stocks.iter() {
            stocks.insert(ticker.to_string(), Value::Table(stock_table(ticker, config)?));
        }

        let mut root = Table::new();
        root.insert("params".into(), Value::Table(params_table(&self.params)?));
        root.insert("stocks".into(), Value::Table(stocks));
        Ok(toml::to_string_pretty(&root)?)
    }

    /// BLAKE3 fingerprint of everything that affects the generated table.
    ///
    /// Two configs with the same fingerprint, run with the same seed against
    /// the same price data, produce the same table.
    pub fn fingerprint(&self) -> String {
        let p = &self.params;
        let mut hasher = blake3::Hasher::new();
        for v in [p.min_tx_count, p.max_tx_count, p.same_day_min, p.same_day_max] {
            hasher.update(&v.to_le_bytes());
        }
        for v in [p.same_day_prob, p.buy_prob, p.fee()] {
            hasher.update(&v.to_bits().to_le_bytes());
        }
        hasher.update(p.period_start.to_string().as_bytes());
        hasher.update(p.period_end.to_string().as_bytes());

        for (ticker, c) in self.stocks.iter() {
            hasher.update(ticker.as_bytes());
            hasher.update(&[0]);
            for v in [c.initial_holding, c.min_trade_qty, c.max_trade_qty, c.step] {
                hasher.update(&v.to_le_bytes());
            }
            hasher.update(&c.initial_value.to_bits().to_le_bytes());
            hasher.update(&[c.force_final_sale as u8]);
        }
        hasher.finalize().to_hex().to_string()
    }
}

// ─── TOML rendering ─────────────────────────────────────────────────

fn params_table(p: &GenerationParams) -> Result<Table, ConfigError> {
    let mut t = Table::new();
    t.insert("min_tx_count".into(), int(p.min_tx_count, "min_tx_count")?);
    t.insert("max_tx_count".into(), int(p.max_tx_count, "max_tx_count")?);
    t.insert("same_day_prob".into(), Value::Float(p.same_day_prob));
    t.insert("same_day_min".into(), int(p.same_day_min, "same_day_min")?);
    t.insert("same_day_max".into(), int(p.same_day_max, "same_day_max")?);
    t.insert("buy_prob".into(), Value::Float(p.buy_prob));
    if let Some(fee) = p.fee_rate {
        t.insert("fee_rate".into(), Value::Float(fee));
    }
    t.insert("period_start".into(), date(p.period_start));
    t.insert("period_end".into(), date(p.period_end));
    Ok(t)
}

fn stock_table(ticker: &str, c: &StockConfig) -> Result<Table, ConfigError> {
    let field = |key: &str| format!("{ticker}.{key}");
    let mut t = Table::new();
    t.insert(
        "initial_holding".into(),
        int(c.initial_holding, &field("initial_holding"))?,
    );
    t.insert("initial_value".into(), Value::Float(c.initial_value));
    t.insert(
        "min_trade_qty".into(),
        int(c.min_trade_qty, &field("min_trade_qty"))?,
    );
    t.insert(
        "max_trade_qty".into(),
        int(c.max_trade_qty, &field("max_trade_qty"))?,
    );
    t.insert("step".into(), int(c.step, &field("step"))?);
    t.insert("force_final_sale".into(), Value::Boolean(c.force_final_sale));
    Ok(t)
}

fn int(v: u64, name: &str) -> Result<Value, ConfigError> {
    i64::try_from(v)
        .map(Value::Integer)
        .map_err(|_| ConfigError::Range(format!("{name} is too large for TOML: {v}")))
}

fn date(d: chrono::NaiveDate) -> Value {
    use chrono::Datelike;
    Value::Datetime(Datetime {
        date: Some(Date {
            year: d.year() as u16,
            month: d.month() as u8,
            day: d.day() as u8,
        }),
        time: None,
        offset: None,
    })
}
