//! Config validation: raw TOML values into typed configs, and range checks on typed configs.
//!
//! Two failure kinds:
//! - `Shape`: the input is not a table, or a table's key set is not exactly the
//!   required set (missing or unknown keys, duplicate tickers).
//! - `Range`: a field has the wrong scalar type or lies outside its domain
//!   (negative count, probability outside [0, 1], `min > max`, ...).
//!
//! Everything here runs before any sampling; the generator never sees an
//! unvalidated config.

use crate::domain::{GenerationParams, StockConfig, StockSet};
use chrono::NaiveDate;
use thiserror::Error;
use toml::Value;

/// Validation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("shape error: {0}")]
    Shape(String),

    #[error("range error: {0}")]
    Range(String),
}

impl ConfigError {
    pub fn is_shape(&self) -> bool {
        matches!(self, ConfigError::Shape(_))
    }

    pub fn is_range(&self) -> bool {
        matches!(self, ConfigError::Range(_))
    }
}

/// Exact key set of a per-ticker stock table.
pub const STOCK_KEYS: [&str; 6] = [
    "force_final_sale",
    "initial_holding",
    "initial_value",
    "max_trade_qty",
    "min_trade_qty",
    "step",
];

/// Keys that must be present in the generation table.
pub const PARAM_KEYS_REQUIRED: [&str; 8] = [
    "buy_prob",
    "max_tx_count",
    "min_tx_count",
    "period_end",
    "period_start",
    "same_day_max",
    "same_day_min",
    "same_day_prob",
];

/// Keys that may be present in the generation table.
pub const PARAM_KEYS_OPTIONAL: [&str; 1] = ["fee_rate"];

// ─── Raw input ──────────────────────────────────────────────────────

/// Convert a JSON document into the raw form the validators accept.
pub fn raw_from_json(value: &serde_json::Value) -> Result<Value, ConfigError> {
    Value::try_from(value).map_err(|e| ConfigError::Shape(format!("unsupported JSON value: {e}")))
}

/// Validate a table of `ticker -> stock table` into an ordered [`StockSet`].
pub fn validate_stock_set(raw: &Value) -> Result<StockSet, ConfigError> {
    let table = raw
        .as_table()
        .ok_or_else(|| ConfigError::Shape("stock config is not a table".into()))?;

    let mut set = StockSet::new();
    for (ticker, entry) in table {
        if ticker.trim().is_empty() {
            return Err(ConfigError::Shape("empty ticker name".into()));
        }
        if set.get(ticker).is_some() {
            return Err(ConfigError::Shape(format!("duplicate ticker '{ticker}'")));
        }
        let config = validate_stock_config(ticker, entry)?;
        set.insert(ticker.clone(), config);
    }
    Ok(set)
}

/// Validate one ticker's stock table.
pub fn validate_stock_config(ticker: &str, raw: &Value) -> Result<StockConfig, ConfigError> {
    let table = raw
        .as_table()
        .ok_or_else(|| ConfigError::Shape(format!("details for {ticker} are not a table")))?;

    let mut missing: Vec<&str> = STOCK_KEYS
        .iter()
        .copied()
        .filter(|k| !table.contains_key(*k))
        .collect();
    let mut extra: Vec<&str> = table
        .keys()
        .map(String::as_str)
        .filter(|k| !STOCK_KEYS.contains(k))
        .collect();
    if !missing.is_empty() || !extra.is_empty() {
        missing.sort_unstable();
        extra.sort_unstable();
        return Err(ConfigError::Shape(format!(
            "details for {ticker} do not match the required fields (missing: [{}], unexpected: [{}])",
            missing.join(", "),
            extra.join(", ")
        )));
    }

    let field = |key: &str| format!("{ticker}.{key}");
    let config = StockConfig {
        initial_holding: non_negative_int(&table["initial_holding"], &field("initial_holding"))?,
        initial_value: non_negative_number(&table["initial_value"], &field("initial_value"))?,
        min_trade_qty: non_negative_int(&table["min_trade_qty"], &field("min_trade_qty"))?,
        max_trade_qty: non_negative_int(&table["max_trade_qty"], &field("max_trade_qty"))?,
        step: non_negative_int(&table["step"], &field("step"))?,
        force_final_sale: boolean(&table["force_final_sale"], &field("force_final_sale"))?,
    };
    config.validate(ticker)?;
    Ok(config)
}

/// Validate the run-wide generation table.
pub fn validate_generation_params(raw: &Value) -> Result<GenerationParams, ConfigError> {
    let table = raw
        .as_table()
        .ok_or_else(|| ConfigError::Shape("generation parameters are not a table".into()))?;

    let missing: Vec<&str> = PARAM_KEYS_REQUIRED
        .iter()
        .copied()
        .filter(|k| !table.contains_key(*k))
        .collect();
    let extra: Vec<&str> = table
        .keys()
        .map(String::as_str)
        .filter(|k| !PARAM_KEYS_REQUIRED.contains(k) && !PARAM_KEYS_OPTIONAL.contains(k))
        .collect();
    if !missing.is_empty() || !extra.is_empty() {
        return Err(ConfigError::Shape(format!(
            "generation parameters do not match the required fields (missing: [{}], unexpected: [{}])",
            missing.join(", "),
            extra.join(", ")
        )));
    }

    let params = GenerationParams {
        min_tx_count: non_negative_int(&table["min_tx_count"], "min_tx_count")?,
        max_tx_count: non_negative_int(&table["max_tx_count"], "max_tx_count")?,
        same_day_prob: probability(&table["same_day_prob"], "same_day_prob")?,
        same_day_min: non_negative_int(&table["same_day_min"], "same_day_min")?,
        same_day_max: non_negative_int(&table["same_day_max"], "same_day_max")?,
        buy_prob: probability(&table["buy_prob"], "buy_prob")?,
        fee_rate: table
            .get("fee_rate")
            .map(|v| probability(v, "fee_rate"))
            .transpose()?,
        period_start: date(&table["period_start"], "period_start")?,
        period_end: date(&table["period_end"], "period_end")?,
    };
    params.validate()?;
    Ok(params)
}

// ─── Typed checks ───────────────────────────────────────────────────

impl StockConfig {
    /// Range checks on an already-typed stock config.
    pub fn validate(&self, ticker: &str) -> Result<(), ConfigError> {
        if !self.initial_value.is_finite() || self.initial_value < 0.0 {
            return Err(ConfigError::Range(format!(
                "{ticker}.initial_value must be a non-negative number, got {}",
                self.initial_value
            )));
        }
        if self.min_trade_qty == 0 {
            return Err(ConfigError::Range(format!("{ticker}.min_trade_qty must be positive")));
        }
        if self.step == 0 {
            return Err(ConfigError::Range(format!("{ticker}.step must be positive")));
        }
        if self.min_trade_qty > self.max_trade_qty {
            return Err(ConfigError::Range(format!(
                "{ticker}.min_trade_qty ({}) exceeds max_trade_qty ({})",
                self.min_trade_qty, self.max_trade_qty
            )));
        }
        if (self.max_trade_qty - self.min_trade_qty) % self.step != 0 {
            return Err(ConfigError::Range(format!(
                "{ticker}: trade range {}..={} is not a multiple of step {}",
                self.min_trade_qty, self.max_trade_qty, self.step
            )));
        }
        Ok(())
    }
}

impl GenerationParams {
    /// Range checks on already-typed generation parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability(self.same_day_prob, "same_day_prob")?;
        check_probability(self.buy_prob, "buy_prob")?;
        if let Some(fee) = self.fee_rate {
            check_probability(fee, "fee_rate")?;
        }
        if self.min_tx_count == 0 {
            return Err(ConfigError::Range("min_tx_count must be positive".into()));
        }
        if self.min_tx_count > self.max_tx_count {
            return Err(ConfigError::Range(format!(
                "min_tx_count ({}) exceeds max_tx_count ({})",
                self.min_tx_count, self.max_tx_count
            )));
        }
        if self.same_day_min == 0 || self.same_day_max == 0 {
            return Err(ConfigError::Range("same-day cluster bounds must be positive".into()));
        }
        if self.same_day_min > self.same_day_max {
            return Err(ConfigError::Range(format!(
                "same_day_min ({}) exceeds same_day_max ({})",
                self.same_day_min, self.same_day_max
            )));
        }
        if self.period_start >= self.period_end {
            return Err(ConfigError::Range(format!(
                "period_start ({}) must be before period_end ({})",
                self.period_start, self.period_end
            )));
        }
        Ok(())
    }
}

/// Validate a whole typed configuration: parameters first, then each stock.
pub fn validate_all(stocks: &StockSet, params: &GenerationParams) -> Result<(), ConfigError> {
    params.validate()?;
    for (ticker, config) in stocks.iter() {
        config.validate(ticker)?;
        check_holding_bound(ticker, config, params.max_tx_count)?;
    }
    Ok(())
}

/// The largest reachable holding, `initial_holding + max_tx_count * max_trade_qty`,
/// must fit a signed share count.
fn check_holding_bound(
    ticker: &str,
    config: &StockConfig,
    max_tx_count: u64,
) -> Result<(), ConfigError> {
    let peak = max_tx_count
        .checked_mul(config.max_trade_qty)
        .and_then(|bought| bought.checked_add(config.initial_holding))
        .filter(|peak| i64::try_from(*peak).is_ok());
    match peak {
        Some(_) => Ok(()),
        None => Err(ConfigError::Range(format!(
            "{ticker}: initial_holding {} plus {} trades of up to {} shares exceeds {}",
            config.initial_holding,
            max_tx_count,
            config.max_trade_qty,
            i64::MAX
        ))),
    }
}

// ─── Scalar helpers ─────────────────────────────────────────────────

fn non_negative_int(value: &Value, name: &str) -> Result<u64, ConfigError> {
    match value {
        Value::Integer(i) if *i >= 0 => Ok(*i as u64),
        Value::Integer(i) => Err(ConfigError::Range(format!(
            "{name} must be non-negative, got {i}"
        ))),
        other => Err(ConfigError::Range(format!(
            "{name} must be an integer, got {}",
            other.type_str()
        ))),
    }
}

fn non_negative_number(value: &Value, name: &str) -> Result<f64, ConfigError> {
    let n = number(value, name)?;
    if n >= 0.0 {
        Ok(n)
    } else {
        Err(ConfigError::Range(format!("{name} must be at or above zero, got {n}")))
    }
}

fn probability(value: &Value, name: &str) -> Result<f64, ConfigError> {
    let p = number(value, name)?;
    check_probability(p, name)?;
    Ok(p)
}

fn check_probability(p: f64, name: &str) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ConfigError::Range(format!("{name} is not a valid probability: {p}")))
    }
}

fn number(value: &Value, name: &str) -> Result<f64, ConfigError> {
    match value {
        Value::Integer(i) => Ok(*i as f64),
        Value::Float(f) if f.is_finite() => Ok(*f),
        Value::Float(f) => Err(ConfigError::Range(format!("{name} must be finite, got {f}"))),
        other => Err(ConfigError::Range(format!(
            "{name} must be numeric, got {}",
            other.type_str()
        ))),
    }
}

fn boolean(value: &Value, name: &str) -> Result<bool, ConfigError> {
    value.as_bool().ok_or_else(|| {
        ConfigError::Range(format!("{name} must be a boolean, got {}", value.type_str()))
    })
}

fn date(value: &Value, name: &str) -> Result<NaiveDate, ConfigError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Datetime(dt) => match (dt.date, dt.time) {
            (Some(d), None) => d.to_string(),
            _ => {
                return Err(ConfigError::Range(format!(
                    "{name} must be a plain date, got {dt}"
                )))
            }
        },
        other => {
            return Err(ConfigError::Range(format!(
                "{name} must be a date, got {}",
                other.type_str()
            )))
        }
    };
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map_err(|e| ConfigError::Range(format!("{name}: invalid date '{text}': {e}")))
}
