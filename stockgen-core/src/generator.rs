//! Generator orchestrator — drives the per-ticker pipeline and builds the table.
//!
//! Per ticker, in configured order:
//! calendar fetch → target count → date sampling → prices → sides/quantities
//! → stable sort by date → balance repair → settlement.
//!
//! Validation runs before the first fetch. A ticker with no price data aborts
//! the whole run; no partial table is ever returned.

use crate::data::{CalendarError, DataError, MarketDataProvider, TradingCalendar};
use crate::domain::{
    GenerationParams, StockConfig, StockSet, Transaction, TransactionSlot, TransactionTable,
};
use crate::repair::{repair_balances, RepairReport};
use crate::sampling::{
    sample_dates, sample_prices, sample_quantities, sample_sides, ClusterPolicy,
};
use crate::settlement::settle;
use crate::validate::{validate_all, ConfigError};
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("no such instrument: no price data for '{ticker}' between {start} and {end}")]
    NoSuchInstrument {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("market data error for '{ticker}': {source}")]
    Data {
        ticker: String,
        #[source]
        source: DataError,
    },
}

impl GenerateError {
    fn from_calendar(ticker: &str, err: CalendarError) -> Self {
        match err {
            CalendarError::NoSuchInstrument { ticker, start, end } => {
                GenerateError::NoSuchInstrument { ticker, start, end }
            }
            CalendarError::Data(source) => GenerateError::Data {
                ticker: ticker.to_string(),
                source,
            },
        }
    }
}

/// Per-ticker outcome, for run summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub trading_days: usize,
    pub transactions: usize,
    pub initial_holding: u64,
    pub repair: RepairReport,
}

/// Table plus per-ticker summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub table: TransactionTable,
    pub summaries: Vec<TickerSummary>,
}

/// Generate the transaction table for every configured stock.
pub fn generate<R: Rng + ?Sized>(
    stocks: &StockSet,
    params: &GenerationParams,
    provider: &dyn MarketDataProvider,
    rng: &mut R,
) -> Result<TransactionTable, GenerateError> {
    generate_detailed(stocks, params, provider, rng).map(|g| g.table)
}

/// Same as [`generate`], also returning what happened per ticker.
pub fn generate_detailed<R: Rng + ?Sized>(
    stocks: &StockSet,
    params: &GenerationParams,
    provider: &dyn MarketDataProvider,
    rng: &mut R,
) -> Result<Generation, GenerateError> {
    validate_all(stocks, params)?;

    let mut table = TransactionTable::new();
    let mut summaries = Vec::with_capacity(stocks.len());

    for (ticker, config) in stocks.iter() {
        let calendar =
            TradingCalendar::fetch(provider, ticker, params.period_start, params.period_end)
                .map_err(|e| GenerateError::from_calendar(ticker, e))?;

        let (transactions, repair) = generate_for_calendar(ticker, config, params, &calendar, rng);

        info!(
            ticker,
            transactions = transactions.len(),
            final_holding = repair.final_holding,
            "generated transactions"
        );

        summaries.push(TickerSummary {
            ticker: ticker.to_string(),
            trading_days: calendar.len(),
            transactions: transactions.len(),
            initial_holding: config.initial_holding,
            repair,
        });
        table.extend(transactions);
    }

    Ok(Generation { table, summaries })
}

/// Run the sampling, repair and settlement stages for one ticker against an
/// already-fetched calendar. Inputs are assumed valid.
pub fn generate_for_calendar<R: Rng + ?Sized>(
    ticker: &str,
    config: &StockConfig,
    params: &GenerationParams,
    calendar: &TradingCalendar,
    rng: &mut R,
) -> (Vec<Transaction>, RepairReport) {
    let target = rng.gen_range(params.min_tx_count..=params.max_tx_count);
    let cluster = ClusterPolicy {
        prob: params.same_day_prob,
        min: params.same_day_min,
        max: params.same_day_max,
    };
    debug!(ticker, target, "sampling slots");

    let date_indices = sample_dates(calendar, target, &cluster, rng);
    let prices = sample_prices(calendar, &date_indices, rng);
    let sides = sample_sides(date_indices.len(), params.buy_prob, rng);
    let quantities = sample_quantities(date_indices.len(), config, rng);

    let mut slots: Vec<TransactionSlot> = date_indices
        .iter()
        .zip(prices)
        .zip(sides)
        .zip(quantities)
        .map(|(((&i, unit_price), side), quantity)| TransactionSlot {
            date: calendar.bar(i).date,
            side,
            unit_price,
            quantity,
        })
        .collect();

    order_by_date(&mut slots);

    let report = repair_balances(&mut slots, config.initial_holding, config.force_final_sale);
    let transactions = settle(ticker, slots, config.initial_holding, params.fee());
    (transactions, report)
}

/// Sort slots by date. The sort is stable, so slots sharing a day keep their
/// generation order.
pub fn order_by_date(slots: &mut [TransactionSlot]) {
    slots.sort_by_key(|s| s.date);
}
