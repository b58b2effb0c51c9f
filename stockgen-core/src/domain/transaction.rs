//! Transaction slots, finalized transactions, and the output table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated trade before balance repair.
///
/// Side and quantity are only rewritten by the repair pass; date and price are
/// fixed once sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSlot {
    pub date: NaiveDate,
    pub side: Side,
    pub unit_price: f64,
    pub quantity: u64,
}

/// A finalized transaction with derived share and cash fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub ticker: String,
    pub side: Side,
    pub unit_price: f64,
    pub quantity: u64,
    /// `+quantity` for a buy, `-quantity` for a sell.
    pub net_share: i64,
    /// Holdings after this transaction, seeded at the stock's initial holding.
    pub cumulative_share: u64,
    /// Cash flow net of fees: negative when paying, positive when receiving.
    pub settlement_amount: f64,
}

/// Which columns a presentation of the table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Columns {
    /// Date, Ticker, Side, UnitPrice, Quantity, SettlementAmount.
    #[default]
    Standard,
    /// Standard columns plus NetShare and CumulativeShare.
    Extended,
}

impl Columns {
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Columns::Standard => &[
                "Date",
                "Ticker",
                "Side",
                "UnitPrice",
                "Quantity",
                "SettlementAmount",
            ],
            Columns::Extended => &[
                "Date",
                "Ticker",
                "Side",
                "UnitPrice",
                "Quantity",
                "SettlementAmount",
                "NetShare",
                "CumulativeShare",
            ],
        }
    }
}

/// The generator's output: every ticker's transactions, concatenated in
/// ticker-processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionTable {
    rows: Vec<Transaction>,
}

impl TransactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one ticker's transactions. The table is append-only.
    pub fn extend(&mut self, transactions: Vec<Transaction>) {
        self.rows.extend(transactions);
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to one ticker, in table order.
    pub fn for_ticker<'a>(&'a self, ticker: &'a str) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.rows.iter().filter(move |t| t.ticker == ticker)
    }

    /// Distinct tickers in order of first appearance.
    pub fn tickers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.ticker.as_str()) {
                seen.push(row.ticker.as_str());
            }
        }
        seen
    }

    /// Render each row as string cells for the requested column set.
    pub fn records(&self, columns: Columns) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|t| {
                let mut cells = vec![
                    t.date.to_string(),
                    t.ticker.clone(),
                    t.side.to_string(),
                    format!("{:.6}", t.unit_price),
                    t.quantity.to_string(),
                    format!("{:.6}", t.settlement_amount),
                ];
                if columns == Columns::Extended {
                    cells.push(t.net_share.to_string());
                    cells.push(t.cumulative_share.to_string());
                }
                cells
            })
            .collect()
    }
}
