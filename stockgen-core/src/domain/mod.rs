//! Domain types for StockGen

pub mod bar;
pub mod config;
pub mod transaction;

pub use bar::PriceBar;
pub use config::{GenerationParams, StockConfig, StockSet, TaxYear};
pub use transaction::{Columns, Side, Transaction, TransactionSlot, TransactionTable};
