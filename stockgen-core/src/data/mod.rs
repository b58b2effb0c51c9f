//! Market data: providers and the trading calendar adapter

pub mod calendar;
pub mod circuit_breaker;
pub mod csv_dir;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use calendar::{CalendarError, TradingCalendar};
pub use circuit_breaker::CircuitBreaker;
pub use csv_dir::CsvDirProvider;
pub use provider::{DataError, DataSource, InMemoryProvider, MarketDataProvider, RawBar};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
