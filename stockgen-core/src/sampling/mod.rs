//! Samplers for slot dates, prices, sides and quantities.
//!
//! Every sampler takes the run's random source explicitly; none of them keep
//! state between calls.

pub mod date;
pub mod price;
pub mod trade;

pub use date::{random_day, sample_dates, ClusterPolicy};
pub use price::{sample_price, sample_prices};
pub use trade::{sample_quantities, sample_sides};
