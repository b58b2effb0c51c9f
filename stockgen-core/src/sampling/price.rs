//! Price sampler: one uniform draw from the day's range per slot.

use crate::data::TradingCalendar;
use crate::domain::PriceBar;
use rand::Rng;

/// Uniform price in `[low, high]`.
pub fn sample_price<R: Rng + ?Sized>(bar: &PriceBar, rng: &mut R) -> f64 {
    if bar.spread() <= 0.0 {
        return bar.low;
    }
    rng.gen_range(bar.low..=bar.high)
}

/// One independent price per sampled date index. Slots sharing a day get
/// separate draws.
pub fn sample_prices<R: Rng + ?Sized>(
    calendar: &TradingCalendar,
    date_indices: &[usize],
    rng: &mut R,
) -> Vec<f64> {
    date_indices
        .iter()
        .map(|&i| sample_price(calendar.bar(i), rng))
        .collect()
}
