//! Side/quantity sampler. Independent of dates and prices.

use crate::domain::{Side, StockConfig};
use rand::Rng;

/// `count` sides, each Buy with probability `buy_prob`.
pub fn sample_sides<R: Rng + ?Sized>(count: usize, buy_prob: f64, rng: &mut R) -> Vec<Side> {
    (0..count)
        .map(|_| {
            if rng.gen::<f64>() < buy_prob {
                Side::Buy
            } else {
                Side::Sell
            }
        })
        .collect()
}

/// `count` quantities drawn uniformly from the stock's stepped grid.
pub fn sample_quantities<R: Rng + ?Sized>(
    count: usize,
    config: &StockConfig,
    rng: &mut R,
) -> Vec<u64> {
    let points = config.grid_len();
    (0..count)
        .map(|_| config.min_trade_qty + rng.gen_range(0..points) * config.step)
        .collect()
}
