//! Date sampler: picks trading days for a ticker, with same-day clusters.

use crate::data::TradingCalendar;
use chrono::{Duration, NaiveDate, NaiveTime};
use rand::Rng;

/// Same-day clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterPolicy {
    /// Probability that a sampled date carries a cluster instead of one trade.
    pub prob: f64,
    pub min: u64,
    pub max: u64,
}

impl ClusterPolicy {
    /// No clustering: every sampled date carries exactly one trade.
    pub fn none() -> Self {
        Self {
            prob: 0.0,
            min: 1,
            max: 1,
        }
    }

    /// Size of the cluster for the next sampled date, given how many trades
    /// are still to be placed. Never exceeds `remaining`.
    pub fn draw_size<R: Rng + ?Sized>(&self, remaining: u64, rng: &mut R) -> u64 {
        let roll: f64 = rng.gen();
        if roll < self.prob && remaining > self.min {
            let upper = self.max.min(remaining);
            rng.gen_range(self.min..=upper)
        } else {
            1
        }
    }
}

/// Uniform random instant in `[start, end)`, truncated to its calendar day.
pub fn random_day<R: Rng + ?Sized>(start: NaiveDate, end: NaiveDate, rng: &mut R) -> NaiveDate {
    let span_secs = (end - start).num_seconds().max(0) as f64;
    let prop: f64 = rng.gen();
    let offset = (prop * span_secs).floor() as i64;
    (start.and_time(NaiveTime::MIN) + Duration::seconds(offset)).date()
}

/// Sample `target_count` trade dates, as indices into `calendar`.
///
/// Each iteration draws a day in the calendar's period, snaps it to the
/// nearest trading day, and repeats that day once or as a cluster. The
/// output is in generation order (not sorted) and has exactly
/// `target_count` entries.
pub fn sample_dates<R: Rng + ?Sized>(
    calendar: &TradingCalendar,
    target_count: u64,
    cluster: &ClusterPolicy,
    rng: &mut R,
) -> Vec<usize> {
    let mut indices = Vec::with_capacity(target_count as usize);
    let mut n_dates = 0u64;

    while n_dates < target_count {
        let day = random_day(calendar.period_start(), calendar.period_end(), rng);
        let index = calendar.nearest_index(day);
        let size = cluster.draw_size(target_count - n_dates, rng);

        indices.extend(std::iter::repeat(index).take(size as usize));
        n_dates += size;
    }

    indices
}
