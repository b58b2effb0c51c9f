//! End-to-end generation scenarios against in-memory and synthetic providers.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use stockgen_core::data::{InMemoryProvider, RawBar, SyntheticProvider};
use stockgen_core::domain::{GenerationParams, Side, StockConfig, StockSet, TaxYear};
use stockgen_core::rng::RunSeed;
use stockgen_core::{generate, generate_detailed, GenerateError};

fn period() -> (NaiveDate, NaiveDate) {
    TaxYear::starting(2023).span().unwrap()
}

fn weekday_bars(start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
    let mut bars = Vec::new();
    let mut d = start;
    while d <= end {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            bars.push(RawBar {
                date: d,
                open: 50.0,
                high: 55.0,
                low: 45.0,
                close: 52.0,
                volume: 10_000,
            });
        }
        d += Duration::days(1);
    }
    bars
}

fn stock(initial_holding: u64, force_final_sale: bool) -> StockConfig {
    StockConfig {
        initial_holding,
        initial_value: 0.0,
        min_trade_qty: 10,
        max_trade_qty: 50,
        step: 10,
        force_final_sale,
    }
}

fn params_fixed_count(count: u64) -> GenerationParams {
    let (start, end) = period();
    GenerationParams {
        min_tx_count: count,
        max_tx_count: count,
        same_day_prob: 0.0,
        same_day_min: 2,
        same_day_max: 5,
        buy_prob: 0.5,
        fee_rate: Some(0.01),
        period_start: start,
        period_end: end,
    }
}

fn provider_for(tickers: &[&str]) -> InMemoryProvider {
    let (start, end) = period();
    tickers.iter().fold(InMemoryProvider::new(), |p, t| {
        p.with_bars(*t, weekday_bars(start, end))
    })
}

// ── Fixed count from zero holdings ───────────────────────────────────

#[test]
fn five_fixed_transactions_from_zero_holding() {
    let stocks = StockSet::new().with("ACME", stock(0, false));
    let params = params_fixed_count(5);
    let provider = provider_for(&["ACME"]);

    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        let table = generate(&stocks, &params, &provider, &mut rng).unwrap();
        let rows = table.rows();

        assert_eq!(rows.len(), 5, "seed {seed}");
        assert_eq!(rows[0].side, Side::Buy, "seed {seed}");
        assert!(rows.windows(2).all(|w| w[0].date <= w[1].date), "seed {seed}");
        assert!(rows
            .iter()
            .all(|r| r.date >= params.period_start && r.date <= params.period_end));
    }
}

// ── Forced final sale ────────────────────────────────────────────────

#[test]
fn forced_final_sale_with_initial_holding() {
    let stocks = StockSet::new().with("ACME", stock(10, true));
    let mut params = params_fixed_count(0);
    params.min_tx_count = 2;
    params.max_tx_count = 40;
    let provider = provider_for(&["ACME"]);

    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        let table = generate(&stocks, &params, &provider, &mut rng).unwrap();
        let rows = table.rows();
        let last = rows.last().unwrap();

        let held_before_last = if rows.len() >= 2 {
            rows[rows.len() - 2].cumulative_share
        } else {
            10
        };
        assert_eq!(last.side, Side::Sell, "seed {seed}");
        assert_eq!(last.quantity, held_before_last, "seed {seed}");
        assert_eq!(last.cumulative_share, 0, "seed {seed}");
    }
}

// ── Missing instrument ───────────────────────────────────────────────

#[test]
fn empty_history_fails_with_no_such_instrument() {
    let stocks = StockSet::new()
        .with("ACME", stock(0, false))
        .with("ZZZZ", stock(0, false));
    let params = params_fixed_count(5);
    let provider = provider_for(&["ACME"]);

    let err = generate(&stocks, &params, &provider, &mut StdRng::seed_from_u64(3)).unwrap_err();
    match err {
        GenerateError::NoSuchInstrument { ticker, start, end } => {
            assert_eq!(ticker, "ZZZZ");
            assert_eq!((start, end), period());
        }
        other => panic!("expected NoSuchInstrument, got {other:?}"),
    }
}

#[test]
fn unlisted_synthetic_ticker_fails_the_same_way() {
    let provider = SyntheticProvider::new().with_unlisted(["ZZZZ"]);
    let stocks = StockSet::new().with("ZZZZ", stock(0, false));
    let err = generate(
        &stocks,
        &params_fixed_count(5),
        &provider,
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap_err();
    assert!(matches!(err, GenerateError::NoSuchInstrument { .. }));
}

// ── Defaults and seeding ─────────────────────────────────────────────

#[test]
fn default_configuration_runs_against_synthetic_data() {
    let seed = RunSeed::from_label("defaults");
    let generation = generate_detailed(
        &StockSet::default_set(),
        &GenerationParams::default(),
        &SyntheticProvider::new(),
        &mut seed.rng(),
    )
    .unwrap();

    assert_eq!(generation.table.tickers(), vec!["META", "TSLA"]);
    for summary in &generation.summaries {
        assert!((2..=100).contains(&summary.transactions));
        assert!(summary.trading_days > 200);
    }
    // META forces a final sale, TSLA does not.
    let meta_last = generation.table.for_ticker("META").last().unwrap();
    assert_eq!(meta_last.cumulative_share, 0);
    assert!(!generation.summaries[1].repair.forced_final_sale);
}

#[test]
fn same_run_seed_reproduces_the_table() {
    let seed = RunSeed::fixed(2024);
    let run = || {
        generate(
            &StockSet::default_set(),
            &GenerationParams::default(),
            &SyntheticProvider::new(),
            &mut seed.rng(),
        )
        .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn empty_stock_set_gives_empty_table() {
    let table = generate(
        &StockSet::new(),
        &GenerationParams::default(),
        &InMemoryProvider::new(),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    assert!(table.is_empty());
}

#[test]
fn settlement_amounts_follow_side_and_fee() {
    let stocks = StockSet::new().with("ACME", stock(0, false));
    let params = params_fixed_count(30);
    let table = generate(
        &stocks,
        &params,
        &provider_for(&["ACME"]),
        &mut StdRng::seed_from_u64(11),
    )
    .unwrap();

    for row in table.rows() {
        let value = row.quantity as f64 * row.unit_price;
        let expected = match row.side {
            Side::Buy => -value * 1.01,
            Side::Sell => value * 0.99,
        };
        assert!((row.settlement_amount - expected).abs() < 1e-6);
        assert!(row.unit_price >= 45.0 && row.unit_price <= 55.0);
    }
}
