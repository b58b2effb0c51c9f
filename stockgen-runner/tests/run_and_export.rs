//! Runner integration: config file → provider → generation → artifacts on disk.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::fmt::Write as _;
use std::path::Path;
use stockgen_core::data::DataSource;
use stockgen_core::domain::{Columns, Side, TaxYear};
use stockgen_core::rng::RunSeed;
use stockgen_core::GenerateError;
use stockgen_runner::export::{import_manifest, save_artifacts_at};
use stockgen_runner::{
    export_file_name, load_manifest, run_generation, run_with_source, save_artifacts,
    ExportFormat, GenerationConfig, RunError, SourceOptions,
};

const CONFIG: &str = r#"
[params]
min_tx_count = 5
max_tx_count = 5
same_day_prob = 0.0
same_day_min = 2
same_day_max = 5
buy_prob = 0.5
fee_rate = 0.01
period_start = 2023-04-06
period_end = 2024-04-05

[stocks.ACME]
initial_holding = 0
initial_value = 0.0
min_trade_qty = 10
max_trade_qty = 50
step = 10
force_final_sale = false

[stocks.BOLT]
initial_holding = 10
initial_value = 500.0
min_trade_qty = 5
max_trade_qty = 5
step = 1
force_final_sale = true
"#;

fn write_price_file(dir: &Path, ticker: &str) {
    let mut body = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    let mut d = NaiveDate::from_ymd_opt(2023, 4, 3).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
    while d <= end {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            writeln!(body, "{d},100.0,104.0,96.0,101.0,101.0,5000").unwrap();
        }
        d += Duration::days(1);
    }
    std::fs::write(dir.join(format!("{ticker}.csv")), body).unwrap();
}

fn at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, 30)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

// ── CSV directory source ─────────────────────────────────────────────

#[test]
fn csv_directory_run_honours_config() {
    let prices = tempfile::tempdir().unwrap();
    write_price_file(prices.path(), "ACME");
    write_price_file(prices.path(), "BOLT");

    let config = GenerationConfig::from_toml_str(CONFIG).unwrap();
    let result = run_with_source(
        &config,
        &SourceOptions::csv(prices.path()),
        Some(RunSeed::fixed(8)),
    )
    .unwrap();

    assert_eq!(result.manifest.source, DataSource::CsvImport);
    assert_eq!(result.table.tickers(), vec!["ACME", "BOLT"]);

    let acme: Vec<_> = result.table.for_ticker("ACME").collect();
    assert_eq!(acme.len(), 5);
    assert_eq!(acme[0].side, Side::Buy);
    assert!(acme.windows(2).all(|w| w[0].date <= w[1].date));
    assert!(acme
        .iter()
        .all(|t| t.unit_price >= 96.0 && t.unit_price <= 104.0));

    let bolt: Vec<_> = result.table.for_ticker("BOLT").collect();
    let last = bolt.last().unwrap();
    assert_eq!(last.side, Side::Sell);
    assert_eq!(last.cumulative_share, 0);
    assert_eq!(last.quantity, bolt[bolt.len() - 2].cumulative_share);
}

#[test]
fn missing_price_file_is_no_such_instrument() {
    let prices = tempfile::tempdir().unwrap();
    write_price_file(prices.path(), "ACME");

    let config = GenerationConfig::from_toml_str(CONFIG).unwrap();
    let err = run_with_source(
        &config,
        &SourceOptions::csv(prices.path()),
        Some(RunSeed::fixed(8)),
    )
    .unwrap_err();

    match err {
        RunError::Generate(GenerateError::NoSuchInstrument { ticker, .. }) => {
            assert_eq!(ticker, "BOLT")
        }
        other => panic!("expected NoSuchInstrument, got {other}"),
    }
}

// ── Artifacts ────────────────────────────────────────────────────────

#[test]
fn saves_csv_table_and_manifest() {
    let out = tempfile::tempdir().unwrap();
    let config = GenerationConfig::default();
    let result = run_with_source(&config, &SourceOptions::synthetic(), Some(RunSeed::fixed(1)))
        .unwrap();

    let saved = save_artifacts_at(
        &result,
        Columns::Standard,
        ExportFormat::Csv,
        &out.path().join("nested"),
        at(),
    )
    .unwrap();

    assert_eq!(
        saved.table.file_name().unwrap().to_str().unwrap(),
        export_file_name(at(), ExportFormat::Csv)
    );
    assert_eq!(
        saved.manifest.file_name().unwrap().to_str().unwrap(),
        "StockInputGenerate_2024_04_30__09_15_00.manifest.json"
    );

    let mut reader = csv::Reader::from_path(&saved.table).unwrap();
    assert_eq!(reader.headers().unwrap().len(), 6);
    assert_eq!(reader.records().count(), result.table.len());

    let manifest = load_manifest(&saved.manifest).unwrap();
    assert_eq!(manifest.seed, 1);
    assert_eq!(manifest.config_fingerprint, config.fingerprint());
    assert_eq!(manifest.tickers, result.manifest.tickers);
    assert_eq!(manifest.total_transactions, result.table.len());
}

#[test]
fn saves_json_table_with_extended_columns() {
    let out = tempfile::tempdir().unwrap();
    let config = GenerationConfig::default().with_tax_year(TaxYear::starting(2021));
    let result = run_generation(
        &config,
        &stockgen_core::data::SyntheticProvider::new(),
        RunSeed::from_label("json-export"),
    )
    .unwrap();

    let saved = save_artifacts(&result, Columns::Extended, ExportFormat::Json, out.path())
        .unwrap();
    assert_eq!(saved.table.extension().unwrap(), "json");

    let text = std::fs::read_to_string(&saved.table).unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(rows.len(), result.table.len());
    assert!(rows.iter().all(|r| r.get("CumulativeShare").is_some()));
    assert!(rows
        .iter()
        .all(|r| r["Date"].as_str().unwrap().starts_with("202")));
}

#[test]
fn newer_manifest_schema_is_rejected() {
    let result = run_generation(
        &GenerationConfig::default(),
        &stockgen_core::data::SyntheticProvider::new(),
        RunSeed::fixed(2),
    )
    .unwrap();
    let mut json = serde_json::to_value(&result.manifest).unwrap();
    json["schema_version"] = serde_json::json!(99);
    let err = import_manifest(&json.to_string()).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version"));
}

// ── Config files ─────────────────────────────────────────────────────

#[test]
fn config_file_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stockgen.toml");
    let config = GenerationConfig::from_toml_str(CONFIG).unwrap();
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    let loaded = GenerationConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.fingerprint(), config.fingerprint());
}

#[test]
fn unreadable_config_file_reports_the_path() {
    let err = GenerationConfig::from_file(Path::new("/no/such/stockgen.toml")).unwrap_err();
    assert!(err.to_string().contains("/no/such/stockgen.toml"));
}
