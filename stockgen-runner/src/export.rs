//! Table export — CSV and JSON artifacts.
//!
//! Exported tables are named `StockInputGenerate_<YYYY_MM_DD>__<HH_MM_SS>.<ext>`
//! after the local time of the export. The run manifest is written next to
//! the table as `<stem>.manifest.json`.
//!
//! Persisted manifests include a `schema_version` field. Unknown versions are
//! rejected on load.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDateTime;
use serde_json::{json, Map, Value};
use stockgen_core::domain::{Columns, Transaction, TransactionTable};
use tracing::info;

use crate::runner::{RunManifest, RunResult, SCHEMA_VERSION};

/// File name prefix of exported tables.
pub const FILE_PREFIX: &str = "StockInputGenerate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(anyhow!("unknown export format '{other}' (expected csv or json)")),
        }
    }
}

/// `StockInputGenerate_2024_03_09__14_05_07.csv` for 2024-03-09 14:05:07.
pub fn export_file_name(at: NaiveDateTime, format: ExportFormat) -> String {
    format!(
        "{FILE_PREFIX}_{}.{}",
        at.format("%Y_%m_%d__%H_%M_%S"),
        format.extension()
    )
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Render the table as CSV with a header row.
pub fn export_csv(table: &TransactionTable, columns: Columns) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(columns.headers())?;
    for record in table.records(columns) {
        wtr.write_record(&record)?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// Render the table as a pretty JSON array of row objects keyed by column name.
pub fn export_json(table: &TransactionTable, columns: Columns) -> Result<String> {
    let rows: Vec<Value> = table.rows().iter().map(|t| row_json(t, columns)).collect();
    serde_json::to_string_pretty(&rows).context("failed to serialize transaction table to JSON")
}

fn row_json(t: &Transaction, columns: Columns) -> Value {
    let mut row = Map::new();
    row.insert("Date".into(), json!(t.date.to_string()));
    row.insert("Ticker".into(), json!(t.ticker));
    row.insert("Side".into(), json!(t.side.as_str()));
    row.insert("UnitPrice".into(), json!(t.unit_price));
    row.insert("Quantity".into(), json!(t.quantity));
    if columns == Columns::Extended {
        row.insert("NetShare".into(), json!(t.net_share));
        row.insert("CumulativeShare".into(), json!(t.cumulative_share));
    }
    row.insert("SettlementAmount".into(), json!(t.settlement_amount));
    Value::Object(row)
}

/// Render a table in `format`.
pub fn render_table(
    table: &TransactionTable,
    columns: Columns,
    format: ExportFormat,
) -> Result<String> {
    match format {
        ExportFormat::Csv => export_csv(table, columns),
        ExportFormat::Json => export_json(table, columns),
    }
}

// ─── Manifest ───────────────────────────────────────────────────────

pub fn export_manifest(manifest: &RunManifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize run manifest to JSON")
}

/// Deserialize a manifest, rejecting unknown schema versions.
pub fn import_manifest(json: &str) -> Result<RunManifest> {
    let manifest: RunManifest =
        serde_json::from_str(json).context("failed to deserialize run manifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

pub fn load_manifest(path: &Path) -> Result<RunManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_manifest(&json)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Paths written by [`save_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifacts {
    pub table: PathBuf,
    pub manifest: PathBuf,
}

/// Write the table and its manifest into `output_dir`, named after the
/// current local time.
pub fn save_artifacts(
    result: &RunResult,
    columns: Columns,
    format: ExportFormat,
    output_dir: &Path,
) -> Result<SavedArtifacts> {
    save_artifacts_at(
        result,
        columns,
        format,
        output_dir,
        chrono::Local::now().naive_local(),
    )
}

/// [`save_artifacts`] with an explicit timestamp.
pub fn save_artifacts_at(
    result: &RunResult,
    columns: Columns,
    format: ExportFormat,
    output_dir: &Path,
    at: NaiveDateTime,
) -> Result<SavedArtifacts> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let table_path = output_dir.join(export_file_name(at, format));
    let body = render_table(&result.table, columns, format)?;
    std::fs::write(&table_path, body)
        .with_context(|| format!("failed to write {}", table_path.display()))?;

    let manifest_path = table_path.with_extension("manifest.json");
    std::fs::write(&manifest_path, export_manifest(&result.manifest)?)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;

    info!(
        table = %table_path.display(),
        rows = result.table.len(),
        "exported transaction table"
    );
    Ok(SavedArtifacts {
        table: table_path,
        manifest: manifest_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockgen_core::domain::Side;

    fn table() -> TransactionTable {
        let mut t = TransactionTable::new();
        t.extend(vec![
            Transaction {
                date: NaiveDate::from_ymd_opt(2023, 5, 2).unwrap(),
                ticker: "META".into(),
                side: Side::Buy,
                unit_price: 230.5,
                quantity: 10,
                net_share: 10,
                cumulative_share: 10,
                settlement_amount: -2328.05,
            },
            Transaction {
                date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                ticker: "META".into(),
                side: Side::Sell,
                unit_price: 260.0,
                quantity: 10,
                net_share: -10,
                cumulative_share: 0,
                settlement_amount: 2574.0,
            },
        ]);
        t
    }

    #[test]
    fn file_name_uses_underscored_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        assert_eq!(
            export_file_name(at, ExportFormat::Csv),
            "StockInputGenerate_2024_03_09__14_05_07.csv"
        );
        assert_eq!(
            export_file_name(at, ExportFormat::Json),
            "StockInputGenerate_2024_03_09__14_05_07.json"
        );
    }

    #[test]
    fn csv_standard_columns() {
        let csv = export_csv(&table(), Columns::Standard).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Ticker,Side,UnitPrice,Quantity,SettlementAmount"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2023-05-02,META,Buy,230.500000,10,-2328.050000"
        );
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn csv_extended_columns_include_share_counts() {
        let csv = export_csv(&table(), Columns::Extended).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.contains("NetShare"));
        assert!(header.contains("CumulativeShare"));
    }

    #[test]
    fn json_rows_are_keyed_by_column() {
        let json = export_json(&table(), Columns::Standard).unwrap();
        let rows: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Side"], "Sell");
        assert_eq!(rows[1]["Quantity"], 10);
        assert!(rows[1].get("NetShare").is_none());

        let json = export_json(&table(), Columns::Extended).unwrap();
        let rows: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows[1]["NetShare"], -10);
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }
}
