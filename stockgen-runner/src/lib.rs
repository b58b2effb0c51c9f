//! StockGen Runner — config files, data sources, runs and export.
//!
//! This crate builds on `stockgen-core` to provide:
//! - TOML/JSON generation config files with a BLAKE3 fingerprint
//! - Data source selection (Yahoo Finance, CSV directory, synthetic)
//! - Seeded generation runs with a replayable manifest
//! - CSV/JSON export under the `StockInputGenerate_*` naming scheme

pub mod config;
pub mod export;
pub mod runner;
pub mod source;

pub use config::{ConfigFileError, GenerationConfig};
pub use export::{
    export_csv, export_file_name, export_json, load_manifest, save_artifacts, ExportFormat,
    SavedArtifacts,
};
pub use runner::{run_generation, run_with_source, RunError, RunManifest, RunResult};
pub use source::{build_provider, SourceError, SourceKind, SourceOptions};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<GenerationConfig>();
        assert_sync::<GenerationConfig>();
        assert_send::<SourceOptions>();
        assert_sync::<SourceOptions>();
    }

    #[test]
    fn run_result_is_send_sync() {
        assert_send::<RunResult>();
        assert_sync::<RunResult>();
        assert_send::<RunManifest>();
        assert_sync::<RunManifest>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<ConfigFileError>();
        assert_sync::<ConfigFileError>();
    }
}
