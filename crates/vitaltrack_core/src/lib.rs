//! Core domain logic for VitalTrack.
//! This crate is the single source of truth for the event store, its
//! persistence round-trip and the analysis derived from it.

pub mod analysis;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analysis::correlation::{
    analyze, AnalysisResult, CorrelationAnalyzer, CorrelationCandidate, CorrelationReport,
};
pub use analysis::stats::{dashboard_stats, recent_activity, ActivityItem, DashboardStats};
pub use analysis::trends::{symptom_frequency, SymptomSeries, TrendSeries, MAX_TREND_DAYS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AnalyzerConfig, AppConfig, ConfigError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::document::{parse_document, ImportDocument, ImportFormatError};
pub use model::meal::{split_ingredients, Meal, NewMeal};
pub use model::record::RecordId;
pub use model::settings::Settings;
pub use model::store_data::StoreData;
pub use model::symptom::{parse_symptom_kind, NewSymptom, Symptom, SymptomKind};
pub use model::validation::ValidationError;
pub use repo::blob_repo::{
    BlobRepository, MemoryBlobRepository, RepoError, RepoResult, SqliteBlobRepository,
};
pub use service::event_store::{EventStore, StoreError, StoreResult, STORAGE_KEY};
pub use service::transfer::{
    export_document, export_file_name, export_json, merge_document, write_export, ImportOutcome,
    ImportReport, Prompt, TransferError, TransferManager,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
