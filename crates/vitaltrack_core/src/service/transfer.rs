//! Import/export flows over the event store.
//!
//! # Responsibility
//! - Serialize the store into a portable JSON document.
//! - Merge external documents additively into existing data.
//! - Drive the two-phase (confirm, then notify) user flows through an
//!   injected `Prompt` capability.
//!
//! # Invariants
//! - Merge never overwrites: incoming records whose id already exists in the
//!   target collection are skipped. Importing a document twice equals
//!   importing it once.
//! - A declined confirmation or a malformed document leaves the store
//!   untouched.

use crate::clock::Clock;
use crate::model::document::{parse_document, ImportDocument, ImportFormatError};
use crate::model::record::RecordId;
use crate::model::store_data::StoreData;
use crate::repo::blob_repo::BlobRepository;
use crate::service::event_store::{EventStore, StoreError};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const EXPORT_FILE_PREFIX: &str = "vitaltrack_export_";

/// Synchronous user interaction capability.
pub trait Prompt {
    /// Asks the user to confirm an action. `false` aborts it.
    fn confirm(&self, message: &str) -> bool;
    /// Informs the user about an outcome.
    fn notify(&self, message: &str);
}

impl<T: Prompt + ?Sized> Prompt for &T {
    fn confirm(&self, message: &str) -> bool {
        (**self).confirm(message)
    }

    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}

/// Import/export flow failure.
#[derive(Debug)]
pub enum TransferError {
    Format(ImportFormatError),
    Store(StoreError),
    Serialize(serde_json::Error),
    Io(io::Error),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format(err) => write!(f, "invalid import document: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "export serialization failed: {err}"),
            Self::Io(err) => write!(f, "export write failed: {err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Format(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ImportFormatError> for TransferError {
    fn from(value: ImportFormatError) -> Self {
        Self::Format(value)
    }
}

impl From<StoreError> for TransferError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

impl From<io::Error> for TransferError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Counts produced by one merge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub meals_inserted: usize,
    pub meals_skipped: usize,
    pub meals_rejected: usize,
    pub symptoms_inserted: usize,
    pub symptoms_skipped: usize,
    pub symptoms_rejected: usize,
    pub settings_replaced: bool,
}

impl ImportReport {
    pub fn inserted(&self) -> usize {
        self.meals_inserted + self.symptoms_inserted
    }

    pub fn skipped(&self) -> usize {
        self.meals_skipped + self.symptoms_skipped
    }

    pub fn rejected(&self) -> usize {
        self.meals_rejected + self.symptoms_rejected
    }

    /// Human-readable success summary.
    pub fn message(&self) -> String {
        let mut message = format!(
            "Data imported successfully: added {} meal(s) and {} symptom(s), skipped {} duplicate(s).",
            self.meals_inserted,
            self.symptoms_inserted,
            self.skipped()
        );
        if self.rejected() > 0 {
            message.push_str(&format!(
                " {} malformed record(s) were ignored.",
                self.rejected()
            ));
        }
        message
    }
}

/// Result of the confirm-then-merge import flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The user declined; nothing changed.
    Declined,
    Imported(ImportReport),
}

/// Produces the export document. Every record field is kept as-is.
pub fn export_document(data: &StoreData) -> StoreData {
    data.clone()
}

/// Serializes the export document as pretty-printed JSON.
pub fn export_json(data: &StoreData) -> Result<String, TransferError> {
    Ok(serde_json::to_string_pretty(&export_document(data))?)
}

/// Returns the conventional export file name for `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{EXPORT_FILE_PREFIX}{}.json", date.format("%Y-%m-%d"))
}

/// Writes the export document into `dir`.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so readers never see a half-written export.
pub fn write_export(data: &StoreData, dir: &Path, date: NaiveDate) -> Result<PathBuf, TransferError> {
    let json = export_json(data)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(date));
    let temp_path = path.with_extension("json.tmp");
    if let Err(err) = write_synced(&temp_path, json.as_bytes())
        .and_then(|()| fs::rename(&temp_path, &path))
    {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(path)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Merges a decoded document into `existing` without mutating it.
///
/// Records are appended in document order unless their id is already present
/// (including ids appended earlier in the same document). Settings carried by
/// the document replace existing settings wholesale.
pub fn merge_document(document: ImportDocument, existing: &StoreData) -> (StoreData, ImportReport) {
    let mut merged = existing.clone();
    let mut report = ImportReport {
        meals_rejected: document.rejected_meals,
        symptoms_rejected: document.rejected_symptoms,
        ..ImportReport::default()
    };

    let mut meal_ids: HashSet<RecordId> =
        existing.meals.iter().map(|meal| meal.id.clone()).collect();
    for meal in document.meals {
        if meal_ids.insert(meal.id.clone()) {
            merged.meals.push(meal);
            report.meals_inserted += 1;
        } else {
            report.meals_skipped += 1;
        }
    }

    let mut symptom_ids: HashSet<RecordId> = existing
        .symptoms
        .iter()
        .map(|symptom| symptom.id.clone())
        .collect();
    for symptom in document.symptoms {
        if symptom_ids.insert(symptom.id.clone()) {
            merged.symptoms.push(symptom);
            report.symptoms_inserted += 1;
        } else {
            report.symptoms_skipped += 1;
        }
    }

    if let Some(settings) = document.settings {
        merged.settings = settings;
        report.settings_replaced = true;
    }

    (merged, report)
}

/// Import/export manager bound to a user prompt capability.
pub struct TransferManager<P: Prompt> {
    prompt: P,
}

impl<P: Prompt> TransferManager<P> {
    pub fn new(prompt: P) -> Self {
        Self { prompt }
    }

    /// Validates, confirms and merges an import document into `store`.
    ///
    /// # Errors
    /// - `TransferError::Format` when `text` is not a structured document;
    ///   the user is notified and the store is unchanged.
    /// - `TransferError::Store` when the merged state cannot be persisted.
    pub fn import_text<R: BlobRepository, C: Clock>(
        &self,
        store: &mut EventStore<R, C>,
        text: &str,
    ) -> Result<ImportOutcome, TransferError> {
        let document = match parse_document(text) {
            Ok(document) => document,
            Err(err) => {
                warn!(
                    "event=import module=transfer status=error error_code=invalid_format reason={}",
                    err.code()
                );
                self.prompt.notify(&format!("Import failed: {err}"));
                return Err(err.into());
            }
        };

        let question = format!(
            "Import {} meal(s) and {} symptom(s)? Existing records are kept and duplicates are skipped.",
            document.meals.len(),
            document.symptoms.len()
        );
        if !self.prompt.confirm(&question) {
            info!("event=import module=transfer status=declined");
            return Ok(ImportOutcome::Declined);
        }

        let (merged, report) = merge_document(document, store.data());
        if let Err(err) = store.replace_data(merged) {
            self.prompt.notify(&format!("Import failed: {err}"));
            return Err(err.into());
        }

        info!(
            "event=import module=transfer status=ok inserted={} skipped={} rejected={}",
            report.inserted(),
            report.skipped(),
            report.rejected()
        );
        self.prompt.notify(&report.message());
        Ok(ImportOutcome::Imported(report))
    }

    /// Writes the store export into `dir` and notifies the user.
    pub fn export_to_dir<R: BlobRepository, C: Clock>(
        &self,
        store: &EventStore<R, C>,
        dir: &Path,
    ) -> Result<PathBuf, TransferError> {
        match write_export(store.data(), dir, store.now().date_naive()) {
            Ok(path) => {
                info!("event=export module=transfer status=ok");
                self.prompt
                    .notify(&format!("Data exported to {}", path.display()));
                Ok(path)
            }
            Err(err) => {
                warn!("event=export module=transfer status=error error={err}");
                self.prompt
                    .notify("Failed to export data. Please check the logs for details.");
                Err(err)
            }
        }
    }

    /// Clears all data after explicit confirmation.
    ///
    /// Returns `false` when the user declined.
    pub fn clear_with_confirmation<R: BlobRepository, C: Clock>(
        &self,
        store: &mut EventStore<R, C>,
    ) -> Result<bool, TransferError> {
        if !self
            .prompt
            .confirm("Are you sure you want to clear ALL data? This cannot be undone.")
        {
            return Ok(false);
        }
        store.clear()?;
        self.prompt.notify("All data cleared.");
        Ok(true)
    }
}
