//! Event store service.
//!
//! # Responsibility
//! - Hold the canonical meals/symptoms/settings state for one session.
//! - Validate logging actions and persist the full store after each mutation.
//! - Recover from missing or damaged persisted blobs with an empty store.
//!
//! # Invariants
//! - Every mutation builds the next state, persists it, then swaps it in; a
//!   failed validation or write leaves the in-memory state unchanged.
//! - Ids are unique per collection.
//! - Store contents are never logged; events carry counts only.

use crate::clock::Clock;
use crate::model::document::parse_document;
use crate::model::meal::{normalize_ingredients, Meal, NewMeal};
use crate::model::record::RecordId;
use crate::model::settings::Settings;
use crate::model::store_data::StoreData;
use crate::model::symptom::{parse_symptom_kind, NewSymptom, Symptom};
use crate::model::validation::{validate_severity, ValidationError};
use crate::repo::blob_repo::{BlobRepository, RepoError};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Well-known key of the persisted store blob.
pub const STORAGE_KEY: &str = "vitaltrack_data";

pub type StoreResult<T> = Result<T, StoreError>;

/// Event store operation failure.
#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    Repo(RepoError),
    Serialize(serde_json::Error),
    NotFound(RecordId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "persistence failed: {err}"),
            Self::Serialize(err) => write!(f, "store serialization failed: {err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Canonical meal/symptom store bound to one blob repository and clock.
pub struct EventStore<R: BlobRepository, C: Clock> {
    repo: R,
    clock: C,
    data: StoreData,
}

impl<R: BlobRepository, C: Clock> EventStore<R, C> {
    /// Creates a store and loads the persisted state.
    ///
    /// # Errors
    /// - Returns `StoreError::Repo` when the substrate cannot be read.
    ///   Damaged blob contents are not an error.
    pub fn open(repo: R, clock: C) -> StoreResult<Self> {
        let mut store = Self {
            repo,
            clock,
            data: StoreData::default(),
        };
        store.load()?;
        Ok(store)
    }

    /// Reloads state from the persisted blob.
    ///
    /// Missing data yields an empty store. Unreadable data is logged and
    /// replaced by an empty store; individually malformed records are dropped.
    pub fn load(&mut self) -> StoreResult<&StoreData> {
        self.data = match self.repo.get(STORAGE_KEY)? {
            None => {
                info!("event=store_load module=store status=ok source=empty");
                StoreData::default()
            }
            Some(blob) => decode_blob(&blob),
        };
        Ok(&self.data)
    }

    /// Serializes and writes the full store in one repository call.
    pub fn save(&self) -> StoreResult<()> {
        self.write(&self.data)
    }

    /// Logs a meal.
    ///
    /// # Errors
    /// - `ValidationError::EmptyMealName` for empty/whitespace names.
    pub fn add_meal(&mut self, request: NewMeal) -> StoreResult<Meal> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyMealName.into());
        }

        let mut id = RecordId::generate();
        while self.data.has_meal(&id) {
            id = RecordId::generate();
        }
        let meal = Meal {
            id,
            name: name.to_string(),
            ingredients: normalize_ingredients(request.ingredients),
            timestamp: request.timestamp.unwrap_or_else(|| self.clock.now()),
        };

        let mut next = self.data.clone();
        next.meals.push(meal.clone());
        self.commit(next)?;
        info!(
            "event=meal_add module=store status=ok ingredient_count={} meal_count={}",
            meal.ingredients.len(),
            self.data.meals.len()
        );
        Ok(meal)
    }

    /// Logs a symptom.
    ///
    /// # Errors
    /// - `ValidationError::SeverityOutOfRange` when severity is outside `[1, 10]`.
    pub fn add_symptom(&mut self, request: NewSymptom) -> StoreResult<Symptom> {
        let severity = validate_severity(request.severity)?;

        let mut id = RecordId::generate();
        while self.data.has_symptom(&id) {
            id = RecordId::generate();
        }
        let symptom = Symptom {
            id,
            kind: request.kind,
            severity,
            timestamp: request.timestamp.unwrap_or_else(|| self.clock.now()),
        };

        let mut next = self.data.clone();
        next.symptoms.push(symptom.clone());
        self.commit(next)?;
        info!(
            "event=symptom_add module=store status=ok type={} severity={} symptom_count={}",
            symptom.kind.as_str(),
            symptom.severity,
            self.data.symptoms.len()
        );
        Ok(symptom)
    }

    /// Logs a symptom from a raw catalog tag.
    ///
    /// # Errors
    /// - `ValidationError::UnknownSymptomType` when `kind` is not in the catalog.
    pub fn add_symptom_named(
        &mut self,
        kind: &str,
        severity: i64,
        timestamp: Option<DateTime<Utc>>,
    ) -> StoreResult<Symptom> {
        let kind = parse_symptom_kind(kind)?;
        self.add_symptom(NewSymptom {
            kind,
            severity,
            timestamp,
        })
    }

    /// Removes every meal and symptom and resets settings to defaults.
    pub fn clear(&mut self) -> StoreResult<()> {
        let removed = self.data.meals.len() + self.data.symptoms.len();
        self.commit(StoreData::default())?;
        info!("event=store_clear module=store status=ok removed_records={removed}");
        Ok(())
    }

    /// Overrides the timestamp of an existing meal.
    pub fn set_meal_timestamp(
        &mut self,
        id: &RecordId,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut next = self.data.clone();
        let meal = next
            .meals
            .iter_mut()
            .find(|meal| &meal.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        meal.timestamp = timestamp;
        self.commit(next)
    }

    /// Overrides the timestamp of an existing symptom.
    pub fn set_symptom_timestamp(
        &mut self,
        id: &RecordId,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut next = self.data.clone();
        let symptom = next
            .symptoms
            .iter_mut()
            .find(|symptom| &symptom.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        symptom.timestamp = timestamp;
        self.commit(next)
    }

    /// Sets one user preference.
    pub fn set_setting(&mut self, key: impl Into<String>, value: Value) -> StoreResult<()> {
        let mut next = self.data.clone();
        next.settings.set(key, value);
        self.commit(next)
    }

    /// Replaces the whole state, e.g. with an import merge result.
    pub fn replace_data(&mut self, data: StoreData) -> StoreResult<()> {
        self.commit(data)
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    pub fn meals(&self) -> &[Meal] {
        &self.data.meals
    }

    pub fn symptoms(&self) -> &[Symptom] {
        &self.data.symptoms
    }

    pub fn settings(&self) -> &Settings {
        &self.data.settings
    }

    pub fn meal(&self, id: &RecordId) -> Option<&Meal> {
        self.data.meal(id)
    }

    pub fn symptom(&self, id: &RecordId) -> Option<&Symptom> {
        self.data.symptom(id)
    }

    /// Current instant according to the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn commit(&mut self, next: StoreData) -> StoreResult<()> {
        self.write(&next)?;
        self.data = next;
        Ok(())
    }

    fn write(&self, data: &StoreData) -> StoreResult<()> {
        let blob = serde_json::to_string(data)?;
        self.repo.set(STORAGE_KEY, &blob)?;
        Ok(())
    }
}

fn decode_blob(blob: &str) -> StoreData {
    let document = match parse_document(blob) {
        Ok(document) => document,
        Err(err) => {
            warn!(
                "event=store_load module=store status=recovered error_code=blob_corrupt reason={}",
                err.code()
            );
            return StoreData::default();
        }
    };

    if document.rejected_count() > 0 {
        warn!(
            "event=store_load module=store status=partial rejected_meals={} rejected_symptoms={}",
            document.rejected_meals, document.rejected_symptoms
        );
    }

    let mut seen_meals = HashSet::new();
    let mut seen_symptoms = HashSet::new();
    let data = StoreData {
        meals: document
            .meals
            .into_iter()
            .filter(|meal| seen_meals.insert(meal.id.clone()))
            .collect(),
        symptoms: document
            .symptoms
            .into_iter()
            .filter(|symptom| seen_symptoms.insert(symptom.id.clone()))
            .collect(),
        settings: document.settings.unwrap_or_default(),
    };
    info!(
        "event=store_load module=store status=ok meal_count={} symptom_count={}",
        data.meals.len(),
        data.symptoms.len()
    );
    data
}
