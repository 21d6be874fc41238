//! Symptom domain model and the closed symptom catalog.
//!
//! # Responsibility
//! - Define the symptom catalog as a closed enum.
//! - Define the persisted symptom record and its creation request.
//!
//! # Invariants
//! - `severity` is always within `[SEVERITY_MIN, SEVERITY_MAX]`.
//! - Unknown catalog tags are rejected at construction/deserialization time.

use crate::model::record::RecordId;
use crate::model::validation::{validate_severity, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed catalog of loggable symptom types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomKind {
    Energy,
    PassingGas,
    Acidity,
    Burping,
    Pain,
    Headache,
    Mood,
    Constipation,
    ChestPainLeft,
    ChestPainRight,
    ChestPainMiddle,
    RibPainLeft,
    RibPainRight,
}

impl SymptomKind {
    /// Catalog in display order.
    pub const ALL: [SymptomKind; 13] = [
        Self::Energy,
        Self::PassingGas,
        Self::Acidity,
        Self::Burping,
        Self::Pain,
        Self::Headache,
        Self::Mood,
        Self::Constipation,
        Self::ChestPainLeft,
        Self::ChestPainRight,
        Self::ChestPainMiddle,
        Self::RibPainLeft,
        Self::RibPainRight,
    ];

    /// Stable tag used in persisted documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::PassingGas => "passing_gas",
            Self::Acidity => "acidity",
            Self::Burping => "burping",
            Self::Pain => "pain",
            Self::Headache => "headache",
            Self::Mood => "mood",
            Self::Constipation => "constipation",
            Self::ChestPainLeft => "chest_pain_left",
            Self::ChestPainRight => "chest_pain_right",
            Self::ChestPainMiddle => "chest_pain_middle",
            Self::RibPainLeft => "rib_pain_left",
            Self::RibPainRight => "rib_pain_right",
        }
    }

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Energy => "Energy Levels",
            Self::PassingGas => "Passing Gas",
            Self::Acidity => "Acidity",
            Self::Burping => "Burping",
            Self::Pain => "Stomach Pain",
            Self::Headache => "Headache",
            Self::Mood => "Mood",
            Self::Constipation => "Constipation",
            Self::ChestPainLeft => "Chest Pain (Left)",
            Self::ChestPainRight => "Chest Pain (Right)",
            Self::ChestPainMiddle => "Chest Pain (Middle)",
            Self::RibPainLeft => "Rib Pain (Left)",
            Self::RibPainRight => "Rib Pain (Right)",
        }
    }
}

/// Parses one catalog tag. Matching is exact after trimming.
pub fn parse_symptom_kind(value: &str) -> Result<SymptomKind, ValidationError> {
    let normalized = value.trim();
    SymptomKind::ALL
        .into_iter()
        .find(|kind| kind.as_str() == normalized)
        .ok_or_else(|| ValidationError::UnknownSymptomType(normalized.to_string()))
}

/// Logged symptom event.
///
/// Serialized with the catalog tag under `type`. Legacy documents store the
/// tag under `symptom` (with `type` set to the literal `"symptom"`); both
/// shapes are accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSymptom")]
pub struct Symptom {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: SymptomKind,
    pub severity: u8,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawSymptom {
    id: RecordId,
    #[serde(rename = "type")]
    type_tag: Option<String>,
    symptom: Option<String>,
    severity: i64,
    timestamp: DateTime<Utc>,
}

impl TryFrom<RawSymptom> for Symptom {
    type Error = ValidationError;

    fn try_from(raw: RawSymptom) -> Result<Self, Self::Error> {
        let tag = raw
            .symptom
            .or(raw.type_tag)
            .ok_or_else(|| ValidationError::UnknownSymptomType(String::new()))?;
        Ok(Self {
            id: raw.id,
            kind: parse_symptom_kind(&tag)?,
            severity: validate_severity(raw.severity)?,
            timestamp: raw.timestamp,
        })
    }
}

/// Request model for logging a symptom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSymptom {
    pub kind: SymptomKind,
    /// Raw user input; validated against the severity range on insert.
    pub severity: i64,
    /// `None` means "now" according to the store clock.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewSymptom {
    pub fn new(kind: SymptomKind, severity: i64) -> Self {
        Self {
            kind,
            severity,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
