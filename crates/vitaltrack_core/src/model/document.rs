//! Lenient document decoding shared by blob load and import.
//!
//! # Responsibility
//! - Decode `{meals, symptoms, settings}` documents from JSON text.
//! - Separate structural failures (whole document) from record failures
//!   (single meal/symptom).
//!
//! # Invariants
//! - A document that is not a JSON object, or whose collections have the
//!   wrong JSON type, is a format error.
//! - A malformed record never fails the whole document; it is counted as
//!   rejected.
//! - Unknown top-level keys are ignored.

use crate::model::meal::Meal;
use crate::model::settings::Settings;
use crate::model::symptom::Symptom;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MEALS_KEY: &str = "meals";
const SYMPTOMS_KEY: &str = "symptoms";
const SETTINGS_KEY: &str = "settings";

/// Whole-document decode failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportFormatError {
    /// Payload is not parseable JSON.
    InvalidJson(String),
    /// Payload is JSON but not an object.
    NotAnObject,
    /// `meals` or `symptoms` is present but not an array.
    InvalidCollection(&'static str),
    /// `settings` is present but not an object.
    InvalidSettings,
}

impl Display for ImportFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(details) => write!(f, "document is not valid JSON: {details}"),
            Self::NotAnObject => write!(f, "document must be a JSON object"),
            Self::InvalidCollection(key) => write!(f, "document field `{key}` must be an array"),
            Self::InvalidSettings => write!(f, "document field `settings` must be an object"),
        }
    }
}

impl Error for ImportFormatError {}

impl ImportFormatError {
    /// Stable code for log lines; never carries document content.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "invalid_json",
            Self::NotAnObject => "not_an_object",
            Self::InvalidCollection(_) => "invalid_collection",
            Self::InvalidSettings => "invalid_settings",
        }
    }
}

/// Decoded document with per-record rejection counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportDocument {
    pub meals: Vec<Meal>,
    pub symptoms: Vec<Symptom>,
    /// `None` when the document carries no `settings` key.
    pub settings: Option<Settings>,
    pub rejected_meals: usize,
    pub rejected_symptoms: usize,
}

impl ImportDocument {
    pub fn rejected_count(&self) -> usize {
        self.rejected_meals + self.rejected_symptoms
    }
}

/// Decodes a document from JSON text.
pub fn parse_document(text: &str) -> Result<ImportDocument, ImportFormatError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| ImportFormatError::InvalidJson(err.to_string()))?;
    parse_document_value(value)
}

/// Decodes a document from an already-parsed JSON value.
pub fn parse_document_value(value: Value) -> Result<ImportDocument, ImportFormatError> {
    let Value::Object(mut root) = value else {
        return Err(ImportFormatError::NotAnObject);
    };

    let (meals, rejected_meals) = decode_collection(&mut root, MEALS_KEY, decode_meal)?;
    let (symptoms, rejected_symptoms) =
        decode_collection(&mut root, SYMPTOMS_KEY, decode_symptom)?;
    let settings = match root.remove(SETTINGS_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::Object(values)) => Some(Settings::from_map(values)),
        Some(_) => return Err(ImportFormatError::InvalidSettings),
    };

    Ok(ImportDocument {
        meals,
        symptoms,
        settings,
        rejected_meals,
        rejected_symptoms,
    })
}

fn decode_collection<T>(
    root: &mut Map<String, Value>,
    key: &'static str,
    decode: fn(Value) -> Option<T>,
) -> Result<(Vec<T>, usize), ImportFormatError> {
    let items = match root.remove(key) {
        None | Some(Value::Null) => return Ok((Vec::new(), 0)),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ImportFormatError::InvalidCollection(key)),
    };

    let mut decoded = Vec::with_capacity(items.len());
    let mut rejected = 0;
    for item in items {
        match decode(item) {
            Some(record) => decoded.push(record),
            None => rejected += 1,
        }
    }
    Ok((decoded, rejected))
}

fn decode_meal(value: Value) -> Option<Meal> {
    let mut meal = serde_json::from_value::<Meal>(value).ok()?;
    meal.validate().ok()?;
    meal.name = meal.name.trim().to_string();
    Some(meal)
}

fn decode_symptom(value: Value) -> Option<Symptom> {
    serde_json::from_value::<Symptom>(value).ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_document, ImportFormatError};
    use crate::model::symptom::SymptomKind;

    #[test]
    fn missing_keys_default_to_empty_and_unchanged() {
        let doc = parse_document("{}").unwrap();
        assert!(doc.meals.is_empty());
        assert!(doc.symptoms.is_empty());
        assert!(doc.settings.is_none());
    }

    #[test]
    fn unknown_top_level_keys_are_ignored() {
        let doc = parse_document(r#"{"version": 3, "meals": []}"#).unwrap();
        assert!(doc.meals.is_empty());
        assert_eq!(doc.rejected_count(), 0);
    }

    #[test]
    fn rejects_non_json_and_non_object_payloads() {
        assert!(matches!(
            parse_document("not json"),
            Err(ImportFormatError::InvalidJson(_))
        ));
        assert_eq!(parse_document("[1, 2]"), Err(ImportFormatError::NotAnObject));
    }

    #[test]
    fn rejects_wrongly_typed_collections() {
        assert_eq!(
            parse_document(r#"{"meals": "soup"}"#),
            Err(ImportFormatError::InvalidCollection("meals"))
        );
        assert_eq!(
            parse_document(r#"{"symptoms": {}}"#),
            Err(ImportFormatError::InvalidCollection("symptoms"))
        );
        assert_eq!(
            parse_document(r#"{"settings": []}"#),
            Err(ImportFormatError::InvalidSettings)
        );
    }

    #[test]
    fn malformed_records_are_counted_not_fatal() {
        let doc = parse_document(
            r#"{
                "meals": [
                    {"id": 1, "name": "Soup", "timestamp": "2024-03-01T12:00:00Z"},
                    {"id": 2, "name": "  ", "timestamp": "2024-03-01T12:00:00Z"},
                    {"id": 3, "name": "No time"}
                ],
                "symptoms": [
                    {"id": 1, "type": "pain", "severity": 4, "timestamp": "2024-03-01T14:00:00Z"},
                    {"id": 2, "type": "nausea", "severity": 4, "timestamp": "2024-03-01T14:00:00Z"},
                    {"id": 3, "type": "pain", "severity": 0, "timestamp": "2024-03-01T14:00:00Z"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.meals.len(), 1);
        assert_eq!(doc.rejected_meals, 2);
        assert_eq!(doc.symptoms.len(), 1);
        assert_eq!(doc.symptoms[0].kind, SymptomKind::Pain);
        assert_eq!(doc.rejected_symptoms, 2);
    }
}
