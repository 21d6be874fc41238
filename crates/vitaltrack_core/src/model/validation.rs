//! Validation errors raised by logging actions.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Inclusive lower bound of symptom severity.
pub const SEVERITY_MIN: u8 = 1;
/// Inclusive upper bound of symptom severity.
pub const SEVERITY_MAX: u8 = 10;

/// Rejected input on a meal/symptom logging action.
///
/// The store is left unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Meal name is empty or whitespace-only.
    EmptyMealName,
    /// Symptom type is not part of the catalog.
    UnknownSymptomType(String),
    /// Severity lies outside `[SEVERITY_MIN, SEVERITY_MAX]`.
    SeverityOutOfRange(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMealName => write!(f, "meal name must not be empty"),
            Self::UnknownSymptomType(value) => write!(f, "unknown symptom type: `{value}`"),
            Self::SeverityOutOfRange(value) => write!(
                f,
                "severity {value} is out of range {SEVERITY_MIN}..={SEVERITY_MAX}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Checks a raw severity value and narrows it to `u8`.
pub fn validate_severity(value: i64) -> Result<u8, ValidationError> {
    if (i64::from(SEVERITY_MIN)..=i64::from(SEVERITY_MAX)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ValidationError::SeverityOutOfRange(value))
    }
}
