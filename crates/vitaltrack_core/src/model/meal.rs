//! Meal domain model.
//!
//! # Responsibility
//! - Define the persisted meal record and its creation request.
//! - Normalize free-text ingredient input into ordered tokens.
//!
//! # Invariants
//! - `name` is non-empty after trimming.
//! - `ingredients` never contains empty or untrimmed tokens.
//! - `id` is immutable once assigned.

use crate::model::record::RecordId;
use crate::model::validation::ValidationError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Logged meal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: RecordId,
    pub name: String,
    /// Accepts a JSON array or a legacy comma-separated string on read.
    #[serde(default, deserialize_with = "deserialize_ingredients")]
    pub ingredients: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Meal {
    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyMealName);
        }
        Ok(())
    }
}

/// Request model for logging a meal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewMeal {
    pub name: String,
    pub ingredients: Vec<String>,
    /// `None` means "now" according to the store clock.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewMeal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets ingredients from comma-separated form input.
    pub fn with_ingredients_text(mut self, text: &str) -> Self {
        self.ingredients = split_ingredients(text);
        self
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ingredients = normalize_ingredients(ingredients);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Splits comma-separated ingredient text into trimmed, non-empty tokens.
///
/// Internal whitespace runs collapse to a single space; order is preserved.
pub fn split_ingredients(text: &str) -> Vec<String> {
    normalize_ingredients(text.split(','))
}

/// Applies token normalization to already-split ingredient values.
pub fn normalize_ingredients<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .filter_map(|token| {
            let collapsed = WHITESPACE_RE.replace_all(token.as_ref().trim(), " ");
            if collapsed.is_empty() {
                None
            } else {
                Some(collapsed.into_owned())
            }
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IngredientsInput {
    List(Vec<String>),
    Text(String),
}

fn deserialize_ingredients<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = Option::<IngredientsInput>::deserialize(deserializer)?;
    Ok(match input {
        Some(IngredientsInput::List(values)) => normalize_ingredients(values),
        Some(IngredientsInput::Text(text)) => split_ingredients(&text),
        None => Vec::new(),
    })
}
