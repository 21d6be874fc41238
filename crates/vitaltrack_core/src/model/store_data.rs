//! Aggregate root holding every persisted collection.

use crate::model::meal::Meal;
use crate::model::record::RecordId;
use crate::model::settings::Settings;
use crate::model::symptom::{Symptom, SymptomKind};
use serde::Serialize;

/// Meals, symptoms and settings as one plain document.
///
/// This is both the persisted blob shape and the export document shape.
/// Decoding goes through [`parse_document`](crate::model::document::parse_document)
/// so every record is validated on the way in.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StoreData {
    pub meals: Vec<Meal>,
    pub symptoms: Vec<Symptom>,
    pub settings: Settings,
}

impl StoreData {
    pub fn has_meal(&self, id: &RecordId) -> bool {
        self.meals.iter().any(|meal| &meal.id == id)
    }

    pub fn has_symptom(&self, id: &RecordId) -> bool {
        self.symptoms.iter().any(|symptom| &symptom.id == id)
    }

    pub fn meal(&self, id: &RecordId) -> Option<&Meal> {
        self.meals.iter().find(|meal| &meal.id == id)
    }

    pub fn symptom(&self, id: &RecordId) -> Option<&Symptom> {
        self.symptoms.iter().find(|symptom| &symptom.id == id)
    }

    /// Returns symptoms of one catalog type, in storage order.
    pub fn symptoms_of(&self, kind: SymptomKind) -> impl Iterator<Item = &Symptom> {
        self.symptoms
            .iter()
            .filter(move |symptom| symptom.kind == kind)
    }

    /// Returns whether no meal and no symptom is stored.
    pub fn is_empty(&self) -> bool {
        self.meals.is_empty() && self.symptoms.is_empty()
    }
}
