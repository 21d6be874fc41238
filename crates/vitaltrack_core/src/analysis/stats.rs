//! Dashboard counters and the recent activity feed.

use crate::model::meal::Meal;
use crate::model::store_data::StoreData;
use crate::model::symptom::{Symptom, SymptomKind};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Dashboard summary derived from store contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub meals_logged: usize,
    pub symptoms_logged: usize,
    /// Meals on the UTC calendar day of `as_of`.
    pub meals_today: usize,
    /// Symptoms on the UTC calendar day of `as_of`.
    pub symptoms_today: usize,
    /// Kind and severity of the most recent symptom.
    pub latest_symptom: Option<(SymptomKind, u8)>,
    pub last_logged_at: Option<DateTime<Utc>>,
}

/// One entry of the merged meal/symptom feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityItem {
    Meal(Meal),
    Symptom(Symptom),
}

impl ActivityItem {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Meal(meal) => meal.timestamp,
            Self::Symptom(symptom) => symptom.timestamp,
        }
    }

    fn id_text(&self) -> String {
        match self {
            Self::Meal(meal) => meal.id.to_string(),
            Self::Symptom(symptom) => symptom.id.to_string(),
        }
    }
}

/// Computes dashboard counters as of one instant.
pub fn dashboard_stats(data: &StoreData, as_of: DateTime<Utc>) -> DashboardStats {
    let today = as_of.date_naive();
    let latest = data
        .symptoms
        .iter()
        .max_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| b.id.cmp(&a.id)));

    let last_logged_at = data
        .meals
        .iter()
        .map(|meal| meal.timestamp)
        .chain(data.symptoms.iter().map(|symptom| symptom.timestamp))
        .max();

    DashboardStats {
        meals_logged: data.meals.len(),
        symptoms_logged: data.symptoms.len(),
        meals_today: data
            .meals
            .iter()
            .filter(|meal| meal.timestamp.date_naive() == today)
            .count(),
        symptoms_today: data
            .symptoms
            .iter()
            .filter(|symptom| symptom.timestamp.date_naive() == today)
            .count(),
        latest_symptom: latest.map(|symptom| (symptom.kind, symptom.severity)),
        last_logged_at,
    }
}

/// Returns up to `limit` meals and symptoms, newest first.
///
/// Equal timestamps are ordered by id text so the feed is deterministic.
pub fn recent_activity(data: &StoreData, limit: usize) -> Vec<ActivityItem> {
    let mut items: Vec<ActivityItem> = data
        .meals
        .iter()
        .cloned()
        .map(ActivityItem::Meal)
        .chain(data.symptoms.iter().cloned().map(ActivityItem::Symptom))
        .collect();
    items.sort_by(compare_newest_first);
    items.truncate(limit);
    items
}

fn compare_newest_first(a: &ActivityItem, b: &ActivityItem) -> Ordering {
    b.timestamp()
        .cmp(&a.timestamp())
        .then_with(|| a.id_text().cmp(&b.id_text()))
}
