//! Symptom-to-meal correlation analyzer.
//!
//! # Responsibility
//! - Match each occurrence of one symptom type against meals eaten inside
//!   the lookback window before it.
//! - Tally meal names and ingredient tokens, apply the reporting threshold
//!   and rank candidates deterministically.
//!
//! # Invariants
//! - A meal matches a symptom at `t` iff
//!   `t - lookback_window < meal.timestamp <= t - min_delay`. Meals after
//!   onset never match.
//! - Each matched (occurrence, meal) pair adds exactly 1 to the meal name and
//!   to each distinct ingredient of that meal. Severity is not a weight.
//! - Ranking: count desc, then latest matched occurrence desc, then name asc.
//! - "No symptoms of this type" and "no strong correlation" stay distinct.

use crate::config::{AnalyzerConfig, ConfigError};
use crate::model::meal::Meal;
use crate::model::store_data::StoreData;
use crate::model::symptom::{Symptom, SymptomKind};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// One reported trigger candidate (meal name or ingredient token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationCandidate {
    /// Exact meal name, or lowercase ingredient token.
    pub name: String,
    /// Number of matched (occurrence, meal) pairs.
    pub count: u32,
    /// Number of distinct symptom occurrences this candidate preceded.
    pub occurrences_matched: u32,
    /// `occurrences_matched` as a rounded share of all occurrences.
    pub percentage: u8,
    /// Onset of the latest symptom occurrence this candidate matched.
    pub last_matched: DateTime<Utc>,
}

/// Ranked candidates for one symptom type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationReport {
    pub symptom: SymptomKind,
    pub occurrences: usize,
    pub meals: Vec<CorrelationCandidate>,
    pub ingredients: Vec<CorrelationCandidate>,
}

/// Outcome of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResult {
    /// No symptom of the requested type is logged.
    NoSymptomsOfType { symptom: SymptomKind },
    /// Symptoms exist but no candidate passed the threshold.
    NoStrongCorrelation {
        symptom: SymptomKind,
        occurrences: usize,
    },
    Correlated(CorrelationReport),
}

impl AnalysisResult {
    pub fn is_correlated(&self) -> bool {
        matches!(self, Self::Correlated(_))
    }

    /// User-facing summary line.
    pub fn message(&self) -> String {
        match self {
            Self::NoSymptomsOfType { symptom } => format!(
                "No \"{}\" symptoms logged yet, so there are no correlations to show.",
                symptom.as_str()
            ),
            Self::NoStrongCorrelation { symptom, .. } => format!(
                "No strong dietary correlations found for \"{}\". Try logging more data!",
                symptom.as_str()
            ),
            Self::Correlated(report) => format!(
                "Found {} meal and {} ingredient candidate(s) for \"{}\" across {} occurrence(s).",
                report.meals.len(),
                report.ingredients.len(),
                report.symptom.as_str(),
                report.occurrences
            ),
        }
    }
}

/// Analyzer bound to a validated configuration.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationAnalyzer {
    config: AnalyzerConfig,
}

impl CorrelationAnalyzer {
    /// # Errors
    /// - Returns `ConfigError` when the window or threshold is invalid.
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn analyze(&self, data: &StoreData, symptom: SymptomKind) -> AnalysisResult {
        analyze(data, symptom, &self.config)
    }
}

#[derive(Debug, Default)]
struct Tally {
    count: u32,
    occurrences: u32,
    last_occurrence: Option<usize>,
    last_matched: Option<DateTime<Utc>>,
}

impl Tally {
    fn record(&mut self, occurrence: usize, onset: DateTime<Utc>) {
        self.count += 1;
        if self.last_occurrence != Some(occurrence) {
            self.occurrences += 1;
            self.last_occurrence = Some(occurrence);
        }
        self.last_matched = Some(self.last_matched.map_or(onset, |last| last.max(onset)));
    }
}

/// Correlates one symptom type with preceding meals and ingredients.
///
/// A `min_occurrences` of zero is treated as one.
pub fn analyze(data: &StoreData, symptom: SymptomKind, config: &AnalyzerConfig) -> AnalysisResult {
    let occurrences: Vec<&Symptom> = data.symptoms_of(symptom).collect();
    if occurrences.is_empty() {
        return AnalysisResult::NoSymptomsOfType { symptom };
    }

    let mut meal_tallies: BTreeMap<String, Tally> = BTreeMap::new();
    let mut ingredient_tallies: BTreeMap<String, Tally> = BTreeMap::new();

    for (index, occurrence) in occurrences.iter().enumerate() {
        let onset = occurrence.timestamp;
        for meal in data.meals.iter().filter(|meal| in_window(meal, onset, config)) {
            meal_tallies
                .entry(meal.name.clone())
                .or_default()
                .record(index, onset);
            for token in ingredient_keys(meal) {
                ingredient_tallies
                    .entry(token)
                    .or_default()
                    .record(index, onset);
            }
        }
    }

    let threshold = config.min_occurrences.max(1);
    let total = occurrences.len();
    let meals = rank(meal_tallies, threshold, total);
    let ingredients = rank(ingredient_tallies, threshold, total);

    if meals.is_empty() && ingredients.is_empty() {
        return AnalysisResult::NoStrongCorrelation {
            symptom,
            occurrences: total,
        };
    }

    AnalysisResult::Correlated(CorrelationReport {
        symptom,
        occurrences: total,
        meals,
        ingredients,
    })
}

fn in_window(meal: &Meal, onset: DateTime<Utc>, config: &AnalyzerConfig) -> bool {
    let after_start = match onset.checked_sub_signed(config.lookback_window) {
        Some(start) => meal.timestamp > start,
        None => true,
    };
    let before_end = match onset.checked_sub_signed(config.min_delay) {
        Some(end) => meal.timestamp <= end,
        None => false,
    };
    after_start && before_end
}

/// Distinct lowercase ingredient tokens of one meal.
fn ingredient_keys(meal: &Meal) -> BTreeSet<String> {
    meal.ingredients
        .iter()
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

fn rank(tallies: BTreeMap<String, Tally>, threshold: u32, total: usize) -> Vec<CorrelationCandidate> {
    let mut candidates: Vec<CorrelationCandidate> = tallies
        .into_iter()
        .filter(|(_, tally)| tally.count >= threshold)
        .filter_map(|(name, tally)| {
            Some(CorrelationCandidate {
                name,
                count: tally.count,
                occurrences_matched: tally.occurrences,
                percentage: percentage(tally.occurrences, total),
                last_matched: tally.last_matched?,
            })
        })
        .collect();
    candidates.sort_by(compare_candidates);
    candidates
}

fn compare_candidates(a: &CorrelationCandidate, b: &CorrelationCandidate) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| b.last_matched.cmp(&a.last_matched))
        .then_with(|| a.name.cmp(&b.name))
}

fn percentage(matched: u32, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let share = (f64::from(matched) * 100.0 / total as f64).round();
    share.clamp(0.0, 100.0) as u8
}
