//! Daily symptom frequency series for the trends chart.

use crate::model::store_data::StoreData;
use crate::model::symptom::SymptomKind;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Longest window `symptom_frequency` will build; larger requests are clamped.
pub const MAX_TREND_DAYS: u32 = 366;

/// Per-day symptom counts over a trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrendSeries {
    /// One label per day, oldest first, ending at the `as_of` day.
    pub days: Vec<NaiveDate>,
    /// One row per symptom kind present in the store, in catalog order.
    pub series: Vec<SymptomSeries>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomSeries {
    pub symptom: SymptomKind,
    /// Aligned with `TrendSeries::days`.
    pub counts: Vec<u32>,
}

/// Buckets symptoms by whole days elapsed before `as_of`.
///
/// A symptom `d` whole days before `as_of` lands in bucket `days - 1 - d`.
/// Symptoms after `as_of` or `days` or more days old are ignored, but their
/// kind still gets an (all-zero) row. `days` is clamped to
/// [`MAX_TREND_DAYS`].
pub fn symptom_frequency(data: &StoreData, as_of: DateTime<Utc>, days: u32) -> TrendSeries {
    let days = days.min(MAX_TREND_DAYS);
    if days == 0 {
        return TrendSeries::default();
    }

    let today = as_of.date_naive();
    let labels: Vec<NaiveDate> = (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_signed(Duration::days(i64::from(offset))))
        .collect();

    let series = SymptomKind::ALL
        .into_iter()
        .filter(|kind| data.symptoms.iter().any(|symptom| symptom.kind == *kind))
        .map(|kind| {
            let mut counts = vec![0_u32; days as usize];
            for symptom in data.symptoms_of(kind) {
                let elapsed = as_of - symptom.timestamp;
                if elapsed < Duration::zero() {
                    continue;
                }
                let whole_days = elapsed.num_days();
                if whole_days < i64::from(days) {
                    counts[(i64::from(days) - 1 - whole_days) as usize] += 1;
                }
            }
            SymptomSeries {
                symptom: kind,
                counts,
            }
        })
        .collect();

    TrendSeries {
        days: labels,
        series,
    }
}
