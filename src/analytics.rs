//! Aggregations over a user's workout history.
//!
//! Everything here is pure: each function takes the full record list and
//! recomputes its answer from scratch, so callers can run them on every
//! request without caching. Missing optional fields never cause an
//! error; each operation documents the default it substitutes.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use time::{Date, Duration, OffsetDateTime};

use crate::errors::TrackerError;
use crate::workout::{Category, WorkoutRecord};

pub mod muscle;

pub use muscle::MuscleGroup;

/// How many distinct dates the volume chart shows by default.
pub const DEFAULT_WINDOW_DAYS: usize = 30;

/// Total strength volume: `sets * reps * weight`, with an absent weight
/// counting as 0. Records without sets or reps, and every cardio or
/// flexibility record, contribute nothing.
pub fn total_volume(records: &[WorkoutRecord]) -> f64 {
    records.iter().filter_map(|r| volume(r, 0.0)).sum()
}

/// One point on the volume trend chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyVolume {
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,

    pub volume: f64,
}

/// Per-date volume for the trend chart, oldest first, limited to the
/// most recent `window_days` distinct dates.
///
/// Unlike [`total_volume`], an absent weight counts as 1 here so that
/// bodyweight work still draws a line. Every record opens a bucket for
/// its (UTC) date, even when it contributes no volume.
pub fn volume_by_date(records: &[WorkoutRecord], window_days: usize) -> Vec<DailyVolume> {
    let mut by_date: BTreeMap<Date, f64> = BTreeMap::new();

    for record in records {
        *by_date.entry(record.occurred_at.date()).or_insert(0.0) +=
            volume(record, 1.0).unwrap_or(0.0);
    }

    let skip = by_date.len().saturating_sub(window_days);

    by_date
        .into_iter()
        .skip(skip)
        .map(|(date, volume)| DailyVolume { date, volume })
        .collect()
}

/// Number of records per muscle group. Each record lands in exactly one
/// group; see [`muscle::classify`].
pub fn muscle_group_distribution(records: &[WorkoutRecord]) -> BTreeMap<MuscleGroup, usize> {
    let mut counts = BTreeMap::new();

    for record in records {
        *counts.entry(muscle::classify(&record.exercise)).or_insert(0) += 1;
    }

    counts
}

/// Consecutive calendar days with at least one record, counted back from
/// the date of `as_of` in its own UTC offset. A day without a record
/// ends the streak, including `as_of`'s own day.
pub fn current_streak(records: &[WorkoutRecord], as_of: OffsetDateTime) -> u32 {
    let offset = as_of.offset();
    let days: BTreeSet<Date> = records
        .iter()
        .filter(|r| r.occurred_at <= as_of)
        .map(|r| r.occurred_at.to_offset(offset).date())
        .collect();

    let mut streak = 0;
    let mut day = as_of.date();

    while days.contains(&day) {
        streak += 1;
        day = day - Duration::days(1);
    }

    streak
}

/// Records that happened during the seven days ending at `as_of`.
pub fn this_week_count(records: &[WorkoutRecord], as_of: OffsetDateTime) -> usize {
    let start = as_of - Duration::days(7);

    records
        .iter()
        .filter(|r| r.occurred_at >= start && r.occurred_at <= as_of)
        .count()
}

/// The dashboard's stat cards and charts in one pass over the history.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub total_workouts: usize,
    pub this_week: usize,
    pub total_volume: f64,
    pub streak: u32,
    pub volume_by_date: Vec<DailyVolume>,
    pub muscle_groups: BTreeMap<MuscleGroup, usize>,
}

pub fn summarize(records: &[WorkoutRecord], as_of: OffsetDateTime, window_days: usize) -> Summary {
    Summary {
        total_workouts: records.len(),
        this_week: this_week_count(records, as_of),
        total_volume: total_volume(records),
        streak: current_streak(records, as_of),
        volume_by_date: volume_by_date(records, window_days),
        muscle_groups: muscle_group_distribution(records),
    }
}

/// How the history list is ordered.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recent first.
    Date,
    /// Alphabetical by exercise name.
    Exercise,
    /// Heaviest strength volume first.
    Volume,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Date
    }
}

impl FromStr for SortOrder {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortOrder::Date),
            "exercise" => Ok(SortOrder::Exercise),
            "volume" => Ok(SortOrder::Volume),
            other => Err(TrackerError::invalid(
                "sort",
                format!("unknown sort order {:?}", other),
            )),
        }
    }
}

/// Most recent first, whatever order `records` come in. Among records
/// with the same `occurred_at` the later insertion comes first.
pub fn recent_first(records: &[WorkoutRecord]) -> Vec<&WorkoutRecord> {
    let mut ordered: Vec<&WorkoutRecord> = records.iter().collect();
    ordered.sort_by(|a, b| {
        (b.occurred_at, b.created_at).cmp(&(a.occurred_at, a.created_at))
    });
    ordered
}

/// The history list in the requested order. All orders are stable.
pub fn sorted(records: &[WorkoutRecord], order: SortOrder) -> Vec<&WorkoutRecord> {
    let mut ordered = recent_first(records);

    match order {
        SortOrder::Date => {}
        SortOrder::Exercise => {
            ordered.sort_by_cached_key(|r| r.exercise.to_lowercase());
        }
        SortOrder::Volume => {
            ordered.sort_by(|a, b| {
                let a = volume(a, 0.0).unwrap_or(0.0);
                let b = volume(b, 0.0).unwrap_or(0.0);
                b.partial_cmp(&a).unwrap_or(Ordering::Equal)
            });
        }
    }

    ordered
}

/// Strength volume of one record, `fallback_weight` standing in for an
/// absent weight. `None` when volume isn't defined for the record.
pub fn volume(record: &WorkoutRecord, fallback_weight: f64) -> Option<f64> {
    if record.category != Category::Strength {
        return None;
    }

    let sets = record.sets?;
    let reps = record.reps?;

    Some(f64::from(sets) * f64::from(reps) * record.weight.unwrap_or(fallback_weight))
}

fn serialize_date<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.format("%F"))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use time::{Date, Duration, OffsetDateTime};
    use uuid::Uuid;

    use crate::workout::{Category, Intensity, WorkoutRecord};

    /// Noon UTC on the given day.
    pub fn noon(year: i32, month: u8, day: u8) -> OffsetDateTime {
        Date::try_from_ymd(year, month, day)
            .expect("valid date")
            .midnight()
            .assume_utc()
            + Duration::hours(12)
    }

    pub fn strength(
        exercise: &str,
        sets: Option<i32>,
        reps: Option<i32>,
        weight: Option<f64>,
        at: OffsetDateTime,
    ) -> WorkoutRecord {
        WorkoutRecord {
            id: Uuid::new_v4(),
            user_email: "ana@example.com".to_owned(),
            exercise: exercise.to_owned(),
            category: Category::Strength,
            sets,
            reps,
            weight,
            duration: None,
            distance: None,
            intensity: Intensity::Medium,
            occurred_at: at,
            created_at: at,
        }
    }

    pub fn cardio(exercise: &str, duration: i32, at: OffsetDateTime) -> WorkoutRecord {
        WorkoutRecord {
            category: Category::Cardio,
            duration: Some(duration),
            sets: None,
            reps: None,
            ..strength(exercise, None, None, None, at)
        }
    }
}
