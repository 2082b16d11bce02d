//! Personal-record detection.
//!
//! A single forward pass over a user's history, oldest first, keeping
//! the best weight, reps, sets and volume seen per exercise. The first
//! time an exercise shows up it only sets the baseline; afterwards any
//! strict improvement produces one [`PersonalRecordEvent`] for the
//! record, however many metrics improved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::workout::WorkoutRecord;

/// How many recent events the dashboard shows by default.
pub const DEFAULT_DISPLAY_LIMIT: usize = 5;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MaxWeight,
    MaxReps,
    MaxSets,
    MaxVolume,
}

/// Running bests for one exercise.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExerciseBests {
    pub max_weight: f64,
    pub max_reps: i32,
    pub max_sets: i32,
    pub max_volume: f64,
    pub total_workouts: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PersonalRecordEvent {
    pub exercise: String,

    /// The improved metric with the largest new value.
    pub metric: Metric,

    pub value: f64,

    #[serde(rename = "date", with = "time::serde::timestamp")]
    pub occurred_at: OffsetDateTime,
}

/// The outcome of a full pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PersonalRecords {
    pub records_by_exercise: BTreeMap<String, ExerciseBests>,
    pub events: Vec<PersonalRecordEvent>,
}

impl PersonalRecords {
    /// The last `limit` events, oldest of them first.
    pub fn recent_events(&self, limit: usize) -> &[PersonalRecordEvent] {
        let skip = self.events.len().saturating_sub(limit);
        &self.events[skip..]
    }

    /// Drops all but the last `limit` events.
    pub fn truncate_events(mut self, limit: usize) -> Self {
        let skip = self.events.len().saturating_sub(limit);
        self.events.drain(..skip);
        self
    }
}

/// One record's metrics with missing fields read as 0.
struct Sample {
    weight: f64,
    reps: i32,
    sets: i32,
    volume: f64,
}

impl Sample {
    fn of(record: &WorkoutRecord) -> Self {
        let weight = record.weight.unwrap_or(0.0);
        let reps = record.reps.unwrap_or(0);
        let sets = record.sets.unwrap_or(0);

        Sample {
            weight,
            reps,
            sets,
            volume: f64::from(sets) * f64::from(reps) * weight,
        }
    }
}

/// The incremental form of [`track`]. Feed records oldest first.
#[derive(Debug, Default)]
pub struct PersonalRecordTracker {
    bests: BTreeMap<String, ExerciseBests>,
    events: Vec<PersonalRecordEvent>,
}

impl PersonalRecordTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one record in, returning the event it triggers, if any.
    pub fn observe(&mut self, record: &WorkoutRecord) -> Option<PersonalRecordEvent> {
        let sample = Sample::of(record);

        let bests = match self.bests.get_mut(&record.exercise) {
            Some(bests) => bests,
            None => {
                self.bests.insert(
                    record.exercise.clone(),
                    ExerciseBests {
                        max_weight: sample.weight,
                        max_reps: sample.reps,
                        max_sets: sample.sets,
                        max_volume: sample.volume,
                        total_workouts: 1,
                    },
                );

                return None;
            }
        };

        bests.total_workouts += 1;

        let mut improvements: Vec<(Metric, f64)> = Vec::with_capacity(4);

        if sample.weight > bests.max_weight {
            bests.max_weight = sample.weight;
            improvements.push((Metric::MaxWeight, sample.weight));
        }
        if sample.reps > bests.max_reps {
            bests.max_reps = sample.reps;
            improvements.push((Metric::MaxReps, f64::from(sample.reps)));
        }
        if sample.sets > bests.max_sets {
            bests.max_sets = sample.sets;
            improvements.push((Metric::MaxSets, f64::from(sample.sets)));
        }
        if sample.volume > bests.max_volume {
            bests.max_volume = sample.volume;
            improvements.push((Metric::MaxVolume, sample.volume));
        }

        let (metric, value) = improvements
            .into_iter()
            .fold(None, |best: Option<(Metric, f64)>, candidate| match best {
                Some(b) if b.1 >= candidate.1 => Some(b),
                _ => Some(candidate),
            })?;

        let event = PersonalRecordEvent {
            exercise: record.exercise.clone(),
            metric,
            value,
            occurred_at: record.occurred_at,
        };

        self.events.push(event.clone());

        Some(event)
    }

    pub fn bests(&self, exercise: &str) -> Option<&ExerciseBests> {
        self.bests.get(exercise)
    }

    pub fn finish(self) -> PersonalRecords {
        PersonalRecords {
            records_by_exercise: self.bests,
            events: self.events,
        }
    }
}

/// Runs the tracker over `records` in the order given, which must be
/// oldest first.
pub fn track<'a>(records: impl IntoIterator<Item = &'a WorkoutRecord>) -> PersonalRecords {
    let mut tracker = PersonalRecordTracker::new();

    for record in records {
        tracker.observe(record);
    }

    tracker.finish()
}

/// Like [`track`], but orders `records` oldest first by `occurred_at`,
/// breaking ties by `created_at`, so any input order works.
pub fn track_chronological(records: &[WorkoutRecord]) -> PersonalRecords {
    let mut ordered: Vec<&WorkoutRecord> = records.iter().collect();
    ordered.sort_by_key(|r| (r.occurred_at, r.created_at));

    track(ordered)
}
