use std::fmt;

use serde::Serialize;

/// A coarse body region used for the distribution chart.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum MuscleGroup {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
    Other,
}

impl MuscleGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Back => "Back",
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Arms => "Arms",
            MuscleGroup::Core => "Core",
            MuscleGroup::Other => "Other",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords per group, checked in this order. The first group with a
/// keyword contained in the lower-cased exercise name wins, so generic
/// keywords such as "press" shadow later groups.
const KEYWORDS: &[(MuscleGroup, &[&str])] = &[
    (
        MuscleGroup::Chest,
        &["bench press", "push ups", "dips", "flyes", "chest", "press"],
    ),
    (
        MuscleGroup::Back,
        &["pull ups", "rows", "deadlifts", "lat pulldown", "back", "pull"],
    ),
    (
        MuscleGroup::Legs,
        &["squats", "lunges", "leg press", "calf raises", "legs", "squat"],
    ),
    (
        MuscleGroup::Shoulders,
        &["shoulder press", "lateral raises", "front raises", "shoulders"],
    ),
    (
        MuscleGroup::Arms,
        &["bicep curls", "tricep extensions", "hammer curls", "arms", "curls"],
    ),
    (
        MuscleGroup::Core,
        &["planks", "crunches", "sit ups", "russian twists", "core", "plank"],
    ),
];

/// Buckets an exercise name into exactly one group.
pub fn classify(exercise: &str) -> MuscleGroup {
    let exercise = exercise.to_lowercase();

    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| exercise.contains(k)))
        .map(|(group, _)| *group)
        .unwrap_or(MuscleGroup::Other)
}
