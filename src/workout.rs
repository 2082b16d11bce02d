use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::TrackerError;
use crate::normalization;

/// The kind of training a workout belongs to. It decides which of the
/// optional field groups on a [`WorkoutRecord`] mean anything.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Strength,
    Cardio,
    Flexibility,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Strength, Category::Cardio, Category::Flexibility];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Strength => "strength",
            Category::Cardio => "cardio",
            Category::Flexibility => "flexibility",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Strength
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TrackerError::invalid("category", format!("unknown category {:?}", s)))
    }
}

/// How hard a cardio or flexibility session felt.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
    Extreme,
}

impl Intensity {
    pub const ALL: [Intensity; 4] = [
        Intensity::Low,
        Intensity::Medium,
        Intensity::High,
        Intensity::Extreme,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
            Intensity::Extreme => "extreme",
        }
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity::Medium
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intensity {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intensity::ALL
            .iter()
            .copied()
            .find(|i| i.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TrackerError::invalid("intensity", format!("unknown intensity {:?}", s)))
    }
}

/// A single workout in the store. Records are never edited, only
/// created and deleted.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WorkoutRecord {
    /// The ID assigned by the store.
    pub id: Uuid,

    /// The owner of the record.
    pub user_email: String,

    /// The display name of the exercise.
    pub exercise: String,

    pub category: Category,

    pub sets: Option<i32>,

    pub reps: Option<i32>,

    /// Absent means bodyweight.
    pub weight: Option<f64>,

    /// In minutes.
    pub duration: Option<i32>,

    pub distance: Option<f64>,

    pub intensity: Intensity,

    /// When the workout happened.
    #[serde(rename = "date", with = "time::serde::timestamp")]
    pub occurred_at: OffsetDateTime,

    /// When the store accepted the record.
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

/// The body of a creation request, as submitted. Every field is
/// optional here so that missing ones can be reported as such.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct NewWorkout {
    #[serde(default, deserialize_with = "normalization::deserialize_email")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_exercise")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,

    #[serde(default, with = "optional_timestamp")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<OffsetDateTime>,
}

impl NewWorkout {
    /// Checks the required fields and the numeric invariants, filling in
    /// the defaults for category and intensity.
    pub fn validate(self) -> Result<ValidatedWorkout, TrackerError> {
        let user_email = self
            .user_email
            .ok_or(TrackerError::MissingField("user_email"))?;
        let exercise = self.exercise.ok_or(TrackerError::MissingField("exercise"))?;

        check_count("sets", self.sets)?;
        check_count("reps", self.reps)?;
        check_amount("weight", self.weight)?;
        check_amount("distance", self.distance)?;

        if let Some(duration) = self.duration {
            if duration < 0 {
                return Err(TrackerError::invalid("duration", "must not be negative"));
            }
        }

        Ok(ValidatedWorkout {
            user_email,
            exercise,
            category: self.category.unwrap_or_default(),
            sets: self.sets,
            reps: self.reps,
            weight: self.weight,
            duration: self.duration,
            distance: self.distance,
            intensity: self.intensity.unwrap_or_default(),
            occurred_at: self.date,
        })
    }
}

/// A creation request that passed [`NewWorkout::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedWorkout {
    pub user_email: String,
    pub exercise: String,
    pub category: Category,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub duration: Option<i32>,
    pub distance: Option<f64>,
    pub intensity: Intensity,
    pub occurred_at: Option<OffsetDateTime>,
}

impl ValidatedWorkout {
    /// Turns the request into a stored record.
    pub fn into_record(self, id: Uuid, created_at: OffsetDateTime) -> WorkoutRecord {
        WorkoutRecord {
            id,
            user_email: self.user_email,
            exercise: self.exercise,
            category: self.category,
            sets: self.sets,
            reps: self.reps,
            weight: self.weight,
            duration: self.duration,
            distance: self.distance,
            intensity: self.intensity,
            occurred_at: self.occurred_at.unwrap_or(created_at),
            created_at,
        }
    }
}

/// The state of the entry form. Which fields are required depends on
/// the category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkoutDraft {
    pub exercise: String,
    pub category: Category,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub duration: Option<i32>,
    pub distance: Option<f64>,
    pub intensity: Intensity,
}

impl WorkoutDraft {
    pub fn new(exercise: impl Into<String>, category: Category) -> Self {
        WorkoutDraft {
            exercise: exercise.into(),
            category,
            ..Default::default()
        }
    }

    /// Rejects drafts the form must not submit.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if normalization::normalize_exercise(&self.exercise).is_empty() {
            return Err(TrackerError::MissingField("exercise"));
        }

        match self.category {
            Category::Strength => {
                if self.sets.is_none() {
                    return Err(TrackerError::MissingField("sets"));
                }
                if self.reps.is_none() {
                    return Err(TrackerError::MissingField("reps"));
                }
            }
            Category::Cardio | Category::Flexibility => {
                if self.duration.is_none() {
                    return Err(TrackerError::MissingField("duration"));
                }
            }
        }

        check_count("sets", self.sets)?;
        check_count("reps", self.reps)?;
        check_amount("weight", self.weight)?;
        check_amount("distance", self.distance)?;

        Ok(())
    }

    /// Builds the creation request, keeping only the fields that belong
    /// to the draft's category.
    pub fn to_new_workout(
        &self,
        user_email: &str,
        occurred_at: OffsetDateTime,
    ) -> Result<NewWorkout, TrackerError> {
        self.validate()?;

        let mut workout = NewWorkout {
            user_email: Some(normalization::normalize_email(user_email)),
            exercise: Some(normalization::normalize_exercise(&self.exercise)),
            category: Some(self.category),
            date: Some(occurred_at),
            ..Default::default()
        };

        match self.category {
            Category::Strength => {
                workout.sets = self.sets;
                workout.reps = self.reps;
                workout.weight = self.weight;
            }
            Category::Cardio => {
                workout.duration = self.duration;
                workout.distance = self.distance;
                workout.intensity = Some(self.intensity);
            }
            Category::Flexibility => {
                workout.duration = self.duration;
                workout.intensity = Some(self.intensity);
            }
        }

        Ok(workout)
    }
}

fn check_count(field: &'static str, value: Option<i32>) -> Result<(), TrackerError> {
    match value {
        Some(n) if n < 1 => Err(TrackerError::invalid(field, "must be at least 1")),
        _ => Ok(()),
    }
}

fn check_amount(field: &'static str, value: Option<f64>) -> Result<(), TrackerError> {
    match value {
        Some(x) if !x.is_finite() => Err(TrackerError::invalid(field, "must be a finite number")),
        Some(x) if x < 0.0 => Err(TrackerError::invalid(field, "must not be negative")),
        _ => Ok(()),
    }
}

/// `time::serde::timestamp` for optional fields.
pub(crate) mod optional_timestamp {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    #[derive(Deserialize)]
    struct Timestamp(#[serde(with = "time::serde::timestamp")] OffsetDateTime);

    pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => time::serde::timestamp::serialize(t, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let o: Option<Timestamp> = Deserialize::deserialize(deserializer)?;
        Ok(o.map(|Timestamp(t)| t))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::OffsetDateTime;

    use super::*;

    #[test]
    fn creation_body_defaults_category_and_intensity() {
        let body = json!({ "user_email": "ana@example.com", "exercise": " Squat " });
        let workout: NewWorkout = serde_json::from_value(body).expect("parse creation body");

        let validated = workout.validate().expect("validate creation body");

        assert_eq!(validated.exercise, "Squat");
        assert_eq!(validated.category, Category::Strength);
        assert_eq!(validated.intensity, Intensity::Medium);
        assert_eq!(validated.occurred_at, None);
    }

    #[test]
    fn creation_body_requires_email_and_exercise() {
        let blank_exercise: NewWorkout =
            serde_json::from_value(json!({ "user_email": "ana@example.com", "exercise": "  " }))
                .expect("parse creation body");
        let no_email: NewWorkout =
            serde_json::from_value(json!({ "exercise": "Squat" })).expect("parse creation body");

        assert!(matches!(
            blank_exercise.validate(),
            Err(TrackerError::MissingField("exercise"))
        ));
        assert!(matches!(
            no_email.validate(),
            Err(TrackerError::MissingField("user_email"))
        ));
    }

    #[test]
    fn creation_body_enforces_numeric_invariants() {
        let base = NewWorkout {
            user_email: Some("ana@example.com".to_owned()),
            exercise: Some("Squat".to_owned()),
            ..Default::default()
        };

        let zero_sets = NewWorkout { sets: Some(0), ..base.clone() };
        let negative_weight = NewWorkout { weight: Some(-5.0), ..base.clone() };
        let bodyweight = NewWorkout { sets: Some(3), reps: Some(12), ..base };

        assert!(matches!(
            zero_sets.validate(),
            Err(TrackerError::InvalidField { field: "sets", .. })
        ));
        assert!(matches!(
            negative_weight.validate(),
            Err(TrackerError::InvalidField { field: "weight", .. })
        ));
        assert!(bodyweight.validate().is_ok());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let result = serde_json::from_value::<NewWorkout>(json!({ "category": "zumba" }));

        assert!(result.is_err());
        assert!("Cardio".parse::<Category>().is_ok());
        assert!("zumba".parse::<Category>().is_err());
    }

    #[test]
    fn record_serializes_date_as_timestamp() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000);
        let record = ValidatedWorkout {
            user_email: "ana@example.com".to_owned(),
            exercise: "Running".to_owned(),
            category: Category::Cardio,
            sets: None,
            reps: None,
            weight: None,
            duration: Some(30),
            distance: Some(5.0),
            intensity: Intensity::High,
            occurred_at: None,
        }
        .into_record(Uuid::nil(), at);

        let value = serde_json::to_value(&record).expect("serialize record");

        assert_eq!(value["date"], json!(1_700_000_000));
        assert_eq!(value["created_at"], json!(1_700_000_000));
        assert_eq!(value["intensity"], json!("high"));
        assert_eq!(value["category"], json!("cardio"));
    }

    #[test]
    fn strength_draft_needs_sets_and_reps() {
        let mut draft = WorkoutDraft::new("Bench Press", Category::Strength);
        draft.sets = Some(3);

        assert!(matches!(
            draft.validate(),
            Err(TrackerError::MissingField("reps"))
        ));

        draft.reps = Some(8);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn flexibility_draft_drops_distance() {
        let mut draft = WorkoutDraft::new("Downward Dog", Category::Flexibility);
        draft.duration = Some(10);
        draft.distance = Some(1.0);
        draft.intensity = Intensity::Low;

        let workout = draft
            .to_new_workout("ana@example.com", OffsetDateTime::from_unix_timestamp(0))
            .expect("build creation request");

        assert_eq!(workout.distance, None);
        assert_eq!(workout.duration, Some(10));
        assert_eq!(workout.intensity, Some(Intensity::Low));
        assert_eq!(workout.sets, None);
    }

    #[test]
    fn empty_draft_is_rejected_before_anything_else() {
        let draft = WorkoutDraft::default();

        assert!(matches!(
            draft.validate(),
            Err(TrackerError::MissingField("exercise"))
        ));
    }
}
