use futures::future::BoxFuture;
use uuid::Uuid;

use crate::errors::TrackerError;
use crate::user::User;
use crate::workout::{ValidatedWorkout, WorkoutRecord};

pub mod mock;

pub trait Db {
    /// All records owned by `user_email`, most recently created first.
    fn list(&self, user_email: &str) -> BoxFuture<Result<Vec<WorkoutRecord>, TrackerError>>;

    fn insert(&self, workout: ValidatedWorkout) -> BoxFuture<Result<WorkoutRecord, TrackerError>>;

    /// Removes a record. Returns whether anything was removed.
    fn delete(&self, id: &Uuid) -> BoxFuture<Result<bool, TrackerError>>;

    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<Result<Option<User>, TrackerError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        postgres::{PgPool, PgRow},
    };
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::errors::TrackerError;
    use crate::user::User;
    use crate::workout::{Category, Intensity, ValidatedWorkout, WorkoutRecord};

    const SETS_CONSTRAINT: &str = "workouts_sets_positive";
    const REPS_CONSTRAINT: &str = "workouts_reps_positive";
    const WEIGHT_CONSTRAINT: &str = "workouts_weight_nonnegative";
    const DURATION_CONSTRAINT: &str = "workouts_duration_nonnegative";
    const DISTANCE_CONSTRAINT: &str = "workouts_distance_nonnegative";

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn list(&self, user_email: &str) -> BoxFuture<Result<Vec<WorkoutRecord>, TrackerError>> {
            let user_email = user_email.to_owned();

            async move {
                let query = sqlx::query(include_str!("queries/list_workouts.sql"));

                let records = query
                    .bind(user_email)
                    .try_map(|row: PgRow| record_from_row(&row))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(records)
            }
            .boxed()
        }

        fn insert(
            &self,
            workout: ValidatedWorkout,
        ) -> BoxFuture<Result<WorkoutRecord, TrackerError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/insert_workout.sql"));

                let (id, occurred_at, created_at): (Uuid, OffsetDateTime, OffsetDateTime) = query
                    .bind(&workout.user_email)
                    .bind(&workout.exercise)
                    .bind(workout.category.as_str())
                    .bind(workout.sets)
                    .bind(workout.reps)
                    .bind(workout.weight)
                    .bind(workout.duration)
                    .bind(workout.distance)
                    .bind(workout.intensity.as_str())
                    .bind(workout.occurred_at)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                let mut record = workout.into_record(id, created_at);
                record.occurred_at = occurred_at;

                Ok(record)
            }
            .boxed()
        }

        fn delete(&self, id: &Uuid) -> BoxFuture<Result<bool, TrackerError>> {
            let id = *id;

            async move {
                let query = sqlx::query(include_str!("queries/delete_workout.sql"));

                let count = query
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                Ok(count > 0)
            }
            .boxed()
        }

        fn authenticate(
            &self,
            email: &str,
            password: &str,
        ) -> BoxFuture<Result<Option<User>, TrackerError>> {
            let email = email.to_owned();
            let password = password.to_owned();

            async move {
                let query = sqlx::query(include_str!("queries/authenticate.sql"));

                let user = query
                    .bind(email)
                    .bind(password)
                    .try_map(|row: PgRow| {
                        Ok(User::new(
                            try_get(&row, "id")?,
                            try_get(&row, "email")?,
                            try_get(&row, "name")?,
                        ))
                    })
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(user)
            }
            .boxed()
        }
    }

    fn record_from_row(row: &PgRow) -> Result<WorkoutRecord, sqlx::Error> {
        let category: String = try_get(row, "category")?;
        let category: Category = category
            .parse()
            .map_err(|e: TrackerError| sqlx::Error::Decode(Box::new(e)))?;
        let intensity: String = try_get(row, "intensity")?;
        let intensity: Intensity = intensity
            .parse()
            .map_err(|e: TrackerError| sqlx::Error::Decode(Box::new(e)))?;

        Ok(WorkoutRecord {
            id: try_get(row, "id")?,
            user_email: try_get(row, "user_email")?,
            exercise: try_get(row, "exercise")?,
            category,
            sets: try_get(row, "sets")?,
            reps: try_get(row, "reps")?,
            weight: try_get(row, "weight")?,
            duration: try_get(row, "duration")?,
            distance: try_get(row, "distance")?,
            intensity,
            occurred_at: try_get(row, "date")?,
            created_at: try_get(row, "created_at")?,
        })
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn map_sqlx_error(error: sqlx::Error) -> TrackerError {
        use sqlx::Error;

        let field = match &error {
            Error::Database(e) => match e.constraint() {
                Some(SETS_CONSTRAINT) => Some("sets"),
                Some(REPS_CONSTRAINT) => Some("reps"),
                Some(WEIGHT_CONSTRAINT) => Some("weight"),
                Some(DURATION_CONSTRAINT) => Some("duration"),
                Some(DISTANCE_CONSTRAINT) => Some("distance"),
                _ => None,
            },
            _ => None,
        };

        match field {
            Some(field) => TrackerError::invalid(field, "rejected by the store"),
            None => TrackerError::Sqlx { source: error },
        }
    }
}
