use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use futures::future::{self, BoxFuture, FutureExt};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::TrackerError;
use crate::user::User;
use crate::workout::{ValidatedWorkout, WorkoutRecord};

struct Account {
    user: User,
    password: String,
}

/// An in-process [`Db`](super::Db) for tests and local runs. Can be
/// switched into a mode where every call fails like a lost connection.
#[derive(Default)]
pub struct MemoryDb {
    workouts: RwLock<Vec<WorkoutRecord>>,
    accounts: RwLock<Vec<Account>>,
    failing: AtomicBool,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, email: &str, password: &str, name: Option<&str>) -> Self {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Account {
                user: User::new(Uuid::new_v4(), email.to_owned(), name.map(str::to_owned)),
                password: password.to_owned(),
            });

        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every stored record, in insertion order.
    pub fn records(&self) -> Vec<WorkoutRecord> {
        self.workouts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check(&self) -> Result<(), TrackerError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(TrackerError::Sqlx {
                source: sqlx::Error::PoolTimedOut,
            })
        } else {
            Ok(())
        }
    }

    fn list_now(&self, user_email: &str) -> Result<Vec<WorkoutRecord>, TrackerError> {
        self.check()?;

        let workouts = self.workouts.read().unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<WorkoutRecord> = workouts
            .iter()
            .rev()
            .filter(|r| r.user_email == user_email)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(records)
    }

    fn insert_now(&self, workout: ValidatedWorkout) -> Result<WorkoutRecord, TrackerError> {
        self.check()?;

        let record = workout.into_record(Uuid::new_v4(), OffsetDateTime::now_utc());
        self.workouts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());

        Ok(record)
    }

    fn delete_now(&self, id: &Uuid) -> Result<bool, TrackerError> {
        self.check()?;

        let mut workouts = self.workouts.write().unwrap_or_else(PoisonError::into_inner);
        let before = workouts.len();
        workouts.retain(|r| r.id != *id);

        Ok(workouts.len() < before)
    }

    fn authenticate_now(&self, email: &str, password: &str) -> Result<Option<User>, TrackerError> {
        self.check()?;

        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);

        Ok(accounts
            .iter()
            .find(|a| a.user.email == email && a.password == password)
            .map(|a| a.user.clone()))
    }
}

impl super::Db for MemoryDb {
    fn list(&self, user_email: &str) -> BoxFuture<Result<Vec<WorkoutRecord>, TrackerError>> {
        future::ready(self.list_now(user_email)).boxed()
    }

    fn insert(&self, workout: ValidatedWorkout) -> BoxFuture<Result<WorkoutRecord, TrackerError>> {
        future::ready(self.insert_now(workout)).boxed()
    }

    fn delete(&self, id: &Uuid) -> BoxFuture<Result<bool, TrackerError>> {
        future::ready(self.delete_now(id)).boxed()
    }

    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<Result<Option<User>, TrackerError>> {
        future::ready(self.authenticate_now(email, password)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;
    use crate::workout::{Category, Intensity};

    fn squat(user_email: &str) -> ValidatedWorkout {
        ValidatedWorkout {
            user_email: user_email.to_owned(),
            exercise: "Squat".to_owned(),
            category: Category::Strength,
            sets: Some(3),
            reps: Some(5),
            weight: Some(100.0),
            duration: None,
            distance: None,
            intensity: Intensity::Medium,
            occurred_at: None,
        }
    }

    #[tokio::test]
    async fn lists_only_the_owner_newest_first() {
        let db = MemoryDb::new();
        let first = db.insert(squat("ana@example.com")).await.expect("insert");
        let second = db.insert(squat("ana@example.com")).await.expect("insert");
        db.insert(squat("bo@example.com")).await.expect("insert");

        let records = db.list("ana@example.com").await.expect("list");

        assert_eq!(
            records.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert_eq!(second.occurred_at, second.created_at);
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_went() {
        let db = MemoryDb::new();
        let record = db.insert(squat("ana@example.com")).await.expect("insert");

        assert!(db.delete(&record.id).await.expect("delete"));
        assert!(!db.delete(&record.id).await.expect("delete again"));
        assert!(db.records().is_empty());
    }

    #[tokio::test]
    async fn failing_mode_fails_everything() {
        let db = MemoryDb::new().with_user("ana@example.com", "secret", None);
        db.set_failing(true);

        assert!(db.list("ana@example.com").await.is_err());
        assert!(db.insert(squat("ana@example.com")).await.is_err());
        assert!(db.authenticate("ana@example.com", "secret").await.is_err());

        db.set_failing(false);
        let user = db
            .authenticate("ana@example.com", "secret")
            .await
            .expect("authenticate")
            .expect("known user");
        assert_eq!(user.name, "ana@example.com");
        assert_eq!(db.authenticate("ana@example.com", "nope").await.expect("authenticate"), None);
    }
}
