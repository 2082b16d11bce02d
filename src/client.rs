//! Talking to the gateway from the user's side.
//!
//! [`HttpGateway`] is a thin typed wrapper over the HTTP endpoints.
//! [`WorkoutLog`] keeps the signed-in user's history in memory: new
//! entries show up immediately and are rolled back if the gateway
//! refuses them.

use futures::future::{BoxFuture, FutureExt};
use log::{debug, o, Logger};
use reqwest::StatusCode;
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::analytics::{self, Summary};
use crate::errors::TrackerError;
use crate::records::{self, PersonalRecords};
use crate::urls::Urls;
use crate::user::{Credentials, User};
use crate::workout::{NewWorkout, WorkoutDraft, WorkoutRecord};

pub trait Gateway {
    /// The user's records, most recently created first.
    fn list(&self, user_email: &str) -> BoxFuture<Result<Vec<WorkoutRecord>, TrackerError>>;

    /// Stores a record, returning the ID it was given.
    fn create(&self, workout: &NewWorkout) -> BoxFuture<Result<Uuid, TrackerError>>;

    fn delete(&self, id: &Uuid) -> BoxFuture<Result<(), TrackerError>>;

    fn login(&self, email: &str, password: &str) -> BoxFuture<Result<User, TrackerError>>;
}

#[derive(Deserialize)]
struct Created {
    id: Uuid,
}

#[derive(Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,

    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    urls: Urls,
}

impl HttpGateway {
    pub fn new(urls: Urls) -> Self {
        HttpGateway {
            client: reqwest::Client::new(),
            urls,
        }
    }

    pub fn urls(&self) -> &Urls {
        &self.urls
    }
}

/// Turns a non-success response into [`TrackerError::Gateway`],
/// carrying whatever message the body had.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, TrackerError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body: ErrorBody = response.json().await.unwrap_or_default();
    let message = body
        .error
        .or(body.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_owned());

    Err(TrackerError::Gateway {
        status: status.as_u16(),
        message,
    })
}

impl Gateway for HttpGateway {
    fn list(&self, user_email: &str) -> BoxFuture<Result<Vec<WorkoutRecord>, TrackerError>> {
        let url = self.urls.workouts_for(user_email);

        async move {
            let response = self.client.get(url?).send().await?;
            let records = check(response).await?.json().await?;

            Ok(records)
        }
        .boxed()
    }

    fn create(&self, workout: &NewWorkout) -> BoxFuture<Result<Uuid, TrackerError>> {
        let url = self.urls.workouts();
        let workout = workout.clone();

        async move {
            let response = self.client.post(url?).json(&workout).send().await?;
            let Created { id } = check(response).await?.json().await?;

            Ok(id)
        }
        .boxed()
    }

    fn delete(&self, id: &Uuid) -> BoxFuture<Result<(), TrackerError>> {
        let url = self.urls.workouts();
        let body = serde_json::json!({ "id": id });

        async move {
            let response = self.client.delete(url?).json(&body).send().await?;
            check(response).await?;

            Ok(())
        }
        .boxed()
    }

    fn login(&self, email: &str, password: &str) -> BoxFuture<Result<User, TrackerError>> {
        let url = self.urls.login();
        let credentials = Credentials::new(email, password);

        async move {
            let response = self.client.post(url?).json(&credentials).send().await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(TrackerError::InvalidCredentials);
            }

            let user = check(response).await?.json().await?;

            Ok(user)
        }
        .boxed()
    }
}

/// The signed-in user's history, kept most recent first.
pub struct WorkoutLog<G: Gateway> {
    gateway: G,
    user_email: String,
    records: Vec<WorkoutRecord>,
    logger: Logger,
}

impl<G: Gateway> WorkoutLog<G> {
    pub fn new(gateway: G, user_email: impl Into<String>, logger: &Logger) -> Self {
        let user_email = user_email.into();

        WorkoutLog {
            logger: logger.new(o!("user" => user_email.clone())),
            gateway,
            user_email,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[WorkoutRecord] {
        &self.records
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Replaces the local list with the gateway's.
    pub async fn refresh(&mut self) -> Result<(), TrackerError> {
        self.records = self.gateway.list(&self.user_email).await?;
        debug!(self.logger, "Refreshed workouts"; "count" => self.records.len());

        Ok(())
    }

    pub async fn submit(&mut self, draft: &WorkoutDraft) -> Result<WorkoutRecord, TrackerError> {
        self.submit_at(draft, OffsetDateTime::now_utc()).await
    }

    /// Validates `draft`, shows it at the top of the list right away,
    /// then writes it through. On failure the list is put back exactly
    /// as it was and the error is returned.
    pub async fn submit_at(
        &mut self,
        draft: &WorkoutDraft,
        occurred_at: OffsetDateTime,
    ) -> Result<WorkoutRecord, TrackerError> {
        let request = draft.to_new_workout(&self.user_email, occurred_at)?;
        let placeholder = request
            .clone()
            .validate()?
            .into_record(Uuid::new_v4(), OffsetDateTime::now_utc());

        let snapshot = self.records.clone();
        self.records.insert(0, placeholder);

        match self.gateway.create(&request).await {
            Ok(id) => {
                let record = &mut self.records[0];
                record.id = id;
                debug!(self.logger, "Saved workout"; "id" => %id);

                Ok(record.clone())
            }
            Err(e) => {
                debug!(self.logger, "Rolling back workout"; "error" => %e);
                self.records = snapshot;

                Err(e)
            }
        }
    }

    /// Drops the record locally and remotely. Unknown IDs are fine; a
    /// gateway failure puts the record back.
    pub async fn remove(&mut self, id: &Uuid) -> Result<(), TrackerError> {
        let snapshot = self.records.clone();
        self.records.retain(|r| r.id != *id);

        if let Err(e) = self.gateway.delete(id).await {
            debug!(self.logger, "Rolling back deletion"; "id" => %id, "error" => %e);
            self.records = snapshot;

            return Err(e);
        }

        Ok(())
    }

    pub fn summary(&self, as_of: OffsetDateTime, window_days: usize) -> Summary {
        analytics::summarize(&self.records, as_of, window_days)
    }

    pub fn personal_records(&self) -> PersonalRecords {
        records::track_chronological(&self.records)
    }
}
