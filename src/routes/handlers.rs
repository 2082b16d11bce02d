use std::time::{Duration, Instant};

use log::{debug, o};
use time::OffsetDateTime;
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::environment::Environment;
use crate::errors::TrackerError;
use crate::routes::{
    query::{CatalogQuery, DeleteRequest, RecordsQuery, UserQuery},
    rejection::{Context, Rejection},
    response::{FailureMessage, SuccessResponse},
};
use crate::user::Credentials;
use crate::workout::{Category, NewWorkout};
use crate::{analytics, catalog, records};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($body:block) => {{
        let start = Instant::now();

        let result = $body;

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

pub async fn list(environment: Environment, query: UserQuery) -> RouteResult {
    timed!({
        let user = query.user_email();
        let error_handler = |e: TrackerError| Rejection::new(Context::list(user.clone()), e);

        let user_email = user
            .clone()
            .ok_or(TrackerError::MissingParameter("user"))
            .map_err(error_handler)?;
        debug!(environment.logger, "Listing workouts..."; "user" => &user_email);

        let records = environment
            .db
            .list(&user_email)
            .await
            .map_err(error_handler)?;

        json(&records)
    })
}

pub async fn create(environment: Environment, workout: NewWorkout) -> RouteResult {
    timed!({
        let user = workout.user_email.clone();
        let error_handler = |e: TrackerError| Rejection::new(Context::create(user.clone()), e);

        let workout = workout.validate().map_err(error_handler)?;
        let logger = environment
            .logger
            .new(o!("user" => workout.user_email.clone()));

        debug!(logger, "Saving workout..."; "exercise" => &workout.exercise, "category" => %workout.category);
        let record = environment
            .db
            .insert(workout)
            .await
            .map_err(error_handler)?;
        debug!(logger, "Saved workout"; "id" => %record.id);

        let location = environment
            .urls
            .workouts_for(&record.user_email)
            .map_err(error_handler)?;

        let response = SuccessResponse::Created {
            success: true,
            id: record.id,
        };

        with_header(
            with_status(json(&response), StatusCode::CREATED),
            "location",
            location.as_str(),
        )
    })
}

pub async fn delete(environment: Environment, request: DeleteRequest) -> RouteResult {
    timed!({
        let error_handler = |e: TrackerError| Rejection::new(Context::delete(request.id), e);

        let id = request
            .id
            .ok_or(TrackerError::MissingField("id"))
            .map_err(error_handler)?;

        // deleting an unknown ID is not an error
        let removed = environment.db.delete(&id).await.map_err(error_handler)?;
        debug!(environment.logger, "Deleted workout"; "id" => %id, "removed" => removed);

        json(&SuccessResponse::Deleted { success: true })
    })
}

pub async fn login(environment: Environment, credentials: Credentials) -> RouteResult {
    timed!({
        let error_handler =
            |e: TrackerError| Rejection::new(Context::login(credentials.email.clone()), e);

        let email = credentials
            .email
            .clone()
            .ok_or(TrackerError::MissingField("email"))
            .map_err(error_handler)?;
        let password = credentials
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(TrackerError::MissingField("password"))
            .map_err(error_handler)?;

        let user = environment
            .db
            .authenticate(&email, &password)
            .await
            .map_err(error_handler)?;

        match user {
            Some(user) => {
                debug!(environment.logger, "Logged in"; "user" => &user.email);
                with_status(json(&user), StatusCode::OK)
            }
            None => {
                debug!(environment.logger, "Refused login"; "user" => &email);
                let message = format!("{}", TrackerError::InvalidCredentials);
                with_status(
                    json(&FailureMessage { message: &message }),
                    StatusCode::UNAUTHORIZED,
                )
            }
        }
    })
}

pub async fn summary(environment: Environment, query: UserQuery) -> RouteResult {
    timed!({
        let user = query.user_email();
        let error_handler = |e: TrackerError| Rejection::new(Context::summary(user.clone()), e);

        let user_email = user
            .clone()
            .ok_or(TrackerError::MissingParameter("user"))
            .map_err(error_handler)?;

        let records = environment
            .db
            .list(&user_email)
            .await
            .map_err(error_handler)?;
        debug!(environment.logger, "Summarizing workouts..."; "user" => &user_email, "count" => records.len());

        let summary = analytics::summarize(
            &records,
            OffsetDateTime::now_utc(),
            environment.config.volume_window_days,
        );

        json(&summary)
    })
}

pub async fn records(environment: Environment, query: RecordsQuery) -> RouteResult {
    timed!({
        let user = query.user_email();
        let error_handler = |e: TrackerError| Rejection::new(Context::records(user.clone()), e);

        let user_email = user
            .clone()
            .ok_or(TrackerError::MissingParameter("user"))
            .map_err(error_handler)?;
        let limit = query.limit.unwrap_or(environment.config.pr_display_limit);

        let history = environment
            .db
            .list(&user_email)
            .await
            .map_err(error_handler)?;
        debug!(environment.logger, "Tracking personal records..."; "user" => &user_email, "count" => history.len());

        let personal_records = records::track_chronological(&history).truncate_events(limit);

        json(&personal_records)
    })
}

pub async fn exercises(_environment: Environment, query: CatalogQuery) -> RouteResult {
    timed!({
        let error_handler =
            |e: TrackerError| Rejection::new(Context::exercises(query.category.clone()), e);

        match &query.category {
            None => json(&catalog::all()),
            Some(category) => {
                let category: Category = category.parse().map_err(error_handler)?;

                json(catalog::category(category))
            }
        }
    })
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
