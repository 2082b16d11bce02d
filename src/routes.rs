use std::sync::Arc;

use log::{error, Logger};
use serde::Serialize;
use warp::http::header::{self, HeaderMap, HeaderValue};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};

use crate::errors::TrackerError;

pub mod admin;
mod handlers;
mod query;
mod rejection;
mod response;

pub use internal::*;

/// The largest request body to accept. Workout bodies are tiny.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Request failed"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    let (status, message) = if let Some(e) = rej.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if let Some(e) = rej.find::<reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if let Some(e) = rej.find::<reject::PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
    } else if let Some(e) = rej.find::<reject::UnsupportedMediaType>() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string())
    } else if let Some(e) = rej.find::<reject::LengthRequired>() {
        (StatusCode::LENGTH_REQUIRED, e.to_string())
    } else if let Some(e) = rej.find::<reject::MethodNotAllowed>() {
        (StatusCode::METHOD_NOT_ALLOWED, e.to_string())
    } else if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_owned())
    } else {
        return Err(rej);
    };

    error!(logger, "Request refused"; "status" => %status, "message" => &message);

    Ok(with_status(json(&ErrorBody { error: message }), status))
}

fn status_code_for(e: &TrackerError) -> StatusCode {
    use TrackerError::*;

    match e {
        MissingField(..) | MissingParameter(..) | InvalidField { .. } => StatusCode::BAD_REQUEST,
        InvalidCredentials => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Headers added to every API response.
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );

    headers
}

mod internal {
    use warp::body::{content_length_limit as limit, json as body};
    use warp::filters::BoxedFilter;
    use warp::http::{Method, StatusCode};
    use warp::path::end;
    use warp::reject;
    use warp::Filter;
    use warp::Reply;
    use warp::{delete, get as g, method, path as p, post, query};

    use super::{cors_headers, format_rejection, handlers, query as q, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;
    use crate::user::Credentials;
    use crate::workout::NewWorkout;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let r = environment.urls.api_path.clone();

            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p(r));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_list_route => list, rt; p("workouts"), end(), g(), query::<q::UserQuery>());
    route!(make_create_route => create, rt; p("workouts"), end(), post(), limit(MAX_CONTENT_LENGTH), body::<NewWorkout>());
    route!(make_delete_route => delete, rt; p("workouts"), end(), delete(), limit(MAX_CONTENT_LENGTH), body::<q::DeleteRequest>());
    route!(make_summary_route => summary, rt; p("workouts"), p("summary"), end(), g(), query::<q::UserQuery>());
    route!(make_records_route => records, rt; p("records"), end(), g(), query::<q::RecordsQuery>());
    route!(make_exercises_route => exercises, rt; p("exercises"), end(), g(), query::<q::CatalogQuery>());
    route!(make_login_route => login, rt; p("login"), end(), post(), limit(MAX_CONTENT_LENGTH), body::<Credentials>());

    /// Answers every preflight request, whatever the path. Other methods
    /// fall through as not found, so unknown paths still answer 404.
    pub fn make_preflight_route() -> Route {
        method()
            .and_then(|method: Method| async move {
                if method == Method::OPTIONS {
                    Ok(())
                } else {
                    Err(reject::not_found())
                }
            })
            .untuple_one()
            .map(|| Box::new(StatusCode::OK) as Box<dyn Reply>)
            .boxed()
    }

    /// The whole public API: every route, error formatting and CORS.
    pub fn make_api(
        environment: Environment,
    ) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
        let logger = environment.logger.clone();

        make_preflight_route()
            .or(make_list_route(environment.clone()))
            .or(make_summary_route(environment.clone()))
            .or(make_create_route(environment.clone()))
            .or(make_delete_route(environment.clone()))
            .or(make_records_route(environment.clone()))
            .or(make_exercises_route(environment.clone()))
            .or(make_login_route(environment))
            .recover(move |r| format_rejection(logger.clone(), r))
            .with(warp::reply::with::headers(cors_headers()))
    }
}
