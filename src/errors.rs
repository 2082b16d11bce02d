use thiserror::Error;
use warp::reject;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// Represents a request body without a required field.
    #[error("missing required field {0}")]
    MissingField(&'static str),

    /// Represents a query string without a required parameter.
    #[error("missing required parameter {0}")]
    MissingParameter(&'static str),

    /// Represents a field whose value breaks an invariant.
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Represents a failed login.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Represents a base URL or path that could not be parsed.
    #[error("invalid URL")]
    InvalidUrl { source: url::ParseError },

    /// Represents a transport failure while talking to the gateway.
    #[error("HTTP request failed")]
    Http { source: reqwest::Error },

    /// Represents a non-success answer from the gateway.
    #[error("gateway responded with {status}: {message}")]
    Gateway { status: u16, message: String },

    /// Represents a failure to read or write session storage.
    #[error("could not access session storage")]
    Storage { source: std::io::Error },

    /// Represents session storage that does not contain valid JSON.
    #[error("could not parse session storage")]
    MalformedSession { source: serde_json::Error },

    /// Represents a command that needs a logged-in user.
    #[error("not logged in")]
    NotLoggedIn,

    /// Represents an attempt to change the rest preset mid-countdown.
    #[error("cannot change the preset while the timer is running")]
    TimerRunning,

    /// Represents a completion notification that could not be delivered.
    #[error("could not deliver notification: {0}")]
    Notification(String),
}

impl TrackerError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TrackerError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for TrackerError {
    fn from(source: sqlx::Error) -> Self {
        TrackerError::Sqlx { source }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(source: reqwest::Error) -> Self {
        TrackerError::Http { source }
    }
}

impl reject::Reject for TrackerError {}
