use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::normalization;

/// The public view of an account. The password never leaves the store.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,

    pub email: String,

    /// Display name; falls back to the email.
    pub name: String,
}

impl User {
    pub fn new(id: Uuid, email: String, name: Option<String>) -> Self {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());

        User { id, email, name }
    }
}

/// The body of a login request.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default, deserialize_with = "normalization::deserialize_email")]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }
}
