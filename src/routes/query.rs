use serde::Deserialize;
use uuid::Uuid;

use crate::normalization::normalize_email;

/// Picks the first non-blank of `user` and `email`; both names are
/// accepted for the owner.
fn pick_user(user: &Option<String>, email: &Option<String>) -> Option<String> {
    [user, email]
        .iter()
        .filter_map(|v| v.as_deref())
        .map(|v| normalize_email(v))
        .find(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    user: Option<String>,

    #[serde(default)]
    email: Option<String>,
}

impl UserQuery {
    pub fn user_email(&self) -> Option<String> {
        pick_user(&self.user, &self.email)
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    #[serde(default)]
    user: Option<String>,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    pub limit: Option<usize>,
}

impl RecordsQuery {
    pub fn user_email(&self) -> Option<String> {
        pick_user(&self.user, &self.email)
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::UserQuery;

    #[test]
    fn accepts_either_parameter_name() {
        let by_user: UserQuery = serde_json::from_str(r#"{"user": " ana@example.com "}"#).expect("parse");
        let by_email: UserQuery =
            serde_json::from_str(r#"{"user": "", "email": "bo@example.com"}"#).expect("parse");
        let neither: UserQuery = serde_json::from_str("{}").expect("parse");

        assert_eq!(by_user.user_email().as_deref(), Some("ana@example.com"));
        assert_eq!(by_email.user_email().as_deref(), Some("bo@example.com"));
        assert_eq!(neither.user_email(), None);
    }
}
