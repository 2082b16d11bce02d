use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Created {
        success: bool,
        id: Uuid,
    },
    Deleted {
        success: bool,
    },
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
}

/// The body of a refused login.
#[derive(Debug, Serialize)]
pub struct FailureMessage<'a> {
    pub message: &'a str,
}
