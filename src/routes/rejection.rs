use serde::Serialize;
use uuid::Uuid;
use warp::reject;

use crate::errors::TrackerError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: TrackerError,
}

impl Rejection {
    pub fn new(context: Context, error: TrackerError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            error: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) error: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Create {
        #[serde(skip_serializing_if = "Option::is_none")]
        user: Option<String>,
    },
    Delete {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Uuid>,
    },
    Exercises {
        #[serde(skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
    List {
        #[serde(skip_serializing_if = "Option::is_none")]
        user: Option<String>,
    },
    Login {
        #[serde(skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
    Records {
        #[serde(skip_serializing_if = "Option::is_none")]
        user: Option<String>,
    },
    Summary {
        #[serde(skip_serializing_if = "Option::is_none")]
        user: Option<String>,
    },
}

impl Context {
    pub fn create(user: Option<String>) -> Context {
        Context::Create { user }
    }

    pub fn delete(id: Option<Uuid>) -> Context {
        Context::Delete { id }
    }

    pub fn exercises(category: Option<String>) -> Context {
        Context::Exercises { category }
    }

    pub fn list(user: Option<String>) -> Context {
        Context::List { user }
    }

    pub fn login(email: Option<String>) -> Context {
        Context::Login { email }
    }

    pub fn records(user: Option<String>) -> Context {
        Context::Records { user }
    }

    pub fn summary(user: Option<String>) -> Context {
        Context::Summary { user }
    }
}
