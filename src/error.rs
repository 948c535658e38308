use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::models::job_seeker::Status;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Body or query string that could not be decoded, with the status axum
    /// chose for it (400, 415 or 422).
    #[error("Rejected request: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition { from: Status, to: Status },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wraps any failure raised inside a unit of work. The whole write was
    /// rolled back, so the caller only learns that storage failed.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Error::Storage(err.to_string())
    }

    /// True when the caller can fix the request (4xx), false when the system
    /// failed to process a valid one (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::BadRequest(_)
                | Error::Rejected { .. }
                | Error::NotFound(_)
                | Error::IllegalTransition { .. }
                | Error::Validation(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::Rejected { status, message } => (status, json!({ "error": message })),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Error::IllegalTransition { from, to } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "illegal_status_transition",
                    "from": from,
                    "to": to,
                }),
            ),
            Error::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "validation_error", "issues": err }),
            ),
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<crate::models::job_seeker::UnknownStatus> for Error {
    fn from(err: crate::models::job_seeker::UnknownStatus) -> Self {
        Error::Internal(err.to_string())
    }
}
