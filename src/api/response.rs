//! Response envelope and error type shared by the REST handlers.
//!
//! Success bodies are `{ "message", "payload" }`; errors are
//! `{ "message", "details" }` where `details` is a stable machine code.

use crate::{auth::AuthError, store::StoreError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub message: String,
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, payload: T) -> Self {
        Self {
            message: message.into(),
            payload,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    pub details: String,
}

#[derive(Debug, Error)]
#[error("{description} ({details})")]
pub struct ApiError {
    status: StatusCode,
    description: String,
    details: &'static str,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, description: impl Into<String>, details: &'static str) -> Self {
        Self {
            status,
            description: description.into(),
            details,
        }
    }

    pub fn bad_request(description: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, description, "INVALID_INPUT")
    }

    /// Unexpected failure: logged, and its message returned as the description.
    pub fn internal(err: impl Display) -> Self {
        let description = err.to_string();
        error!("{description}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            description,
            "SERVER_ERROR",
        )
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn details(&self) -> &'static str {
        self.details
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.description,
            details: self.details.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => {
                Self::new(StatusCode::CONFLICT, "Record already exists", "CONFLICT")
            }
            StoreError::Backend(err) => Self::internal(format!("datastore error: {err:#}")),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if matches!(err, AuthError::Forbidden) {
            return Self::new(StatusCode::FORBIDDEN, "Forbidden", "FORBIDDEN");
        }
        warn!("authentication failed: {err}");
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", "INVALID_TOKEN")
    }
}
