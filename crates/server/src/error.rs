//! Unified error handling with Sentry integration.
//!
//! Every failure leaves the API as the JSON envelope
//! `{ success: false, message, errors?, error? }`. Store failures are logged
//! and captured to Sentry before the response is built; the client sees a
//! generic per-operation message and, outside production, the error text.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::{ContactError, FieldError};

/// The contact operation a handler was performing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactAction {
    List,
    Get,
    Create,
    Update,
    Delete,
    Stats,
}

impl ContactAction {
    /// Message for a 500 during this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::List => "Error fetching contacts",
            Self::Get => "Error fetching contact",
            Self::Create => "Error creating contact",
            Self::Update => "Error updating contact",
            Self::Delete => "Error deleting contact",
            Self::Stats => "Error fetching contact statistics",
        }
    }

    /// Message for an email collision during this operation.
    #[must_use]
    pub const fn duplicate_message(self) -> &'static str {
        match self {
            Self::Update => "Another contact with this email already exists",
            _ => "Contact with this email already exists",
        }
    }
}

/// Message for any missing contact.
pub const NOT_FOUND_MESSAGE: &str = "Contact not found";

/// Application-level error type for the contacts API.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more request fields failed validation.
    #[error("Validation error")]
    Validation(Vec<FieldError>),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error. `detail` is only sent when the environment
    /// allows it.
    #[error("{message}")]
    Internal {
        message: &'static str,
        detail: Option<String>,
    },
}

impl AppError {
    /// Translate a service failure into its HTTP form.
    ///
    /// Store failures are logged and reported to Sentry here, since this is
    /// the last point where the underlying error is still available.
    #[must_use]
    pub fn from_contact(err: ContactError, action: ContactAction, expose_detail: bool) -> Self {
        match err {
            ContactError::Validation(errors) => Self::Validation(errors),
            ContactError::DuplicateEmail => Self::BadRequest(action.duplicate_message().to_owned()),
            ContactError::NotFound => Self::NotFound(NOT_FOUND_MESSAGE.to_owned()),
            ContactError::Store(store_err) => {
                let event_id = sentry::capture_error(&store_err);
                tracing::error!(
                    error = %store_err,
                    action = ?action,
                    sentry_event_id = %event_id,
                    "Request error"
                );
                Self::Internal {
                    message: action.failure_message(),
                    detail: expose_detail.then(|| store_err.to_string()),
                }
            }
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure envelope.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => ErrorBody {
                success: false,
                message: "Validation error".to_owned(),
                errors: Some(errors),
                error: None,
            },
            Self::BadRequest(message) | Self::NotFound(message) => ErrorBody {
                success: false,
                message,
                errors: None,
                error: None,
            },
            Self::Internal { message, detail } => ErrorBody {
                success: false,
                message: message.to_owned(),
                errors: None,
                error: detail,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
