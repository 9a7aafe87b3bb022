use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::models::{EventField, EventStatus};
use crate::utils::response::error as error_response;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const ILLEGAL_TRANSITION: &str = "ILLEGAL_TRANSITION";
pub const CONFLICT: &str = "CONFLICT";
pub const STORE_ERROR: &str = "STORE_ERROR";
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

/// Failures of the event core. Each kind calls for a different recovery,
/// so they are never folded into one another.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Validation error: {field} {reason}")]
    Validation { field: EventField, reason: String },

    #[error("Event not found: {0}")]
    NotFound(Uuid),

    #[error(
        "Illegal status transition: {} -> {to}",
        .from.map_or_else(|| "MISSING".to_string(), |s| s.to_string())
    )]
    IllegalTransition {
        from: Option<EventStatus>,
        to: EventStatus,
    },

    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    #[error("No edit in progress")]
    NotEditing,
}

impl EventError {
    pub fn validation(field: EventField, reason: impl Into<String>) -> Self {
        EventError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValidationDetails {
    field: String,
    reason: String,
}

#[derive(Debug, Deserialize)]
struct TransitionDetails {
    from: Option<EventStatus>,
    to: EventStatus,
}

/// Backend rejections that name a core rule come back as that rule's
/// error; everything else stays a store error.
impl From<StoreError> for EventError {
    fn from(err: StoreError) -> Self {
        if let StoreError::Rejected {
            code,
            details: Some(details),
            ..
        } = &err
        {
            match code.as_str() {
                VALIDATION_ERROR => {
                    if let Ok(parsed) = serde_json::from_value::<ValidationDetails>(details.clone()) {
                        if let Ok(field) = parsed.field.parse::<EventField>() {
                            return EventError::Validation {
                                field,
                                reason: parsed.reason,
                            };
                        }
                    }
                }
                ILLEGAL_TRANSITION => {
                    if let Ok(parsed) = serde_json::from_value::<TransitionDetails>(details.clone()) {
                        return EventError::IllegalTransition {
                            from: parsed.from,
                            to: parsed.to,
                        };
                    }
                }
                _ => {}
            }
        }
        EventError::Store(err)
    }
}

/// Backend or mirror failures. Possibly transient.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected backend response {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Backend rejected request ({code}): {message}")]
    Rejected {
        code: String,
        message: String,
        details: Option<Value>,
    },

    #[error("Event {0} already exists")]
    Conflict(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {field} {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    IllegalTransition(EventError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error")]
    StoreError(StoreError),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::IllegalTransition(_) => StatusCode::CONFLICT,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError { .. } => VALIDATION_ERROR,
            AppError::NotFound(_) => NOT_FOUND,
            AppError::IllegalTransition(_) => ILLEGAL_TRANSITION,
            AppError::Conflict(_) => CONFLICT,
            AppError::StoreError(_) => STORE_ERROR,
            AppError::InternalServerError(_) => INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError { .. }
            | AppError::NotFound(_)
            | AppError::IllegalTransition(_)
            | AppError::Conflict(_) => {
                warn!(code = self.code(), message = %self, "Request rejected");
            }
            AppError::InternalServerError(message) => {
                error!(error = ?self, message = %message, "Application error");
            }
            AppError::StoreError(e) => {
                error!(error = ?e, "Store error");
            }
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::ValidationError { field, reason } => {
                Some(json!({ "field": field, "reason": reason }))
            }
            AppError::IllegalTransition(EventError::IllegalTransition { from, to }) => {
                Some(json!({ "from": from, "to": to }))
            }
            _ => None,
        }
    }
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Validation { field, reason } => AppError::ValidationError {
                field: field.to_string(),
                reason,
            },
            EventError::NotFound(id) => {
                AppError::NotFound(format!("Event with id '{}' was not found", id))
            }
            err @ EventError::IllegalTransition { .. } => AppError::IllegalTransition(err),
            EventError::Store(e) => e.into(),
            err @ EventError::NotEditing => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(id) => {
                AppError::Conflict(format!("Event with id '{}' already exists", id))
            }
            other => AppError::StoreError(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Store failures may carry backend internals
        let public_message = match &self {
            AppError::ValidationError { field, reason } => format!("{} {}", field, reason),
            AppError::NotFound(message)
            | AppError::Conflict(message)
            | AppError::InternalServerError(message) => message.clone(),
            AppError::IllegalTransition(err) => err.to_string(),
            AppError::StoreError(_) => "A store error occurred".to_string(),
        };

        error_response(code, public_message, self.details(), status)
    }
}
