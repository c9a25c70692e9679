//! Error taxonomy of the HTTP surface and its mapping onto the response
//! envelope.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use rentaldesk_auth::CredentialError;
use rentaldesk_core::DomainError;

use crate::app::dto::Envelope;
use crate::gate::GateRejection;

/// Any failure a handler can return. Rendered as
/// `{"success": false, "message": ..., "code": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", "endpoint not found")
    }

    pub fn user_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "user not found")
    }

    /// Detail goes to the log only; the client sees a generic message.
    pub fn internal(detail: impl core::fmt::Display) -> Self {
        tracing::error!(error = %detail, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()>::failure(self.message, self.code);
        (self.status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::bad_request(msg),
            DomainError::MissingField(name) => Self::new(
                StatusCode::BAD_REQUEST,
                "MISSING_FIELD",
                format!("field {name} is required"),
            ),
            DomainError::NotFound => Self::new(StatusCode::NOT_FOUND, "PROPERTY_NOT_FOUND", "property not found"),
            DomainError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", "invalid access token"),
            DomainError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, "PERMISSION_DENIED", msg),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        let (status, code) = match err {
            CredentialError::MissingCredentials => (StatusCode::BAD_REQUEST, "MISSING_CREDENTIALS"),
            CredentialError::MissingFields => (StatusCode::BAD_REQUEST, "MISSING_FIELDS"),
            CredentialError::EmailExists => (StatusCode::CONFLICT, "EMAIL_EXISTS"),
            CredentialError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            CredentialError::UserNotFound => return Self::user_not_found(),
            CredentialError::InvalidCurrentPassword => (StatusCode::BAD_REQUEST, "INVALID_CURRENT_PASSWORD"),
            CredentialError::BlankField(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            CredentialError::Hashing(_) => return Self::internal(err),
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<GateRejection> for ApiError {
    fn from(rejection: GateRejection) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, rejection.code(), rejection.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "request body rejected");
        Self::new(StatusCode::BAD_REQUEST, "INVALID_JSON", "request body must be valid JSON")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
