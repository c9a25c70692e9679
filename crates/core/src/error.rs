//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// ownership, existence). Transport concerns belong to the API crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. a non-numeric rent).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A required field was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A requested resource was not found.
    #[error("not found")]
    NotFound,

    /// The operation needs an authenticated caller and none was supplied.
    #[error("unauthorized")]
    Unauthorized,

    /// The caller is authenticated but may not touch the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::MissingField(name.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}
