use std::collections::BTreeMap;
use std::fmt::Display;

use thiserror::Error;

pub const VALIDATION_FAILED_MESSAGE: &str = "Input payload validation failed";
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Sorry. That email already exists.";

/// Field name -> human readable reason, sorted for stable responses.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{}", VALIDATION_FAILED_MESSAGE)]
    Validation(FieldErrors),
    #[error("{}", DUPLICATE_EMAIL_MESSAGE)]
    Conflict(String),
    #[error("User {0} does not exist")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }

    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), reason.into());
        Self::Validation(errors)
    }

    pub fn conflict(email: impl Into<String>) -> Self {
        Self::Conflict(email.into())
    }

    pub fn not_found(id: impl Display) -> Self {
        Self::NotFound(id.to_string())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}
