use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::domain::errors::{DomainError, FieldErrors, VALIDATION_FAILED_MESSAGE};

pub type ApiResult<T> = Result<T, ApiProblem>;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "The requested URL was not found on the server.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "The method is not allowed for the requested URL.";

/// Error response: always `{"message": ...}`, plus `errors` for validation
/// failures.
#[derive(Debug)]
pub struct ApiProblem {
    status: StatusCode,
    message: String,
    errors: Option<FieldErrors>,
}

impl ApiProblem {
    pub fn from_domain(error: DomainError) -> Self {
        match error {
            DomainError::Validation(errors) => Self {
                status: StatusCode::BAD_REQUEST,
                message: VALIDATION_FAILED_MESSAGE.to_string(),
                errors: Some(errors),
            },
            err @ DomainError::Conflict(_) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            err @ DomainError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            DomainError::Storage(detail) => {
                error!(error = %detail, "request failed");
                Self::internal()
            }
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, ROUTE_NOT_FOUND_MESSAGE)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }
}

impl From<DomainError> for ApiProblem {
    fn from(error: DomainError) -> Self {
        Self::from_domain(error)
    }
}

/// Body could not be buffered (too large, aborted stream). Keeps axum's status
/// and text but in the JSON error shape.
impl From<BytesRejection> for ApiProblem {
    fn from(rejection: BytesRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ProblemBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        let body = ProblemBody {
            message: self.message,
            errors: self.errors,
        };

        (self.status, Json(body)).into_response()
    }
}
