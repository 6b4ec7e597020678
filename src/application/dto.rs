use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{
    errors::{DomainError, FieldErrors},
    user::{NewUser, User, UserChanges},
};

/// Body of `POST /users` and `PUT /users/{id}`.
///
/// Parsed from raw bytes rather than through a typed extractor so that every
/// malformed body is reported as a validation failure with per-field reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPayload {
    pub username: String,
    pub email: String,
}

impl UserPayload {
    pub fn from_json(body: &[u8]) -> Result<Self, DomainError> {
        let value = serde_json::from_slice::<Value>(body)
            .map_err(|err| DomainError::invalid_field("payload", err.to_string()))?;

        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(DomainError::invalid_field(
                    "payload",
                    format!("{other} is not of type 'object'"),
                ));
            }
        };

        let mut errors = FieldErrors::new();
        let username = required_string(&object, "username", &mut errors);
        let email = required_string(&object, "email", &mut errors);

        match (username, email) {
            (Some(username), Some(email)) => Ok(Self { username, email }),
            _ => Err(DomainError::validation(errors)),
        }
    }

    pub fn into_new_user(self) -> NewUser {
        NewUser {
            username: self.username,
            email: self.email,
        }
    }

    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            username: self.username,
            email: self.email,
        }
    }
}

fn required_string(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match object.get(field) {
        Some(Value::String(value)) => Some(value.clone()),
        None | Some(Value::Null) => {
            errors.insert(
                field.to_string(),
                format!("'{field}' is a required property"),
            );
            None
        }
        Some(other) => {
            errors.insert(field.to_string(), format!("{other} is not of type 'string'"));
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub active: bool,
    pub created_date: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
            active: value.active,
            created_date: value.created_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl PingResponse {
    pub fn pong() -> Self {
        Self {
            status: "success",
            message: "pong!",
        }
    }
}
