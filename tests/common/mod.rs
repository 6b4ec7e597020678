#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use users_api::{
    AppState, InMemoryUserRepository, SqliteUserRepository, UserRepository, UserService,
    build_router,
    domain::user::{NewUser, User},
};

/// Router plus direct access to the table behind it, for fixtures.
pub struct TestApp {
    pub router: Router,
    pub repository: Arc<dyn UserRepository>,
}

impl TestApp {
    pub fn with_repository(repository: Arc<dyn UserRepository>) -> Self {
        let service = Arc::new(UserService::new(repository.clone()));
        Self {
            router: build_router(AppState::new(service)),
            repository,
        }
    }

    pub fn in_memory() -> Self {
        Self::with_repository(Arc::new(InMemoryUserRepository::new()))
    }

    pub async fn sqlite() -> Self {
        let repository = SqliteUserRepository::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory sqlite should open");
        repository.init().await.expect("schema should be created");
        Self::with_repository(Arc::new(repository))
    }

    /// Inserts a row without going through HTTP.
    pub async fn add_user(&self, username: &str, email: &str) -> User {
        self.repository
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
            })
            .await
            .expect("fixture user should be created")
    }

    pub async fn send_json(&self, method: Method, uri: &str, payload: Value) -> (StatusCode, Value) {
        self.send_raw(method, uri, Some("application/json"), payload.to_string())
            .await
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let request = builder.body(body.into()).expect("request should build");

        self.dispatch(request).await
    }

    pub async fn send_empty(&self, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request should build");

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("response expected");
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("response body should be readable")
            .to_bytes();

        if body.is_empty() {
            return (status, Value::Null);
        }

        let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
        (status, json)
    }
}

pub fn message(body: &Value) -> &str {
    body.get("message")
        .and_then(Value::as_str)
        .expect("body should carry a message")
}
