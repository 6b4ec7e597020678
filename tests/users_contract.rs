mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{TestApp, message};
use serde_json::{Value, json};
use users_api::{SqliteUserRepository, UserRepository};

async fn run_users_contract(app: TestApp) {
    let mut ids = Vec::new();
    for (username, email) in [
        ("leila", "leila@eskrima.com"),
        ("kristian", "kristian@arnis.com"),
        ("randy", "randy@arnis.com"),
    ] {
        let (status, body) = app
            .send_json(
                Method::POST,
                "/users",
                json!({"username": username, "email": email}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(message(&body), format!("{email} was added!"));

        let (_, listed) = app.send_empty(Method::GET, "/users").await;
        let id = listed
            .as_array()
            .and_then(|users| users.last())
            .and_then(|user| user["id"].as_i64())
            .expect("created user should be listed last");
        ids.push(id);
    }
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));

    let (status, listed) = app.send_empty(Method::GET, "/users").await;
    assert_eq!(status, StatusCode::OK);
    let emails = listed
        .as_array()
        .expect("list should be an array")
        .iter()
        .map(|user| user["email"].as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        emails,
        ["leila@eskrima.com", "kristian@arnis.com", "randy@arnis.com"]
    );

    let (status, body) = app
        .send_json(
            Method::POST,
            "/users",
            json!({"username": "leila again", "email": "leila@eskrima.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Sorry. That email already exists.");

    let (status, body) = app
        .send_json(
            Method::PUT,
            &format!("/users/{}", ids[1]),
            json!({"username": "kristian", "email": "randy@arnis.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Sorry. That email already exists.");

    let (status, body) = app
        .send_empty(Method::DELETE, &format!("/users/{}", ids[0]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "leila@eskrima.com was removed!");

    let (status, body) = app
        .send_empty(Method::GET, &format!("/users/{}", ids[0]))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), format!("User {} does not exist", ids[0]));

    // The freed email can be claimed again and gets a fresh id.
    let (status, _) = app
        .send_json(
            Method::POST,
            "/users",
            json!({"username": "leila", "email": "leila@eskrima.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, listed) = app.send_empty(Method::GET, "/users").await;
    let users = listed.as_array().expect("list should be an array");
    assert_eq!(users.len(), 3);
    assert!(users.iter().all(|user| user["id"] != Value::from(ids[0])));
    assert_eq!(users[2]["email"], "leila@eskrima.com");
    assert!(users[2]["id"].as_i64().unwrap_or_default() > ids[2]);
}

#[tokio::test]
async fn in_memory_backend_satisfies_contract() {
    run_users_contract(TestApp::in_memory()).await;
}

#[tokio::test]
async fn sqlite_backend_satisfies_contract() {
    run_users_contract(TestApp::sqlite().await).await;
}

#[tokio::test]
async fn sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("users.db").display());

    let created_id = {
        let repository = SqliteUserRepository::connect(&url, 2)
            .await
            .expect("file database should open");
        repository.init().await.expect("schema should be created");
        let app = TestApp::with_repository(Arc::new(repository.clone()));

        let (status, _) = app
            .send_json(
                Method::POST,
                "/users",
                json!({"username": "alex", "email": "alex@kali.com"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let id = app
            .repository
            .find_by_email("alex@kali.com")
            .await
            .expect("lookup should succeed")
            .expect("user should be stored")
            .id;
        repository.pool().close().await;
        id
    };

    let reopened = SqliteUserRepository::connect(&url, 2)
        .await
        .expect("file database should reopen");
    reopened.init().await.expect("init on existing schema");
    let app = TestApp::with_repository(Arc::new(reopened));

    let (status, body) = app
        .send_empty(Method::GET, &format!("/users/{created_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alex");
    assert_eq!(body["email"], "alex@kali.com");
}
