use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use todo_service::{
    db::MemoryDb,
    routes::create_router,
    state::{AppState, Config, Repositories},
};
use tower::ServiceExt;

fn test_app() -> Router {
    let config = Config {
        database_url: "memory://".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_hours: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        sweep_interval_minutes: 15,
        bcrypt_cost: 4,
        db_max_connections: 1,
    };
    let state = AppState::new(Arc::new(config), Repositories::memory(MemoryDb::new()));
    create_router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": "password", "name": "Test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_task(app: &Router, token: &str, body: Value) -> Value {
    let (status, task) = send(app, Method::POST, "/api/tasks", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{task}");
    task
}

#[tokio::test]
async fn register_login_and_duplicate_email() {
    let app = test_app();
    register(&app, "a@x.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "a@x.com", "password": "password", "name": "Again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"].get("password_hash").is_none());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/tasks", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tasks_are_created_validated_and_ordered() {
    let app = test_app();
    let token = register(&app, "a@x.com").await;

    let later = create_task(
        &app,
        &token,
        json!({ "title": "Later", "due_date": "2030-06-01", "priority": "low" }),
    )
    .await;
    assert_eq!(later["due_date"], "2030-06-01T00:00:00Z");
    assert_eq!(later["priority"], "Low");
    assert_eq!(later["completed"], false);

    create_task(
        &app,
        &token,
        json!({ "title": "Sooner", "due_date": "2030-01-01T09:30:00Z", "priority": "HIGH" }),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(&token),
        Some(json!({ "title": "Broken", "due_date": "next tuesday" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(&token),
        Some(json!({ "title": "Broken", "priority": "urgent" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, tasks) = send(&app, Method::GET, "/api/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Sooner", "Later"]);
}

#[tokio::test]
async fn tasks_are_scoped_to_their_owner() {
    let app = test_app();
    let alice = register(&app, "alice@x.com").await;
    let bob = register(&app, "bob@x.com").await;

    let task = create_task(&app, &alice, json!({ "title": "Private" })).await;
    let uri = format!("/api/tasks/{}", task["id"]);

    let (status, _) = send(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bob),
        Some(json!({
            "title": "Hijacked",
            "due_date": "2030-01-01",
            "priority": "low",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Private");
}

#[tokio::test]
async fn update_replaces_fields() {
    let app = test_app();
    let token = register(&app, "a@x.com").await;

    let task = create_task(
        &app,
        &token,
        json!({ "title": "Draft", "description": "old", "priority": "high" }),
    )
    .await;
    let uri = format!("/api/tasks/{}", task["id"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({
            "title": "Final",
            "completed": true,
            "due_date": "2031-02-03",
            "priority": "medium",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Final");
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["completed"], true);
    assert_eq!(body["priority"], "Medium");
    assert_eq!(body["due_date"], "2031-02-03T00:00:00Z");
}

#[tokio::test]
async fn deleting_a_category_keeps_its_tasks() {
    let app = test_app();
    let token = register(&app, "a@x.com").await;

    let (status, category) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(&token),
        Some(json!({ "name": "Home" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let task = create_task(
        &app,
        &token,
        json!({ "title": "Mow lawn", "category_id": category["id"] }),
    )
    .await;
    assert_eq!(task["category"]["name"], "Home");

    let (status, tasks) = send(
        &app,
        Method::GET,
        &format!("/api/categories/{}/tasks", category["id"]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/categories/{}", category["id"]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, tasks) = send(&app, Method::GET, "/api/tasks", Some(&token), None).await;
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["category_id"], Value::Null);
}

#[tokio::test]
async fn blank_category_name_is_rejected() {
    let app = test_app();
    let token = register(&app, "a@x.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(&token),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, categories) = send(&app, Method::GET, "/api/categories", Some(&token), None).await;
    assert!(categories.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reassigning_to_a_foreign_category_is_rejected() {
    let app = test_app();
    let alice = register(&app, "alice@x.com").await;
    let bob = register(&app, "bob@x.com").await;

    let (_, bob_category) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(&bob),
        Some(json!({ "name": "Bob's" })),
    )
    .await;
    let task = create_task(&app, &alice, json!({ "title": "Mine" })).await;
    let uri = format!("/api/tasks/{}/category", task["id"]);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "category_id": bob_category["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, unchanged) = send(
        &app,
        Method::GET,
        &format!("/api/tasks/{}", task["id"]),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(unchanged["category_id"], Value::Null);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/categories/{}/tasks", bob_category["id"]),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn overdue_task_is_notified_once_and_can_be_marked_read() {
    let app = test_app();
    let token = register(&app, "a@x.com").await;

    create_task(
        &app,
        &token,
        json!({ "title": "Pay rent", "due_date": "2024-01-01T00:00:00Z", "priority": "High" }),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notifications/check",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], 1);

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/notifications/check",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["created"], 0);

    let (status, notifications) =
        send(&app, Method::GET, "/api/notifications", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["message"], "Task overdue: Pay rent");
    assert_eq!(notifications[0]["is_read"], false);

    let other = register(&app, "b@x.com").await;
    let uri = format!("/api/notifications/{}/read", notifications[0]["id"]);

    let (status, _) = send(&app, Method::POST, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, read) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["is_read"], true);
}

#[tokio::test]
async fn deleting_the_account_removes_everything() {
    let app = test_app();
    let token = register(&app, "a@x.com").await;
    create_task(&app, &token, json!({ "title": "Soon", "due_date": "2024-01-01" })).await;

    let (status, me) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "a@x.com");

    let (status, _) = send(&app, Method::DELETE, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/notifications/check",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["created"], 0);
}
