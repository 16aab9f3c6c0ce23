use api::{auth_handlers::TokenResponse, router::router, AppState};
use auth::{PasswordHasher, TokenIssuer};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use storage::MemoryUserStore;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &[u8] = b"integration-secret";

fn create_test_app() -> Router {
    let hasher = PasswordHasher::with_cost(1024, 1, 1).unwrap();
    let state = AppState::from_store(Arc::new(MemoryUserStore::new()), SECRET, hasher);
    router(Arc::new(state), Duration::from_secs(10))
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> StatusCode {
    let request = json_request(
        Method::POST,
        "/register",
        None,
        json!({ "email": email, "password": password }),
    );
    app.clone().oneshot(request).await.unwrap().status()
}

async fn login(app: &Router, email: &str, password: &str) -> Response {
    let request = json_request(
        Method::POST,
        "/login",
        None,
        json!({ "email": email, "password": password }),
    );
    app.clone().oneshot(request).await.unwrap()
}

async fn token_for(app: &Router, email: &str, password: &str) -> String {
    let response = login(app, email, password).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let token: TokenResponse = serde_json::from_slice(&bytes).unwrap();
    token.token
}

async fn list_users(app: &Router, token: &str) -> Response {
    let auth = format!("Bearer {}", token);
    app.clone()
        .oneshot(empty_request(Method::GET, "/users", Some(&auth)))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .contains("application/json"));
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));

    for method in [Method::POST, Method::PUT] {
        let response = app
            .clone()
            .oneshot(empty_request(method, "/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}

#[tokio::test]
async fn test_register_login_and_list() {
    let app = create_test_app();

    assert_eq!(register(&app, "a@b.com", "pw123").await, StatusCode::CREATED);
    let token = token_for(&app, "a@b.com", "pw123").await;
    assert!(!token.is_empty());

    let response = list_users(&app, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let users = body_json(response).await;
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "a@b.com");
    assert_eq!(users[0]["role"], "user");
    assert!(users[0].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_invalid_body() {
    let app = create_test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid request body");

    let missing_type = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .body(Body::from(r#"{"email":"a@b.com","password":"pw"}"#))
        .unwrap();
    let response = app.clone().oneshot(missing_type).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(register(&app, "", "pw").await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = create_test_app();

    assert_eq!(register(&app, "dup@b.com", "pw").await, StatusCode::CREATED);
    assert_eq!(register(&app, "dup@b.com", "other").await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_identical() {
    let app = create_test_app();
    register(&app, "a@b.com", "pw123").await;

    let wrong_password = login(&app, "a@b.com", "nope").await;
    let unknown_email = login(&app, "ghost@b.com", "pw123").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
}

#[tokio::test]
async fn test_login_with_empty_fields_is_unauthorized() {
    let app = create_test_app();
    register(&app, "a@b.com", "pw123").await;

    let empty_password = login(&app, "a@b.com", "").await;
    assert_eq!(empty_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(empty_password).await["error"], "invalid credentials");

    assert_eq!(login(&app, "", "pw123").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_users_requires_header() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/users", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Authorization header required");
}

#[tokio::test]
async fn test_users_rejects_garbage_token() {
    let app = create_test_app();

    let response = list_users(&app, "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid token");
}

#[tokio::test]
async fn test_users_rejects_wrong_scheme() {
    let app = create_test_app();
    register(&app, "a@b.com", "pw123").await;
    let token = token_for(&app, "a@b.com", "pw123").await;

    let auth = format!("Token {}", token);
    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/users", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid authorization header");
}

#[tokio::test]
async fn test_users_rejects_expired_and_foreign_tokens() {
    let app = create_test_app();
    let id = Uuid::new_v4();

    let expired = TokenIssuer::new(SECRET)
        .issue(id, "user", Utc::now() - ChronoDuration::hours(25))
        .unwrap();
    assert_eq!(list_users(&app, &expired).await.status(), StatusCode::UNAUTHORIZED);

    let foreign = TokenIssuer::new(b"someone-else")
        .issue(id, "user", Utc::now())
        .unwrap();
    assert_eq!(list_users(&app, &foreign).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_password_flow() {
    let app = create_test_app();
    register(&app, "a@b.com", "oldpw").await;
    let token = token_for(&app, "a@b.com", "oldpw").await;

    let users = body_json(list_users(&app, &token).await).await;
    let id = users[0]["id"].as_str().unwrap().to_string();

    let request = json_request(
        Method::PATCH,
        &format!("/users/{}/password", id),
        Some(&token),
        json!({ "new_password": "newpw" }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(login(&app, "a@b.com", "oldpw").await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(login(&app, "a@b.com", "newpw").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_password_bad_input() {
    let app = create_test_app();
    register(&app, "a@b.com", "pw").await;
    let token = token_for(&app, "a@b.com", "pw").await;

    let bad_id = json_request(
        Method::PATCH,
        "/users/not-a-uuid/password",
        Some(&token),
        json!({ "new_password": "x" }),
    );
    let response = app.clone().oneshot(bad_id).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid user ID");

    let bad_body = json_request(
        Method::PATCH,
        &format!("/users/{}/password", Uuid::new_v4()),
        Some(&token),
        json!({ "password": "x" }),
    );
    let response = app.clone().oneshot(bad_body).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_twice() {
    let app = create_test_app();
    register(&app, "a@b.com", "pw").await;
    let token = token_for(&app, "a@b.com", "pw").await;

    let users = body_json(list_users(&app, &token).await).await;
    let uri = format!("/users/{}", users[0]["id"].as_str().unwrap());
    let auth = format!("Bearer {}", token);

    let first = app
        .clone()
        .oneshot(empty_request(Method::DELETE, &uri, Some(&auth)))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    let second = app
        .clone()
        .oneshot(empty_request(Method::DELETE, &uri, Some(&auth)))
        .await
        .unwrap();
    assert!(!second.status().is_success());
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Tokens are stateless: the deleted account's token still authenticates.
    let response = list_users(&app, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_delete_bad_id() {
    let app = create_test_app();
    register(&app, "a@b.com", "pw").await;
    let token = token_for(&app, "a@b.com", "pw").await;

    let auth = format!("Bearer {}", token);
    let response = app
        .clone()
        .oneshot(empty_request(Method::DELETE, "/users/123", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unauthenticated = app
        .clone()
        .oneshot(empty_request(Method::DELETE, "/users/123", None))
        .await
        .unwrap();
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);
}
