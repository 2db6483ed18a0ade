//! Auth store against a live HTTP endpoint.
//!
//! Each test binds a small axum app on `127.0.0.1:0` that plays the auth API.

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use client::{AuthStatus, AuthStore, SessionCheck};
use reqwest::cookie::Jar;
use serde_json::{Value, json};
use shared::{
    config::ClientConfig,
    models::{Gender, RegisterRequest, Role},
};
use std::{sync::Arc, time::Duration};
use tempfile::TempDir;
use url::Url;

const SESSION_COOKIE: &str = "token=srv-session";

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "a@b.com" && body["password"] == "longenough1" {
        (
            StatusCode::OK,
            [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/; HttpOnly"))],
            Json(json!({"success": true, "user": {"name": "A"}, "token": "t1"})),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@b.com" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "Email already registered"})),
        )
            .into_response();
    }
    if body["dob"] != "1990-04-02" || body["role"] != "Doctor" || body["gender"] != "Female" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Malformed registration"})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/"))],
        Json(json!({"success": true, "user": {"name": body["name"]}, "token": "t2"})),
    )
        .into_response()
}

async fn check(headers: HeaderMap) -> Response {
    let has_session = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookies| cookies.contains(SESSION_COOKIE));
    if has_session {
        Json(json!({"success": true, "user": {"name": "A"}})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Not authenticated"})),
        )
            .into_response()
    }
}

async fn logout() -> Response {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, "token=; Max-Age=0; Path=/")],
        Json(json!({"success": true})),
    )
        .into_response()
}

async fn slow_logout() -> Response {
    tokio::time::sleep(Duration::from_secs(5)).await;
    logout().await
}

fn auth_api(slow: bool) -> Router {
    let router = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/check", get(check));
    if slow {
        router.route("/api/auth/logout", post(slow_logout))
    } else {
        router.route("/api/auth/logout", post(logout))
    }
}

async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

fn config(base: Url, dir: &TempDir) -> ClientConfig {
    ClientConfig {
        api_base_url: base,
        session_dir: dir.path().to_path_buf(),
        request_timeout_secs: Some(1),
        ..ClientConfig::with_defaults()
    }
}

fn store(config: &ClientConfig) -> AuthStore {
    AuthStore::from_config(config, Arc::new(Jar::default())).unwrap()
}

#[tokio::test]
async fn login_against_server() {
    let dir = TempDir::new().unwrap();
    let config = config(serve(auth_api(false)).await, &dir);
    let store = store(&config);

    store.login("a@b.com", "longenough1").await.unwrap();

    let state = store.snapshot();
    assert!(state.is_authenticated);
    assert_eq!(state.user.as_ref().and_then(|user| user.name()), Some("A"));
    assert_eq!(state.token.as_deref(), Some("t1"));
    assert_eq!(state.status, AuthStatus::Success);
}

#[tokio::test]
async fn rejected_login_surfaces_server_message() {
    let dir = TempDir::new().unwrap();
    let config = config(serve(auth_api(false)).await, &dir);
    let store = store(&config);

    let err = store.login("a@b.com", "wrongpass1").await.unwrap_err();

    assert_eq!(err.http_status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    assert_eq!(err.server_message(), Some("Invalid credentials"));
    assert_eq!(err.user_message(), "Invalid credentials");
    let state = store.snapshot();
    assert!(!state.is_authenticated);
    assert_eq!(state.user, None);
    assert_eq!(state.status, AuthStatus::Error);
}

#[tokio::test]
async fn registration_sends_full_record() {
    let dir = TempDir::new().unwrap();
    let config = config(serve(auth_api(false)).await, &dir);
    let store = store(&config);

    let mut request = RegisterRequest {
        name: "Ada".to_string(),
        dob: NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
        role: Role::Doctor,
        gender: Gender::Female,
        email: "ada@b.com".to_string(),
        password: "longenough1".to_string(),
    };
    store.register(&request).await.unwrap();
    assert!(store.is_authenticated());
    assert_eq!(store.token().as_deref(), Some("t2"));

    request.email = "taken@b.com".to_string();
    let err = store.register(&request).await.unwrap_err();
    assert_eq!(err.user_message(), "Email already registered");
    assert_eq!(store.status(), AuthStatus::Error);
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn session_cookie_drives_check() {
    let dir = TempDir::new().unwrap();
    let config = config(serve(auth_api(false)).await, &dir);
    let store = store(&config);

    match store.check_session().await {
        SessionCheck::NoSession { status } => assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED),
        other => panic!("expected NoSession, got {other:?}"),
    }
    assert_eq!(store.status(), AuthStatus::Idle);

    store.login("a@b.com", "longenough1").await.unwrap();
    assert!(store.check_auth().await);
    assert_eq!(store.status(), AuthStatus::Success);

    store.logout().await;
    assert!(!store.check_auth().await);
    assert_eq!(store.status(), AuthStatus::Idle);
}

#[tokio::test]
async fn logout_timeout_still_clears_session() {
    let dir = TempDir::new().unwrap();
    let config = config(serve(auth_api(true)).await, &dir);
    let store = store(&config);
    store.login("a@b.com", "longenough1").await.unwrap();

    store.logout().await;

    let state = store.snapshot();
    assert!(!state.is_authenticated);
    assert_eq!(state.user, None);
    assert_eq!(state.token, None);
    assert_eq!(state.status, AuthStatus::Idle);
}

#[tokio::test]
async fn unreachable_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let config = config(Url::parse(&format!("http://{addr}/")).unwrap(), &dir);
    let store = store(&config);

    let err = store.login("a@b.com", "longenough1").await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(store.status(), AuthStatus::Error);

    match store.check_session().await {
        SessionCheck::Unreachable(err) => assert!(err.is_transport()),
        other => panic!("expected Unreachable, got {other:?}"),
    }
    assert_eq!(store.status(), AuthStatus::Idle);

    store.logout().await;
    assert_eq!(store.status(), AuthStatus::Idle);
}

#[tokio::test]
async fn session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = config(serve(auth_api(false)).await, &dir);

    let first = store(&config);
    first.login("a@b.com", "longenough1").await.unwrap();
    drop(first);

    let second = store(&config);
    let state = second.snapshot();
    assert!(state.is_authenticated);
    assert_eq!(state.user.as_ref().and_then(|user| user.name()), Some("A"));
    assert_eq!(state.token.as_deref(), Some("t1"));
    assert_eq!(state.status, AuthStatus::Idle);

    second.logout().await;
    let third = store(&config);
    assert!(!third.is_authenticated());
}
