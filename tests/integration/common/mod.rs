//! Shared helpers for the HTTP integration tests.
//!
//! The router is the production one from `api::create_router`, backed by the
//! per-test database that `#[sqlx::test]` provides. Redis is configured but
//! never contacted unless a test exercises the OTP store.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use gamehub_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{redis::RedisService, Services},
    AppState,
};

pub fn build_test_app(pool: PgPool) -> Router {
    let config = AppConfig::default();
    let redis = RedisService::open(&config.redis.url).expect("valid redis url");
    let services = Services::new(Repository::new(pool), &config, redis);

    api::create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post(app: &Router, uri: &str, token: &str, body: Option<Value>) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), body).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register an account through the API and return its token and id
pub async fn register(app: &Router, username: &str, role: &str) -> (String, i64) {
    let response = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@campus.edu", username),
            "password": "password123",
            "password_confirm": "password123",
            "role": role,
        })),
    )
    .await;
    assert_eq!(response.status(), 201, "registering {}", username);
    let json = body_json(response).await;
    (
        json["token"].as_str().unwrap().to_string(),
        json["user"]["id"].as_i64().unwrap(),
    )
}

pub async fn login(app: &Router, username: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    )
    .await;
    assert_eq!(response.status(), 200, "login {}", username);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

/// Super admins cannot self-register; promote a fresh account in the database
pub async fn super_admin(app: &Router, pool: &PgPool, username: &str) -> String {
    let (_, id) = register(app, username, "student").await;
    sqlx::query("UPDATE users SET role = 'super_admin' WHERE id = $1")
        .bind(id as i32)
        .execute(pool)
        .await
        .unwrap();
    login(app, username).await
}

/// Add a game as `token` and return its id
pub async fn create_game(app: &Router, token: &str, body: Value) -> i64 {
    let response = post(app, "/api/v1/games", token, Some(body)).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Request a rental for `days` days and return the rental id
pub async fn request_rental(app: &Router, token: &str, game_id: i64, days: i64) -> i64 {
    let response = post(
        app,
        &format!("/api/v1/request/{}", game_id),
        token,
        Some(json!({ "rental_days": days })),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["rental"]["id"].as_i64().unwrap()
}
