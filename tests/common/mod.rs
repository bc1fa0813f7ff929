#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use jobboard_backend::{
    config::{Config, LogFormat},
    database::pool::run_migrations,
    services::{mail_service::LogMailer, storage_service::DiskStore},
    AppState,
};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

pub const MAX_UPLOAD: usize = 5 * 1024 * 1024;

pub fn config(database_url: &str, uploads_dir: &Path) -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: database_url.into(),
        jwt_secret: "test_secret_key".into(),
        public_url: "http://localhost:3000".into(),
        session_ttl_hours: 1,
        uploads_dir: uploads_dir.to_string_lossy().into_owned(),
        max_upload_mb: 5,
        cloud: None,
        mail_webhook_url: None,
        mail_webhook_secret: None,
        log_format: LogFormat::Pretty,
    }
}

fn state_for(pool: sqlx::PgPool, config: &Config) -> AppState {
    let storage = Arc::new(DiskStore::new(&config.uploads_dir, &config.public_url));
    AppState::with_collaborators(pool, config, storage, Arc::new(LogMailer))
}

/// State whose pool never connects; enough for requests rejected before any query runs.
pub fn offline_state(uploads_dir: &Path) -> AppState {
    let config = config("postgres://nobody@127.0.0.1:1/none", uploads_dir);
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");
    state_for(pool, &config)
}

/// `None` when `DATABASE_URL` is not set, so database-backed tests skip quietly.
pub async fn live_state(uploads_dir: &Path) -> Option<AppState> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").ok()?;
    let config = config(&url, uploads_dir);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    run_migrations(&pool).await.expect("migrations");
    Some(state_for(pool, &config))
}

pub fn app(state: AppState) -> Router {
    jobboard_backend::routes::app(state, MAX_UPLOAD)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, JsonValue) {
    let response = app.clone().oneshot(request).await.expect("router");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), MAX_UPLOAD).await.expect("body");
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: JsonValue) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    builder.body(Body::empty()).expect("request")
}

/// Unique enough for parallel test runs against one database.
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn unique_phone() -> String {
    let digits: u64 = rand::random::<u64>() % 100_000_000;
    format!("010{:08}", digits)
}
