#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use mpesa_relay::{build_router, AppConfig, AppState};

pub const CONSUMER_KEY: &str = "test-key";
pub const CONSUMER_SECRET: &str = "test-secret";
pub const PASSKEY: &str = "test-passkey";
pub const SHORT_CODE: &str = "174379";

pub fn test_config(base_url: &str, timeout_secs: u64) -> AppConfig {
    let base_url = base_url.to_string();
    let timeout = timeout_secs.to_string();
    AppConfig::from_lookup(move |key| match key {
        "MPESA_CONSUMER_KEY" => Some(CONSUMER_KEY.to_string()),
        "MPESA_CONSUMER_SECRET" => Some(CONSUMER_SECRET.to_string()),
        "MPESA_PASSKEY" => Some(PASSKEY.to_string()),
        "MPESA_BUSINESS_SHORT_CODE" => Some(SHORT_CODE.to_string()),
        "MPESA_CALLBACK_URL" => Some("https://relay.test/api/mpesa/callback".to_string()),
        "MPESA_BASE_URL" => Some(base_url.clone()),
        "MPESA_HTTP_TIMEOUT_SECS" => Some(timeout.clone()),
        _ => None,
    })
    .expect("test config")
}

pub fn app(base_url: &str) -> Router {
    app_with_timeout(base_url, 5)
}

pub fn app_with_timeout(base_url: &str, timeout_secs: u64) -> Router {
    let state = AppState::new(test_config(base_url, timeout_secs)).expect("app state");
    build_router(state)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn raw_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
