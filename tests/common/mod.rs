#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use cookiegate::{ServerConfig, create_app, credentials::StaticCredentials, jwt::TokenCodec};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-0123456789abcdef";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-0123456789abcde";

pub const PROTECTED_BODY: &str = "Hello, user1! This is a protected route.";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        access_secret: ACCESS_SECRET.to_vec(),
        refresh_secret: REFRESH_SECRET.to_vec(),
        access_ttl: Duration::from_secs(15 * 60),
        refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        credentials: Arc::new(StaticCredentials::demo()),
        secure_cookies: false, // Tests run on plain HTTP
        login_rate_per_minute: None,
    }
}

/// Create a test app without rate limiting and a codec sharing its secrets.
pub fn create_test_app() -> (Router, TokenCodec) {
    (create_app(&test_config()), test_codec())
}

/// Create a test app that allows `attempts` logins per minute per IP.
pub fn create_rate_limited_app(attempts: u32) -> Router {
    let mut config = test_config();
    config.login_rate_per_minute = NonZeroU32::new(attempts);
    create_app(&config)
}

pub fn test_codec() -> TokenCodec {
    TokenCodec::new(ACCESS_SECRET, REFRESH_SECRET)
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn login_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn request_with_cookie(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Value of the named cookie among Set-Cookie headers
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    cookies.iter().find_map(|c| {
        c.strip_prefix(&prefix)
            .map(|rest| rest.split(';').next().unwrap_or("").to_string())
    })
}

pub async fn body_string(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Log in as user1 and return (access_token, refresh_token).
pub async fn login_user1(app: &Router) -> (String, String) {
    let response = send(
        app,
        login_request(r#"{"username":"user1","password":"password123"}"#),
    )
    .await;
    let cookies = extract_set_cookies(&response);
    (
        cookie_value(&cookies, "access_token").unwrap(),
        cookie_value(&cookies, "refresh_token").unwrap(),
    )
}
