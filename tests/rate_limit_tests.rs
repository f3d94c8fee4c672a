//! Tests for per-IP login rate limiting.

mod common;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
};
use common::*;
use std::net::SocketAddr;

const TEST_IP: [u8; 4] = [127, 0, 0, 1];
const ALT_IP: [u8; 4] = [192, 168, 1, 100];

fn login_from(ip: [u8; 4], password: &str) -> Request<Body> {
    let body = format!(r#"{{"username":"user1","password":"{}"}}"#, password);
    Request::builder()
        .method("POST")
        .uri("/login")
        .extension(ConnectInfo(SocketAddr::from((ip, 40000))))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_login_rate_limited_per_ip() {
    let app = create_rate_limited_app(2);

    let first = send(&app, login_from(TEST_IP, "wrong")).await;
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    let second = send(&app, login_from(TEST_IP, "password123")).await;
    assert_eq!(second.status(), StatusCode::OK);

    let third = send(&app, login_from(TEST_IP, "password123")).await;
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another client is unaffected
    let other = send(&app, login_from(ALT_IP, "password123")).await;
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_client_ip_forbidden_when_limited() {
    let app = create_rate_limited_app(5);

    let response = send(
        &app,
        login_request(r#"{"username":"user1","password":"password123"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_refresh_not_rate_limited() {
    let app = create_rate_limited_app(1);
    let codec = test_codec();
    let refresh = codec
        .issue_refresh(&cookiegate::jwt::Principal::new("user1"))
        .unwrap();

    for _ in 0..3 {
        let response = send(
            &app,
            request_with_cookie(
                "POST",
                "/refresh",
                &format!("refresh_token={}", refresh.token),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
