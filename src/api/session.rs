//! Session API endpoints.
//!
//! - POST `/login` - Verify credentials and issue both token cookies
//! - ANY `/refresh` - Exchange the refresh token for a new access token
//! - POST `/logout` - Clear both cookies

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ApiError;
use crate::auth::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, clear_cookie, get_cookie, session_cookie,
};
use crate::credentials::CredentialStore;
use crate::jwt::{Principal, TokenCodec};

#[derive(Clone)]
pub struct SessionState {
    pub codec: Arc<TokenCodec>,
    pub credentials: Arc<dyn CredentialStore>,
    pub secure_cookies: bool,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Verify credentials and set the access and refresh cookies.
///
/// The body is parsed as JSON regardless of `Content-Type`.
pub async fn login(
    State(state): State<SessionState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload: LoginRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Malformed login body");
        ApiError::bad_request("Invalid request body")
    })?;

    if !state.credentials.verify(&payload.username, &payload.password) {
        warn!(username = %payload.username, "Invalid credentials");
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let principal = Principal::new(payload.username);

    let access = state.codec.issue_access(&principal).map_err(|e| {
        ApiError::internal("Failed to generate access token", e, "Failed to generate token")
    })?;

    let refresh = state.codec.issue_refresh(&principal).map_err(|e| {
        ApiError::internal("Failed to generate refresh token", e, "Failed to generate token")
    })?;

    info!(username = %principal, "Login successful");

    Ok((
        StatusCode::OK,
        AppendHeaders([
            (
                SET_COOKIE,
                session_cookie(ACCESS_COOKIE_NAME, &access.token, state.secure_cookies),
            ),
            (
                SET_COOKIE,
                session_cookie(REFRESH_COOKIE_NAME, &refresh.token, state.secure_cookies),
            ),
        ]),
        Json(MessageResponse {
            message: "Login successful",
        }),
    ))
}

/// Mint a new access token from the refresh cookie.
/// The refresh token itself is never rotated here.
pub async fn refresh(
    State(state): State<SessionState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .ok_or_else(|| ApiError::unauthorized("Missing refresh token"))?;

    let principal = state.codec.verify_refresh(refresh_token).map_err(|e| {
        warn!(error = %e, "Refresh token rejected");
        ApiError::unauthorized("Invalid refresh token")
    })?;

    let access = state.codec.issue_access(&principal).map_err(|e| {
        ApiError::internal("Failed to generate access token", e, "Failed to generate token")
    })?;

    info!(username = %principal, "Access token refreshed");

    Ok((
        StatusCode::OK,
        [(
            SET_COOKIE,
            session_cookie(ACCESS_COOKIE_NAME, &access.token, state.secure_cookies),
        )],
        Json(MessageResponse {
            message: "Access token refreshed",
        }),
    ))
}

/// Clear both cookies. No server-side state is involved.
pub async fn logout(State(state): State<SessionState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        AppendHeaders([
            (SET_COOKIE, clear_cookie(ACCESS_COOKIE_NAME, state.secure_cookies)),
            (SET_COOKIE, clear_cookie(REFRESH_COOKIE_NAME, state.secure_cookies)),
        ]),
        Json(MessageResponse {
            message: "Logged out",
        }),
    )
}
