//! Rate limiting for the login endpoint.
//!
//! Uses a token bucket algorithm with per-IP tracking to slow down password
//! guessing.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
};
use tracing::warn;

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Tracked client count above which idle entries are dropped.
const PRUNE_THRESHOLD: usize = 10_000;

/// Rate limiting configuration for authentication endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Per-IP limiter for login attempts
    pub login: Arc<IpLimiter>,
}

impl RateLimitConfig {
    /// Allow `attempts` logins per minute per IP, available as an initial burst.
    pub fn per_minute(attempts: NonZeroU32) -> Self {
        Self::with_quota(Quota::per_minute(attempts))
    }

    pub fn with_quota(quota: Quota) -> Self {
        Self {
            login: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Drop clients whose bucket has fully refilled.
    pub fn prune(&self) {
        self.login.retain_recent();
        self.login.shrink_to_fit();
    }

    fn prune_if_large(&self) {
        if self.login.len() > PRUNE_THRESHOLD {
            self.prune();
        }
    }
}

/// Client IP from the connection info inserted by
/// `into_make_service_with_connect_info`.
fn client_ip(request: &Request) -> Option<IpAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
}

/// Middleware for rate limiting login attempts.
pub async fn rate_limit_login(
    State(config): State<RateLimitConfig>,
    request: Request,
    next: Next,
) -> Response {
    let Some(ip) = client_ip(&request) else {
        return (StatusCode::FORBIDDEN, "Unable to determine client IP.").into_response();
    };

    config.prune_if_large();

    match config.login.check_key(&ip) {
        Ok(_) => next.run(request).await,
        Err(_) => {
            warn!(ip = %ip, "Login rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many login attempts. Please wait before trying again.",
            )
                .into_response()
        }
    }
}
