//! Access-token gate for protected routes.
//!
//! Per request, one of:
//! - no `access_token` cookie: 401
//! - token malformed, forged, or of the wrong kind: 401
//! - token correctly signed but expired: 307 to the refresh endpoint
//! - token valid: the principal is attached and the inner handler runs
//!
//! The gate never touches cookies.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use super::errors::GateRejection;
use super::types::AuthenticatedUser;
use crate::jwt::TokenCodec;

/// Default location of the refresh endpoint.
pub const REFRESH_PATH: &str = "/refresh";

/// State for [`require_session`].
#[derive(Clone)]
pub struct SessionGate {
    codec: Arc<TokenCodec>,
    refresh_path: String,
}

impl SessionGate {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self {
            codec,
            refresh_path: REFRESH_PATH.to_string(),
        }
    }

    /// Redirect expired sessions somewhere other than `/refresh`.
    pub fn with_refresh_path(mut self, refresh_path: impl Into<String>) -> Self {
        self.refresh_path = refresh_path.into();
        self
    }

    /// Decide the outcome for a request carrying `headers`.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, GateRejection> {
        let Some(token) = get_cookie(headers, ACCESS_COOKIE_NAME) else {
            debug!("No access token cookie");
            return Err(GateRejection::Unauthenticated);
        };

        match self.codec.verify_access(token) {
            Ok(principal) => Ok(AuthenticatedUser { principal }),
            Err(e) if e.is_expired() => {
                debug!("Access token expired, redirecting to refresh");
                Err(GateRejection::Expired {
                    refresh_path: self.refresh_path.clone(),
                })
            }
            Err(e) => {
                debug!(error = %e, "Access token rejected");
                Err(GateRejection::Unauthenticated)
            }
        }
    }
}

/// Middleware gating a route on a valid access token.
///
/// ```ignore
/// Router::new()
///     .route("/protected", any(handler))
///     .route_layer(middleware::from_fn_with_state(gate, require_session))
/// ```
pub async fn require_session(
    State(gate): State<SessionGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.authenticate(request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}
