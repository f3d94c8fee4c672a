mod error;
mod protected;
mod session;

use axum::{
    Router, middleware,
    routing::{any, post},
};
use std::sync::Arc;

use crate::auth::{REFRESH_PATH, SessionGate, require_session};
use crate::credentials::CredentialStore;
use crate::jwt::TokenCodec;
use crate::rate_limit::{RateLimitConfig, rate_limit_login};

pub use error::ApiError;
pub use protected::protected;
pub use session::{SessionState, login, logout, refresh};

/// Create the router for the session endpoints and the example protected route.
pub fn create_api_router(
    codec: Arc<TokenCodec>,
    credentials: Arc<dyn CredentialStore>,
    secure_cookies: bool,
    rate_limit: Option<RateLimitConfig>,
) -> Router {
    let session_state = SessionState {
        codec: codec.clone(),
        credentials,
        secure_cookies,
    };

    let login_router = Router::new()
        .route("/login", post(login))
        .with_state(session_state.clone());

    let login_router = match rate_limit {
        Some(config) => {
            login_router.route_layer(middleware::from_fn_with_state(config, rate_limit_login))
        }
        None => login_router,
    };

    let session_router = Router::new()
        .route(REFRESH_PATH, any(refresh))
        .route("/logout", post(logout))
        .with_state(session_state);

    let protected_router = Router::new()
        .route("/protected", any(protected))
        .route_layer(middleware::from_fn_with_state(
            SessionGate::new(codec),
            require_session,
        ));

    Router::new()
        .merge(login_router)
        .merge(session_router)
        .merge(protected_router)
}
