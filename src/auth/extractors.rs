//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::GateRejection;
use super::types::AuthenticatedUser;

/// Extractor for handlers mounted behind [`require_session`](super::require_session).
///
/// Reads the identity the gate attached to the request. A handler that is
/// reachable without the gate gets a 401 instead of an anonymous request.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthenticatedUser>() {
            Some(user) => Ok(Auth(user.clone())),
            None => {
                tracing::error!("Auth extractor used on a route without the session gate");
                Err(GateRejection::Unauthenticated)
            }
        }
    }
}
