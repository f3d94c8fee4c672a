//! Session gate rejections.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

/// Terminal response produced by the session gate.
///
/// The response never says why a token was refused, only whether the client
/// should try the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    /// Missing, malformed, forged, or wrong-kind access token
    Unauthenticated,
    /// Correctly signed access token past its expiry
    Expired { refresh_path: String },
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Not authenticated",
                }),
            )
                .into_response(),
            GateRejection::Expired { refresh_path } => {
                Redirect::temporary(&refresh_path).into_response()
            }
        }
    }
}
