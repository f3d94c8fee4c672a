//! Authentication user types.

use crate::jwt::Principal;

/// Identity resolved from a verified access token.
///
/// Inserted into the request extensions by the session gate and read back by
/// the [`Auth`](super::Auth) extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub principal: Principal,
}
