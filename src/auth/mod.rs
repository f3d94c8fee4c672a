//! Cookie-borne session authentication.
//!
//! Dual-token system: short-lived access tokens (15 min) gate protected
//! routes, long-lived refresh tokens (7 days) mint new access tokens. Both are
//! stateless; the server keeps no session table.

mod cookie;
mod errors;
mod extractors;
mod gate;
mod types;

pub use cookie::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, clear_cookie, get_cookie, session_cookie};
pub use errors::GateRejection;
pub use extractors::Auth;
pub use gate::{REFRESH_PATH, SessionGate, require_session};
pub use types::AuthenticatedUser;
