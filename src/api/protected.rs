use crate::auth::Auth;

/// Example gated handler.
pub async fn protected(Auth(user): Auth) -> String {
    format!("Hello, {}! This is a protected route.", user.principal)
}
