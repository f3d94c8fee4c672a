pub mod api;
pub mod auth;
pub mod cli;
pub mod credentials;
pub mod jwt;
pub mod rate_limit;

use api::create_api_router;
use axum::Router;
use credentials::CredentialStore;
use jwt::TokenCodec;
use rate_limit::RateLimitConfig;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Secret for signing access tokens
    pub access_secret: Vec<u8>,
    /// Secret for signing refresh tokens (must differ from `access_secret`)
    pub refresh_secret: Vec<u8>,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
    /// Username/password verification
    pub credentials: Arc<dyn CredentialStore>,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
    /// Login attempts allowed per minute per client IP (None disables limiting)
    pub login_rate_per_minute: Option<NonZeroU32>,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let codec = Arc::new(
        TokenCodec::new(&config.access_secret, &config.refresh_secret)
            .with_lifetimes(config.access_ttl, config.refresh_ttl),
    );

    let rate_limit = config
        .login_rate_per_minute
        .map(RateLimitConfig::per_minute);

    create_api_router(
        codec,
        config.credentials.clone(),
        config.secure_cookies,
        rate_limit,
    )
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
