//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::credentials::{CredentialStore, StaticCredentials};
use clap::Parser;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const MIN_SECRET_LENGTH: usize = 32;

/// Upper bound for either token lifetime: 365 days.
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Environment variable holding the access token secret.
pub const ACCESS_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";

/// Environment variable holding the refresh token secret.
pub const REFRESH_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "cookiegate",
    about = "Cookie-based access/refresh token authentication server"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Path to file containing the access token secret. Prefer the ACCESS_TOKEN_SECRET env var
    #[arg(long)]
    pub access_secret_file: Option<String>,

    /// Path to file containing the refresh token secret. Prefer the REFRESH_TOKEN_SECRET env var
    #[arg(long)]
    pub refresh_secret_file: Option<String>,

    /// JSON file mapping usernames to passwords. Without it, two demo accounts are used
    #[arg(short, long, env = "USERS_FILE")]
    pub users_file: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, default_value = "900", value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_SECS))]
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds
    #[arg(long, default_value = "604800", value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_SECS))]
    pub refresh_ttl_secs: u64,

    /// Set the Secure flag on cookies (enable when served over HTTPS)
    #[arg(long)]
    pub secure_cookies: bool,

    /// Login attempts allowed per minute per client IP (0 disables rate limiting)
    #[arg(long, default_value = "20")]
    pub login_rate_per_minute: u32,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load a signing secret from an environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_secret(env_var: &str, secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var(env_var) {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(env_var) };
        secret
    } else if let Some(path) = secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret file");
                return None;
            }
        }
    } else {
        error!(
            env = %env_var,
            "Signing secret is required. Set the environment variable (recommended) or pass a secret file"
        );
        return None;
    };

    Some(secret)
}

/// Check that both secrets are long enough and not the same.
pub fn validate_secrets(access: &str, refresh: &str) -> Result<(), String> {
    for (name, secret) in [("Access", access), ("Refresh", refresh)] {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(format!(
                "{} token secret is shorter than {} characters. Use a longer secret",
                name, MIN_SECRET_LENGTH
            ));
        }
    }

    if access == refresh {
        return Err("Access and refresh token secrets must differ".to_string());
    }

    Ok(())
}

/// Load the credential store, falling back to the demo accounts.
/// Returns None and logs an error if the file cannot be loaded.
pub fn load_credentials(users_file: Option<&str>) -> Option<Arc<dyn CredentialStore>> {
    match users_file {
        Some(path) => match StaticCredentials::from_json_file(Path::new(path)) {
            Ok(store) => {
                info!(path = %path, users = store.len(), "Credentials loaded");
                Some(Arc::new(store))
            }
            Err(e) => {
                error!(path = %path, error = %e, "Failed to load credentials");
                None
            }
        },
        None => {
            warn!("No users file given, using demo accounts");
            Some(Arc::new(StaticCredentials::demo()))
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    args: &Args,
    access_secret: String,
    refresh_secret: String,
    credentials: Arc<dyn CredentialStore>,
) -> ServerConfig {
    ServerConfig {
        access_secret: access_secret.into_bytes(),
        refresh_secret: refresh_secret.into_bytes(),
        access_ttl: Duration::from_secs(args.access_ttl_secs),
        refresh_ttl: Duration::from_secs(args.refresh_ttl_secs),
        credentials,
        secure_cookies: args.secure_cookies,
        login_rate_per_minute: NonZeroU32::new(args.login_rate_per_minute),
    }
}
