//! Signed, expiring session tokens.
//!
//! Access and refresh tokens share one claim shape but are signed with
//! separate secrets and tagged with their kind, so neither can stand in for
//! the other.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Access token lifetime: 15 minutes
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 15 * 60;

/// Refresh token lifetime: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// The authenticated subject embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token kind, carried in the `typ` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token gating protected routes
    Access,
    /// Long-lived token used only to mint new access tokens
    Refresh,
}

/// JWT claims shared by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: Principal,
    /// Token kind
    #[serde(rename = "typ")]
    pub kind: TokenKind,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Result of issuing a token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The JWT token string
    pub token: String,
    /// Issued at timestamp (Unix seconds)
    pub issued_at: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token duration in seconds
    pub duration: u64,
}

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Issues and verifies access and refresh tokens.
///
/// Holds only immutable key material, so a shared reference can be used from
/// any number of request tasks at once.
#[derive(Clone)]
pub struct TokenCodec {
    access: SigningKeys,
    refresh: SigningKeys,
    access_duration: u64,
    refresh_duration: u64,
}

impl TokenCodec {
    /// Create a codec with the default lifetimes (15 minutes / 7 days).
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access: SigningKeys::new(access_secret),
            refresh: SigningKeys::new(refresh_secret),
            access_duration: ACCESS_TOKEN_DURATION_SECS,
            refresh_duration: REFRESH_TOKEN_DURATION_SECS,
        }
    }

    /// Override the token lifetimes.
    ///
    /// Partial seconds round up, and a lifetime never drops below one second.
    pub fn with_lifetimes(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_duration = whole_secs(access);
        self.refresh_duration = whole_secs(refresh);
        self
    }

    pub fn access_duration(&self) -> u64 {
        self.access_duration
    }

    pub fn refresh_duration(&self) -> u64 {
        self.refresh_duration
    }

    pub fn issue_access(&self, principal: &Principal) -> Result<IssuedToken, JwtError> {
        self.issue_access_at(principal, unix_now()?)
    }

    pub fn issue_refresh(&self, principal: &Principal) -> Result<IssuedToken, JwtError> {
        self.issue_refresh_at(principal, unix_now()?)
    }

    pub fn verify_access(&self, token: &str) -> Result<Principal, JwtError> {
        self.verify_access_at(token, unix_now()?)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Principal, JwtError> {
        self.verify_refresh_at(token, unix_now()?)
    }

    /// Issue an access token as if the current time were `now`.
    pub fn issue_access_at(
        &self,
        principal: &Principal,
        now: u64,
    ) -> Result<IssuedToken, JwtError> {
        self.issue(TokenKind::Access, principal, now)
    }

    /// Issue a refresh token as if the current time were `now`.
    pub fn issue_refresh_at(
        &self,
        principal: &Principal,
        now: u64,
    ) -> Result<IssuedToken, JwtError> {
        self.issue(TokenKind::Refresh, principal, now)
    }

    /// Verify an access token against the clock value `now`.
    pub fn verify_access_at(&self, token: &str, now: u64) -> Result<Principal, JwtError> {
        self.verify(TokenKind::Access, token, now).map(|claims| claims.sub)
    }

    /// Verify a refresh token against the clock value `now`.
    pub fn verify_refresh_at(&self, token: &str, now: u64) -> Result<Principal, JwtError> {
        self.verify(TokenKind::Refresh, token, now).map(|claims| claims.sub)
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn duration(&self, kind: TokenKind) -> u64 {
        match kind {
            TokenKind::Access => self.access_duration,
            TokenKind::Refresh => self.refresh_duration,
        }
    }

    fn issue(
        &self,
        kind: TokenKind,
        principal: &Principal,
        now: u64,
    ) -> Result<IssuedToken, JwtError> {
        let duration = self.duration(kind);
        let exp = now
            .checked_add(duration)
            .ok_or(JwtError::LifetimeOverflow)?;

        let claims = Claims {
            sub: principal.clone(),
            kind,
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.keys(kind).encoding)
            .map_err(JwtError::Encoding)?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: exp,
            duration,
        })
    }

    fn verify(&self, kind: TokenKind, token: &str, now: u64) -> Result<Claims, JwtError> {
        // Expiry is checked below against `now` so that `exp == now` is rejected.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;

        let token_data =
            jsonwebtoken::decode::<Claims>(token, &self.keys(kind).decoding, &validation)
                .map_err(JwtError::Decoding)?;

        if token_data.claims.kind != kind {
            return Err(JwtError::WrongTokenType);
        }

        if token_data.claims.exp <= now {
            return Err(JwtError::Expired);
        }

        Ok(token_data.claims)
    }
}

fn whole_secs(duration: Duration) -> u64 {
    let partial = u64::from(duration.subsec_nanos() > 0);
    duration.as_secs().saturating_add(partial).max(1)
}

fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::TimeError)
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Malformed token or bad signature
    Decoding(jsonwebtoken::errors::Error),
    /// Correctly signed, but `exp` is not in the future
    Expired,
    /// Wrong token type (e.g., using refresh token as access token)
    WrongTokenType,
    /// System time error
    TimeError,
    /// Issue time plus lifetime does not fit in a timestamp
    LifetimeOverflow,
}

impl JwtError {
    /// True only for a well-formed, correctly signed token that has expired.
    pub fn is_expired(&self) -> bool {
        matches!(self, JwtError::Expired)
    }
}

impl fmt::Display for JwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::Expired => write!(f, "Token expired"),
            JwtError::WrongTokenType => write!(f, "Wrong token type"),
            JwtError::TimeError => write!(f, "System time error"),
            JwtError::LifetimeOverflow => write!(f, "Token lifetime overflows expiry timestamp"),
        }
    }
}

impl std::error::Error for JwtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JwtError::Encoding(e) | JwtError::Decoding(e) => Some(e),
            _ => None,
        }
    }
}
