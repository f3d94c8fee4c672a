//! Username/password verification.
//!
//! Login only needs a yes/no answer for a username and password, so the
//! store is a trait. `StaticCredentials` is the in-memory implementation used
//! by the binary.

use std::collections::HashMap;
use std::path::Path;

/// Credential verification capability used by the login endpoint.
pub trait CredentialStore: Send + Sync {
    /// Return true when `password` matches the stored password for `username`.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// In-memory username to password map.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn from_pairs<I, U, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: pairs
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
        }
    }

    /// Parse a JSON object mapping usernames to passwords.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let users: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { users })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CredentialsError> {
        let content = std::fs::read_to_string(path).map_err(CredentialsError::Io)?;
        Self::from_json_str(&content).map_err(CredentialsError::Parse)
    }

    /// Two fixed demo accounts for local development.
    pub fn demo() -> Self {
        Self::from_pairs([("user1", "password123"), ("user2", "securepassword")])
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialStore for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|stored| stored == password)
    }
}

/// Errors loading a credentials file.
#[derive(Debug)]
pub enum CredentialsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialsError::Io(e) => write!(f, "Failed to read credentials file: {}", e),
            CredentialsError::Parse(e) => write!(f, "Invalid credentials file: {}", e),
        }
    }
}

impl std::error::Error for CredentialsError {}
