//! Authentication models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrator record as held by the credential store
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminAccount {
    /// Unique username, the store key
    pub username: String,
    /// Stored secret, compared as an opaque value
    pub password: String,
    /// Display name
    #[serde(default)]
    pub full_name: String,
}

impl AdminAccount {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            full_name: full_name.into(),
        }
    }
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .finish()
    }
}

/// Identity extracted from a verified session token, scoped to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity(pub String);

impl VerifiedIdentity {
    pub fn username(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerifiedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Login credentials
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginOutcome {
    pub full_name: String,
    pub session_token: String,
}

/// Login response body
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub outcome: LoginOutcome,
    pub message: String,
}

/// Session verification request
#[derive(Debug, Deserialize)]
pub struct VerifySessionRequest {
    pub session_token: String,
}

/// Session verification response
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifySessionResponse {
    pub valid: bool,
    pub message: String,
}
