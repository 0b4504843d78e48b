//! Administrator login

use std::sync::Arc;

use chrono::Duration;

use crate::auth::jwt::SessionCodec;
use crate::auth::models::LoginOutcome;
use crate::error::{Error, Result};
use crate::store::CredentialStore;

/// Compared against when the account doesn't exist, so both paths do the same work
const ABSENT_ACCOUNT_SECRET: &str = "\u{0}absent-account\u{0}";

/// Checks credentials against the store and issues session tokens
pub struct LoginService {
    store: Arc<dyn CredentialStore>,
    codec: Arc<SessionCodec>,
    ttl: Duration,
}

impl LoginService {
    pub fn new(store: Arc<dyn CredentialStore>, codec: Arc<SessionCodec>, ttl: Duration) -> Self {
        Self { store, codec, ttl }
    }

    /// Lifetime given to issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Authenticate `username` and issue a session token
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        if username.is_empty() {
            return Err(Error::Validation("username is required".to_string()));
        }
        if password.is_empty() {
            return Err(Error::Validation("password is required".to_string()));
        }

        let account = match self.store.find_admin(username).await {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!(username = %username, error = %e, "Credential store lookup failed");
                None
            }
        };

        let stored = account
            .as_ref()
            .map(|a| a.password.as_str())
            .unwrap_or(ABSENT_ACCOUNT_SECRET);
        let matches = constant_time_eq(password.as_bytes(), stored.as_bytes());

        let account = match account {
            Some(account) if matches => account,
            _ => {
                tracing::warn!(username = %username, "Login rejected");
                return Err(Error::AuthenticationFailed);
            }
        };

        let session_token = self
            .codec
            .issue(&account.username, self.ttl)
            .map_err(|e| Error::Internal(format!("Failed to generate session token: {}", e)))?;

        tracing::info!(username = %account.username, "Admin logged in");

        Ok(LoginOutcome {
            full_name: account.full_name,
            session_token,
        })
    }
}

/// Byte comparison whose running time depends only on the lengths involved
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = u8::from(a.len() != b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= x ^ y;
    }
    diff == 0
}
