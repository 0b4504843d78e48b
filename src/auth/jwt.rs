//! Session token handling

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validity period used when none (or a non-positive one) is configured
pub const DEFAULT_LOGIN_DAYS: i64 = 7;

/// Upper bound on configured login days, keeps `exp` arithmetic in range
const MAX_LOGIN_DAYS: i64 = 36_500;

/// Algorithms accepted on verification. Tokens are always issued with HS256.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Source of the current time as Unix seconds
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Clock backed by the system time
pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp())
}

/// Resolve the configured login days into a session lifetime.
///
/// Absent, zero and negative values all fall back to [`DEFAULT_LOGIN_DAYS`].
pub fn session_ttl(login_days: Option<i64>) -> Duration {
    let days = login_days
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_LOGIN_DAYS)
        .min(MAX_LOGIN_DAYS);
    Duration::hours(days * 24)
}

/// Token failures, each with a stable message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token - failed to parse token")]
    Malformed,

    #[error("Invalid token - signature verification failed")]
    BadSignature,

    #[error("Invalid token - required field missing or mistyped (username, exp)")]
    MissingClaim,

    #[error("Token expired, please sign in again")]
    Expired,

    #[error("Failed to sign session token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName => TokenError::BadSignature,
            // The header was already decoded, so a JSON failure here is the claim set
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => TokenError::MissingClaim,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Session claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Administrator username
    #[serde(rename = "username")]
    pub subject: String,
    /// Expiration time (Unix seconds)
    #[serde(rename = "exp")]
    pub expiry: i64,
}

/// Issues and verifies HMAC-signed session tokens
#[derive(Clone)]
pub struct SessionCodec {
    secret: Vec<u8>,
    clock: Clock,
    validation: Validation,
}

impl SessionCodec {
    /// Create a codec using the system clock
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self::with_clock(secret, system_clock())
    }

    /// Create a codec reading time from `clock`
    pub fn with_clock(secret: impl Into<Vec<u8>>, clock: Clock) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        // Presence, types and expiry are checked against SessionClaims and our own clock
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            secret: secret.into(),
            clock,
            validation,
        }
    }

    /// Current time according to this codec's clock
    pub fn now(&self) -> i64 {
        (self.clock)()
    }

    /// Sign a token for `subject` valid for `ttl`
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::Signing(
                "signing secret is not configured".to_string(),
            ));
        }

        let claims = SessionClaims {
            subject: subject.to_string(),
            expiry: self.now().saturating_add(ttl.num_seconds()),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return its subject
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.decode(token).map(|claims| claims.subject)
    }

    /// Verify a token and return its full claim set
    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;
        if !HMAC_ALGORITHMS.contains(&header.alg) || self.secret.is_empty() {
            return Err(TokenError::BadSignature);
        }

        let claims = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &self.validation,
        )?
        .claims;

        if claims.expiry <= self.now() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    const SECRET: &[u8] = b"test-secret";

    fn fixed_clock(start: i64) -> (Arc<AtomicI64>, Clock) {
        let now = Arc::new(AtomicI64::new(start));
        let handle = Arc::clone(&now);
        (now, Arc::new(move || handle.load(Ordering::SeqCst)))
    }

    #[test]
    fn test_issue_and_verify_token() {
        let codec = SessionCodec::new(SECRET);
        let token = codec.issue("admin", Duration::hours(1)).expect("Failed to issue token");

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(codec.verify(&token).unwrap(), "admin");
    }

    #[test]
    fn test_expiry_is_strict() {
        let (now, clock) = fixed_clock(1_000);
        let codec = SessionCodec::with_clock(SECRET, clock);
        let token = codec.issue("admin", Duration::seconds(60)).unwrap();

        now.store(1_059, Ordering::SeqCst);
        assert!(codec.verify(&token).is_ok());

        now.store(1_060, Ordering::SeqCst);
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));

        now.store(5_000, Ordering::SeqCst);
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_empty_secret_cannot_sign() {
        let codec = SessionCodec::new(Vec::new());
        assert!(matches!(
            codec.issue("admin", Duration::hours(1)),
            Err(TokenError::Signing(_))
        ));
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let token = SessionCodec::new(b"other-secret".to_vec())
            .issue("admin", Duration::hours(1))
            .unwrap();
        assert_eq!(
            SessionCodec::new(SECRET).verify(&token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = SessionCodec::new(SECRET);
        assert_eq!(codec.verify("not-a-jwt-token"), Err(TokenError::Malformed));
        assert_eq!(codec.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_session_ttl_defaults() {
        assert_eq!(session_ttl(None), Duration::days(7));
        assert_eq!(session_ttl(Some(0)), Duration::days(7));
        assert_eq!(session_ttl(Some(-4)), Duration::days(7));
        assert_eq!(session_ttl(Some(3)), Duration::hours(72));
    }

    #[test]
    fn test_claims_use_wire_names() {
        let claims = SessionClaims {
            subject: "admin".to_string(),
            expiry: 42,
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["username"], "admin");
        assert_eq!(value["exp"], 42);
    }
}
