//! Authentication and session verification

pub mod jwt;
pub mod login;
pub mod middleware;
pub mod models;

pub use jwt::{session_ttl, system_clock, Clock, SessionClaims, SessionCodec, TokenError};
pub use login::LoginService;
pub use middleware::{authenticate, bearer_token, require_session};
pub use models::{AdminAccount, LoginOutcome, VerifiedIdentity};
