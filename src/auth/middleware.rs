//! Session verification middleware and extractors

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::auth::jwt::SessionCodec;
use crate::auth::models::VerifiedIdentity;
use crate::error::{Error, Result};

/// Pull the bearer token out of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers.get(AUTHORIZATION).ok_or(Error::MissingCredential)?;
    let value = value.to_str().map_err(|_| Error::MalformedCredential)?;
    value
        .strip_prefix("Bearer ")
        .ok_or(Error::MalformedCredential)
}

/// Verify the request's bearer token and return the identity it carries
pub fn authenticate(codec: &SessionCodec, headers: &HeaderMap) -> Result<VerifiedIdentity> {
    let token = bearer_token(headers)?;
    let username = codec.verify(token)?;
    Ok(VerifiedIdentity(username))
}

/// Middleware for routes that require a verified session
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let identity = authenticate(&state.codec, req.headers()).inspect_err(|e| {
        tracing::debug!(path = %req.uri().path(), reason = %e, "Session rejected");
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for VerifiedIdentity
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<VerifiedIdentity>()
            .cloned()
            .ok_or(Error::MissingCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenError;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header() {
        let codec = SessionCodec::new(b"secret".to_vec());
        assert!(matches!(
            authenticate(&codec, &HeaderMap::new()),
            Err(Error::MissingCredential)
        ));
    }

    #[test]
    fn test_raw_token_without_prefix_is_malformed() {
        let codec = SessionCodec::new(b"secret".to_vec());
        let token = codec.issue("admin", Duration::hours(1)).unwrap();
        assert!(matches!(
            authenticate(&codec, &headers(&token)),
            Err(Error::MalformedCredential)
        ));
    }

    #[test]
    fn test_valid_bearer_token() {
        let codec = SessionCodec::new(b"secret".to_vec());
        let token = codec.issue("admin", Duration::hours(1)).unwrap();
        let identity = authenticate(&codec, &headers(&format!("Bearer {}", token))).unwrap();
        assert_eq!(identity.username(), "admin");
    }

    #[test]
    fn test_codec_errors_pass_through() {
        let codec = SessionCodec::new(b"secret".to_vec());
        assert!(matches!(
            authenticate(&codec, &headers("Bearer garbage")),
            Err(Error::Token(TokenError::Malformed))
        ));
    }
}
