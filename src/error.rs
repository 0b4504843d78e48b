//! Error types for Admin Gate

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::TokenError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Incorrect username or password")]
    AuthenticationFailed,

    #[error("Authorization header required")]
    MissingCredential,

    #[error("Bearer token required")]
    MalformedCredential,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Failed to store '{filename}': {source}")]
    Upload {
        filename: String,
        stored: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Config file not found. Run 'admin-gate init' first.")]
    ConfigNotFound,

    #[error("{0}")]
    Internal(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl Error {
    /// HTTP status this error maps to at the API boundary
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::AuthenticationFailed | Error::MissingCredential | Error::MalformedCredential => {
                StatusCode::UNAUTHORIZED
            }
            Error::Token(TokenError::Signing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Token(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is a session-layer rejection (reported with `valid: false`)
    fn is_session_rejection(&self) -> bool {
        match self {
            Error::MissingCredential | Error::MalformedCredential => true,
            Error::Token(err) => !matches!(err, TokenError::Signing(_)),
            _ => false,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.is_session_rejection() {
            let body = json!({ "valid": false, "message": self.to_string() });
            return (status, Json(body)).into_response();
        }

        let body = match &self {
            Error::Upload {
                filename,
                stored,
                source,
            } => {
                tracing::error!(file = %filename, error = %source, "Upload aborted");
                json!({
                    "image_urls": stored,
                    "message": format!("Failed to store file '{}'", filename),
                })
            }
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                // Detailed cause stays in the logs
                tracing::error!(error = %self, "Internal server error");
                json!({ "message": "Internal server error" })
            }
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
