//! CLI command implementations

use anyhow::Result;
use std::fs;

use crate::auth::{session_ttl, SessionCodec};
use crate::cli::{error, info, success, warn};
use crate::config::{self, loader::CONFIG_FILENAME, Config};

/// Initialize a new admin-gate.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set JWT_SECRET and ADMIN_PASSWORD, then run 'admin-gate serve'");

    Ok(())
}

/// Run the API server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    crate::api::run_server(config, &host, port).await?;
    Ok(())
}

/// Mint a session token for `username`
pub async fn token(username: &str, days: Option<i64>) -> Result<()> {
    let config = load_config()?;
    let codec = SessionCodec::new(config.auth.jwt_secret.as_bytes());
    let ttl = session_ttl(days.or(config.auth.login_days));

    match codec.issue(username, ttl) {
        Ok(token) => {
            success(&format!("Token for '{}' valid for {} hours", username, ttl.num_hours()));
            println!("{}", token);
            Ok(())
        }
        Err(e) => {
            error(&format!("Failed to issue token: {}", e));
            Err(e.into())
        }
    }
}

/// Verify a session token and show its claims
pub async fn verify(token: &str) -> Result<()> {
    let config = load_config()?;
    let codec = SessionCodec::new(config.auth.jwt_secret.as_bytes());

    match codec.decode(token) {
        Ok(claims) => {
            let expires = chrono::DateTime::from_timestamp(claims.expiry, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| claims.expiry.to_string());
            success(&format!("Valid session for '{}'", claims.subject));
            info(&format!("Expires at {}", expires));
            Ok(())
        }
        Err(e) => {
            error(&e.to_string());
            Err(e.into())
        }
    }
}

fn load_config() -> Result<Config> {
    Ok(config::load_config()?)
}
