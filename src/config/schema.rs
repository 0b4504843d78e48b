//! Configuration schema definitions

use serde::{Deserialize, Deserializer, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::auth::{session_ttl, AdminAccount};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub uploads: UploadConfig,
}

impl Config {
    /// Build a configuration from environment variables alone
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(host) = env::var("HOST") {
            config.server.host = host;
        }
        if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.server.port = port;
        }
        if let Ok(secret) = env::var("JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }
        config.auth.login_days = env::var("LOGIN_DAYS").ok().and_then(|d| d.trim().parse().ok());

        if let Ok(url) = env::var("DATABASE_URL") {
            config.store.kind = StoreKind::Postgres;
            config.store.url = Some(url);
        }
        if let Ok(table) = env::var("ADMIN_TABLE") {
            config.store.table = table;
        }
        if let Ok(dir) = env::var("UPLOAD_DIR") {
            config.uploads.dir = PathBuf::from(dir);
        }

        config
    }
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Requests running longer than this are aborted
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Session token configuration
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// HMAC signing secret; login fails with an internal error while empty
    #[serde(default)]
    pub jwt_secret: String,

    /// Session validity in days. Missing, zero, negative or unparsable means 7.
    #[serde(default, deserialize_with = "lenient_days")]
    pub login_days: Option<i64>,
}

impl AuthConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        session_ttl(self.login_days)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("login_days", &self.login_days)
            .finish()
    }
}

/// Accept `login_days = 3` as well as `login_days = "3"` (as produced by env interpolation)
fn lenient_days<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(days)) => Some(days),
        Some(Raw::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

/// Credential store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Accounts listed in the configuration file
    #[default]
    Static,
    /// `admin_users`-style table in PostgreSQL
    Postgres,
}

/// Credential store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,

    /// Connection string for the postgres store
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default)]
    pub accounts: Vec<AdminAccount>,
}

fn default_table() -> String {
    "admin_users".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            url: None,
            table: default_table(),
            accounts: Vec::new(),
        }
    }
}

/// Upload storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Root of the per-identity upload tree, also served under /images
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./scripts/src_imgs")
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
        }
    }
}
