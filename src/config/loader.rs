//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "admin-gate.toml";

/// Load configuration from admin-gate.toml, falling back to the environment
/// when no file is found
pub fn load_config() -> Result<Config> {
    match find_config_file() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loading configuration file");
            load_config_from_path(&path)
        }
        Err(Error::ConfigNotFound) => {
            tracing::debug!("No {} found, using environment", CONFIG_FILENAME);
            Ok(Config::from_env())
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let content = interpolate_env_vars(&content);
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // This regex is a compile-time constant, panicking is acceptable here
    // as it indicates a programming error in the codebase, not a runtime issue
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Admin Gate Configuration

[server]
host = "0.0.0.0"
port = 8080
request_timeout_secs = 30
max_upload_bytes = 20971520

[auth]
jwt_secret = "${JWT_SECRET}"
# Session validity in days; missing, zero or negative means 7
login_days = "${LOGIN_DAYS:-7}"

[store]
kind = "static"  # or "postgres"
# url = "${DATABASE_URL}"
# table = "admin_users"

[[store.accounts]]
username = "admin"
password = "${ADMIN_PASSWORD:-change-me}"
full_name = "Admin User"

[uploads]
dir = "./scripts/src_imgs"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_interpolation() {
        env::set_var("ADMIN_GATE_TEST_VAR", "hello");
        let content = "value = \"${ADMIN_GATE_TEST_VAR}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"hello\"");
        env::remove_var("ADMIN_GATE_TEST_VAR");
    }

    #[test]
    fn test_env_interpolation_with_default() {
        let content = "value = \"${NONEXISTENT_VAR:-default_value}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"default_value\"");
    }

    #[test]
    fn test_default_config_parses() {
        let content = interpolate_env_vars(default_config_content());
        let config: Config = toml::from_str(&content).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.accounts[0].username, "admin");
    }

    #[test]
    fn test_load_config_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[auth]\njwt_secret = \"s3cret\"\nlogin_days = 2\n").unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.login_days, Some(2));
    }

    #[test]
    fn test_unreadable_config_is_io_error() {
        // A directory exists at the path but cannot be read as a file
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::create_dir(&path).unwrap();

        assert!(matches!(load_config_from_path(&path), Err(Error::Io(_))));
    }
}
