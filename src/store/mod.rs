//! Credential store adapters

mod postgres;

pub use postgres::PostgresCredentialStore;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::AdminAccount;
use crate::config::{StoreConfig, StoreKind};
use crate::error::{Error, Result};

/// Read-only lookup of administrator records by username
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the account stored under `username`, `Ok(None)` when absent
    async fn find_admin(&self, username: &str) -> Result<Option<AdminAccount>>;
}

/// Credential store held in memory, seeded from configuration
#[derive(Debug, Default, Clone)]
pub struct StaticCredentialStore {
    accounts: HashMap<String, AdminAccount>,
}

impl StaticCredentialStore {
    pub fn new(accounts: impl IntoIterator<Item = AdminAccount>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.username.clone(), account))
                .collect(),
        }
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn find_admin(&self, username: &str) -> Result<Option<AdminAccount>> {
        Ok(self.accounts.get(username).cloned())
    }
}

/// Build the store selected by configuration
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn CredentialStore>> {
    match config.kind {
        StoreKind::Static => {
            if config.accounts.is_empty() {
                tracing::warn!("Static credential store has no accounts; every login will fail");
            }
            Ok(Arc::new(StaticCredentialStore::new(config.accounts.clone())))
        }
        StoreKind::Postgres => {
            let url = config
                .url
                .as_deref()
                .filter(|url| !url.is_empty())
                .ok_or_else(|| Error::Config("store.url is required for the postgres store".to_string()))?;
            let store = PostgresCredentialStore::connect(url, &config.table).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_store_lookup() {
        let store = StaticCredentialStore::new(vec![AdminAccount::new(
            "admin",
            "correct",
            "Admin User",
        )]);

        let found = store.find_admin("admin").await.unwrap().unwrap();
        assert_eq!(found.full_name, "Admin User");
        assert!(store.find_admin("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_connect_static_from_config() {
        let config = StoreConfig {
            kind: StoreKind::Static,
            accounts: vec![AdminAccount::new("root", "pw", "Root")],
            ..StoreConfig::default()
        };
        let store = connect(&config).await.unwrap();
        assert!(store.find_admin("root").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_connect_postgres_requires_url() {
        let config = StoreConfig {
            kind: StoreKind::Postgres,
            url: None,
            ..StoreConfig::default()
        };
        assert!(matches!(connect(&config).await, Err(Error::Config(_))));
    }
}
