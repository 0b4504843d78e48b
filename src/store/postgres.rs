//! PostgreSQL-backed credential store

use async_trait::async_trait;
use regex::Regex;
use tokio_postgres::{Client, NoTls, Row};

use super::CredentialStore;
use crate::auth::AdminAccount;
use crate::error::{Error, Result};

/// Looks up `username`, `password` and `full_name` columns in an admin table
pub struct PostgresCredentialStore {
    client: Client,
    query: String,
}

impl PostgresCredentialStore {
    /// Connect and prepare lookups against `table`
    pub async fn connect(url: &str, table: &str) -> Result<Self> {
        let query = lookup_query(table)?;

        let (client, connection) = tokio_postgres::connect(url, NoTls).await?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        tracing::info!(table = %table, "Connected to credential store");

        Ok(Self { client, query })
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_admin(&self, username: &str) -> Result<Option<AdminAccount>> {
        let row = self.client.query_opt(&self.query, &[&username]).await?;
        row.as_ref().map(account_from_row).transpose()
    }
}

/// NULL or mistyped credential columns surface as `Error::Database`
fn account_from_row(row: &Row) -> Result<AdminAccount> {
    Ok(AdminAccount {
        username: row.try_get(0)?,
        password: row.try_get(1)?,
        full_name: row.try_get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}

/// Build the lookup statement; the table name can't be a bind parameter
fn lookup_query(table: &str) -> Result<String> {
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    if !re.is_match(table) {
        return Err(Error::Config(format!("Invalid admin table name: {}", table)));
    }

    Ok(format!(
        "SELECT username, password, full_name FROM {} WHERE username = $1",
        table
    ))
}
