//! CLI interface for Admin Gate

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "admin-gate")]
#[command(version)]
#[command(about = "Administrator login, sessions and uploads", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default admin-gate.toml in the current directory
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long, env = "HOST")]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Mint a session token for a username without a password check
    Token {
        /// Subject of the token
        username: String,

        /// Validity in days (defaults to the configured login days)
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Check a session token and print its subject and expiry
    Verify {
        /// The session token
        token: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_token_command() {
        let cli = Cli::try_parse_from(["admin-gate", "token", "alice", "--days", "3"]).unwrap();
        match cli.command {
            Commands::Token { username, days } => {
                assert_eq!(username, "alice");
                assert_eq!(days, Some(3));
            }
            _ => panic!("Expected token command"),
        }
    }
}
