//! Admin Gate - administrator login, session tokens and per-user uploads
//!
//! This is the library interface for Admin Gate: the token codec, login
//! service, session middleware and upload gateway, plus the router that
//! wires them into an HTTP service.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;
pub mod upload;

pub use config::Config;
pub use error::Error;
