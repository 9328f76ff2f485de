//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by commands that need a database connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Neither the specific nor the generic variable is set.
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),
}

/// Read `var`, falling back to `DATABASE_URL`.
///
/// Loads `.env` first so the CLI sees the same settings as the servers.
pub fn database_url(var: &'static str) -> Result<SecretString, ConnectError> {
    dotenvy::dotenv().ok();
    std::env::var(var)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingEnvVar(var))
}
