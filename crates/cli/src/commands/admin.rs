//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! mk-cli admin create -e admin@example.com -n "Admin Name" -r super_admin -p "a long passphrase"
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_PASSWORD` - Used when `-p` is omitted

use marketstall_admin::db;
use marketstall_admin::services::{AdminAuthError, AdminAuthService};
use marketstall_core::{AdminRole, AdminUserId};
use thiserror::Error;

use super::{ConnectError, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Connection settings are missing.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    /// Account could not be created.
    #[error("{0}")]
    Auth(#[from] AdminAuthError),
}

/// Parse a role name given on the command line.
fn parse_role(role: &str) -> Result<AdminRole, AdminError> {
    role.trim()
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))
}

/// Create a new admin user.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
/// * `role` - Admin's role (`super_admin`, `admin`, or `viewer`)
/// * `password` - Login password
///
/// # Errors
///
/// Returns an error for an unknown role, invalid input, a taken email, or a
/// database failure.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<AdminUserId, AdminError> {
    let role = parse_role(role)?;

    tracing::info!("Connecting to admin database...");
    let pool = db::create_pool(&database_url("ADMIN_DATABASE_URL")?).await?;

    tracing::info!("Creating admin user: {} ({})", email, role);
    let user = AdminAuthService::new(&pool)
        .create_admin(email, name, role, password)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_by_name() {
        assert!(matches!(parse_role("viewer"), Ok(AdminRole::Viewer)));
        assert!(matches!(parse_role(" super_admin "), Ok(AdminRole::SuperAdmin)));
        assert!(matches!(parse_role("owner"), Err(AdminError::InvalidRole(_))));
    }
}
