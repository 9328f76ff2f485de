//! Storefront accounts and customers.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};

use marketstall_core::{Email, UserId};

use super::RepositoryError;
use crate::models::{Customer, User};

#[derive(Debug, sqlx::FromRow)]
struct UserLoginRow {
    id: UserId,
    email: String,
    created_at: DateTime<Utc>,
    password_hash: String,
}

/// Repository for account lookups.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find an account and its password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_login(&self, email: &Email) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserLoginRow>(
            "SELECT id, email, created_at, password_hash FROM store.users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| {
            (
                User {
                    id: r.id,
                    email: r.email,
                    created_at: r.created_at,
                },
                r.password_hash,
            )
        }))
    }

    /// The customer owned by an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn customer_for_user(&self, user_id: UserId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, Customer>(
            "SELECT id, user_id, name, phone, email FROM store.customers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }
}

/// Create an account and its customer row.
///
/// Run inside a transaction so a failed customer insert leaves no orphan account.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the email is already registered.
/// Returns `RepositoryError::Database` for other failures.
pub async fn create_account(
    conn: &mut PgConnection,
    email: &Email,
    name: &str,
    password_hash: &str,
) -> Result<(User, Customer), RepositoryError> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO store.users (email, password_hash) VALUES ($1, $2) \
         RETURNING id, email, created_at",
    )
    .bind(email.as_str())
    .bind(password_hash)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RepositoryError::from_unique(e, "account"))?;

    let customer = sqlx::query_as::<_, Customer>(
        "INSERT INTO store.customers (user_id, name, email) VALUES ($1, $2, $3) \
         RETURNING id, user_id, name, phone, email",
    )
    .bind(user.id)
    .bind(name)
    .bind(email.as_str())
    .fetch_one(&mut *conn)
    .await?;

    Ok((user, customer))
}

/// Get or create the guest customer for `email`, setting its name.
///
/// Emails are matched ignoring case; the first spelling seen is kept.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn upsert_guest_customer<'e, E>(
    executor: E,
    email: &Email,
    name: &str,
) -> Result<Customer, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let customer = sqlx::query_as::<_, Customer>(
        "INSERT INTO store.customers (name, email) VALUES ($1, $2) \
         ON CONFLICT (lower(email)) WHERE user_id IS NULL DO UPDATE SET name = EXCLUDED.name \
         RETURNING id, user_id, name, phone, email",
    )
    .bind(name)
    .bind(email.as_str())
    .fetch_one(executor)
    .await?;

    Ok(customer)
}
