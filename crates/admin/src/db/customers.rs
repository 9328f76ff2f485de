//! Customer reads for notifications and the dashboard.

use sqlx::PgPool;

use super::RepositoryError;

/// Repository for storefront customers.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every distinct, non-empty customer email on file, guests included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn notification_emails(&self) -> Result<Vec<String>, RepositoryError> {
        let emails = sqlx::query_scalar(
            "SELECT DISTINCT lower(btrim(email)) AS email \
             FROM store.customers \
             WHERE email IS NOT NULL AND btrim(email) <> '' \
             ORDER BY email",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(emails)
    }

    /// Number of customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM store.customers")
            .fetch_one(self.pool)
            .await?)
    }
}
