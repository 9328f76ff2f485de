//! Read-only order listing.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{AdminOrderRow, OrderStats};

/// Repository for order queries.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Number of orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store.orders")
            .fetch_one(self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// One page of orders, newest first, with customer and totals.
    ///
    /// Line totals are `price * quantity + shipping`; items whose product was
    /// deleted contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<AdminOrderRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminOrderRow>(
            "SELECT o.id, o.date_ordered, o.complete, o.transaction_id, \
                 c.name AS customer_name, c.email AS customer_email, \
                 COALESCE(SUM(oi.quantity), 0)::BIGINT AS item_count, \
                 COALESCE(SUM(p.price * oi.quantity + p.shipping), 0)::NUMERIC(20, 2) AS total \
             FROM store.orders o \
             LEFT JOIN store.customers c ON c.id = o.customer_id \
             LEFT JOIN store.order_items oi ON oi.order_id = o.id \
             LEFT JOIN store.products p ON p.id = oi.product_id \
             GROUP BY o.id, c.id \
             ORDER BY o.date_ordered DESC, o.id DESC \
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Totals over all orders for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let stats = sqlx::query_as::<_, OrderStats>(
            "SELECT \
                 COUNT(DISTINCT o.id) FILTER (WHERE o.complete) AS completed_orders, \
                 COUNT(DISTINCT o.id) FILTER (WHERE NOT COALESCE(o.complete, FALSE)) AS open_orders, \
                 COALESCE(SUM(p.price * oi.quantity + p.shipping) FILTER (WHERE o.complete), 0)::NUMERIC(20, 2) AS revenue \
             FROM store.orders o \
             LEFT JOIN store.order_items oi ON oi.order_id = o.id \
             LEFT JOIN store.products p ON p.id = oi.product_id",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }
}
