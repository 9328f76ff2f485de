//! Order listing rows.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use marketstall_core::{Money, OrderId, OrderStatus};

/// An order with its customer and aggregated totals.
#[derive(Debug, Clone, FromRow)]
pub struct AdminOrderRow {
    pub id: OrderId,
    pub date_ordered: DateTime<Utc>,
    pub complete: Option<bool>,
    pub transaction_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub item_count: i64,
    pub total: Money,
}

impl AdminOrderRow {
    /// Order status derived from the `complete` flag.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_complete(self.complete)
    }
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Default, FromRow)]
pub struct OrderStats {
    pub completed_orders: i64,
    pub open_orders: i64,
    pub revenue: Money,
}
