//! Order line and order history rows.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use marketstall_core::{CartLine, Money, OrderId, ProductId};

/// An order item joined with the product fields needed for totals.
#[derive(Debug, Clone, FromRow)]
pub struct OrderLineRow {
    pub product_id: ProductId,
    pub name: Option<String>,
    pub price: Money,
    pub shipping: Money,
    pub digital: Option<bool>,
    pub image_url: Option<String>,
    pub quantity: Option<i32>,
}

impl From<OrderLineRow> for CartLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name.unwrap_or_default(),
            price: row.price,
            shipping: row.shipping,
            digital: row.digital.unwrap_or(false),
            quantity: row
                .quantity
                .and_then(|q| u32::try_from(q).ok())
                .unwrap_or(0),
            image_url: row.image_url.unwrap_or_default(),
        }
    }
}

/// An order with aggregate totals, for order history listings.
#[derive(Debug, Clone, FromRow)]
pub struct OrderSummaryRow {
    pub id: OrderId,
    pub customer_name: Option<String>,
    pub date_ordered: DateTime<Utc>,
    pub complete: Option<bool>,
    pub transaction_id: Option<String>,
    pub item_count: i64,
    pub total: Money,
}
