//! Order history.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::{DateTime, Utc};
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::{Money, OrderStatus};

use super::views::{NavContext, page_context};
use crate::db::orders;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::OrderSummaryRow;
use crate::state::AppState;

/// One order in the history table.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub date_ordered: DateTime<Utc>,
    pub status: OrderStatus,
    pub transaction_id: String,
    pub item_count: i64,
    pub total: Money,
}

impl From<OrderSummaryRow> for OrderView {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            id: row.id.as_i32(),
            date_ordered: row.date_ordered,
            status: OrderStatus::from_complete(row.complete),
            transaction_id: row.transaction_id.unwrap_or_default(),
            item_count: row.item_count,
            total: row.total,
        }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders.html")]
pub struct OrdersTemplate {
    pub nav: NavContext,
    pub orders: Vec<OrderView>,
}

/// Display the logged-in customer's orders, newest first.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.customer_id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<OrdersTemplate> {
    let (nav, _cart) = page_context(&state, &session, Some(&customer)).await?;
    let rows = orders::history(state.pool(), customer.customer_id).await?;

    Ok(OrdersTemplate {
        nav,
        orders: rows.into_iter().map(OrderView::from).collect(),
    })
}
