//! Orders listing route handler.
//!
//! Orders are created by the storefront; the panel only reads them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::{PageInfo, Paginator};

use super::{AdminNav, admin_nav};
use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminOrderRow;
use crate::state::AppState;

/// Orders per listing page.
const ORDERS_PER_PAGE: u32 = 25;

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PaginationQuery {
    pub page: Option<String>,
}

/// Order listing template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub nav: AdminNav,
    pub currency: String,
    /// Extra query string for page links; orders have no search.
    pub page_query: String,
    pub total: u64,
    pub page: PageInfo,
    pub orders: Vec<AdminOrderRow>,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new().route("/orders", get(index))
}

/// Order listing, newest first.
///
/// GET /orders
#[instrument(skip(admin, state, session))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PaginationQuery>,
) -> Result<OrdersTemplate> {
    let orders = OrderRepository::new(state.pool());
    let total = orders.count().await?;
    let page = Paginator::new(total, ORDERS_PER_PAGE).page(query.page.as_deref());

    Ok(OrdersTemplate {
        nav: admin_nav(&session, &admin, "/orders").await?,
        currency: state.currency().to_string(),
        page_query: String::new(),
        total,
        page,
        orders: orders.list(page.offset, page.limit).await?,
    })
}
