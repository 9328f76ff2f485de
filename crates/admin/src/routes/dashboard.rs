//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use tower_sessions::Session;
use tracing::instrument;

use super::{AdminNav, admin_nav};
use crate::db::{CustomerRepository, OrderRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{AdminOrderRow, ChoiceKind, OrderStats};
use crate::state::AppState;

/// Orders shown in the recent list.
const RECENT_ORDERS: i64 = 5;

/// Dashboard metrics.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub orders: OrderStats,
    pub products: i64,
    pub customers: i64,
    pub categories: usize,
    pub product_types: usize,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub nav: AdminNav,
    pub currency: String,
    pub metrics: DashboardMetrics,
    /// Most recent orders.
    pub orders: Vec<AdminOrderRow>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Dashboard page handler.
///
/// GET /
#[instrument(skip(admin, state, session))]
async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<DashboardTemplate> {
    let orders = OrderRepository::new(state.pool());
    let catalog = state.catalog();
    let customers = CustomerRepository::new(state.pool());

    let (stats, recent_orders, products, customer_count, categories, product_types) = tokio::try_join!(
        orders.stats(),
        orders.list(0, RECENT_ORDERS),
        catalog.product_total(),
        customers.count(),
        catalog.list_choices(ChoiceKind::Category),
        catalog.list_choices(ChoiceKind::ProductType),
    )?;

    Ok(DashboardTemplate {
        nav: admin_nav(&session, &admin, "/").await?,
        currency: state.currency().to_string(),
        metrics: DashboardMetrics {
            orders: stats,
            products,
            customers: customer_count,
            categories: categories.len(),
            product_types: product_types.len(),
        },
        orders: recent_orders,
    })
}
