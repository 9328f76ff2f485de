//! Home page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::{PageInfo, Paginator};

use super::views::{ChoiceView, NavContext, ProductView, page_context, product_views};
use crate::error::{JsonError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::session_keys;
use crate::state::AppState;

/// Product type tiles shown on the home page.
const PRODUCT_TYPE_TILES: i64 = 6;

/// Products per page of the main grid.
pub const PRODUCTS_PER_PAGE: u32 = 16;

/// Size of the "cheapest" strip.
const CHEAPEST_COUNT: i64 = 10;

/// Size of the "latest" strip.
const LATEST_COUNT: i64 = 12;

/// `?page=` parameter. Kept as a string so bad values fall back instead of 400.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub nav: NavContext,
    pub product_types: Vec<ChoiceView>,
    pub products: Vec<ProductView>,
    pub page: PageInfo,
    pub cheapest: Vec<ProductView>,
    pub latest: Vec<ProductView>,
    /// First home visit of this session.
    pub show_alert: bool,
}

/// Display the home page.
#[instrument(skip(state, session, customer))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Query(query): Query<PageQuery>,
) -> Result<HomeTemplate> {
    let (nav, _cart) = page_context(&state, &session, customer.as_ref()).await?;
    let catalog = state.catalog();

    let product_types = catalog.product_types(Some(PRODUCT_TYPE_TILES)).await?;
    let total = catalog.count_products().await?;
    let page = Paginator::new(total, PRODUCTS_PER_PAGE).page(query.page.as_deref());
    let products = catalog.products_page(page.offset, page.limit).await?;
    let cheapest = catalog.cheapest(CHEAPEST_COUNT).await?;
    let latest = catalog.latest(LATEST_COUNT).await?;

    let show_alert = !session
        .get::<bool>(session_keys::ALERT_SHOWN)
        .await?
        .unwrap_or(false);
    if show_alert {
        session.insert(session_keys::ALERT_SHOWN, true).await?;
    }

    Ok(HomeTemplate {
        nav,
        product_types: product_types.iter().map(ChoiceView::from).collect(),
        products: product_views(&products),
        page,
        cheapest: product_views(&cheapest),
        latest: product_views(&latest),
        show_alert,
    })
}

/// Forget that the welcome alert was shown.
///
/// `GET|POST /clear-alert-session/`
#[instrument(skip(session))]
pub async fn clear_alert_session(session: Session) -> std::result::Result<impl IntoResponse, JsonError> {
    session.remove_value(session_keys::ALERT_SHOWN).await?;
    Ok(Json(serde_json::json!({ "status": "success" })))
}
