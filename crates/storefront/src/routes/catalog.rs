//! Filtered catalog and product search.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use tower_sessions::Session;
use tracing::instrument;

use super::views::{ChoiceView, NavContext, ProductView, page_context, product_views};
use crate::error::Result;
use crate::filters;
use crate::forms::{FieldErrors, ProductFilterForm, SearchForm};
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Filtered catalog template.
#[derive(Template, WebTemplate)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub nav: NavContext,
    pub form: ProductFilterForm,
    pub errors: FieldErrors,
    pub product_types: Vec<ChoiceView>,
    pub categories: Vec<ChoiceView>,
    pub products: Vec<ProductView>,
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub nav: NavContext,
    pub query: String,
    pub errors: FieldErrors,
    /// Whether a valid, non-empty query was run.
    pub searched: bool,
    pub results: Vec<ProductView>,
    pub products: Vec<ProductView>,
}

/// Display products matching the filter form.
///
/// `GET /categories/`
///
/// Invalid parameters re-render the form with errors and no product list.
#[instrument(skip(state, session, customer))]
pub async fn categories(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Query(form): Query<ProductFilterForm>,
) -> Result<CategoriesTemplate> {
    let (nav, _cart) = page_context(&state, &session, customer.as_ref()).await?;
    let catalog = state.catalog();

    let product_types = catalog.product_types(None).await?;
    let categories = catalog.categories().await?;

    let (products, errors) = match form.validate() {
        Ok(filter) => (catalog.filter_products(&filter).await?, FieldErrors::default()),
        Err(errors) => {
            tracing::debug!(?errors, "invalid catalog filter");
            (Vec::new(), errors)
        }
    };

    Ok(CategoriesTemplate {
        nav,
        form,
        errors,
        product_types: product_types.iter().map(ChoiceView::from).collect(),
        categories: categories.iter().map(ChoiceView::from).collect(),
        products: product_views(&products),
    })
}

/// Search products by name or description.
///
/// `GET /shop/?query=`
#[instrument(skip(state, session, customer))]
pub async fn shop(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Query(form): Query<SearchForm>,
) -> Result<ShopTemplate> {
    let (nav, _cart) = page_context(&state, &session, customer.as_ref()).await?;
    let catalog = state.catalog();

    let (results, errors, searched) = match form.validate() {
        Ok(Some(query)) => (catalog.search_products(query).await?, FieldErrors::default(), true),
        Ok(None) => (Vec::new(), FieldErrors::default(), false),
        Err(errors) => (Vec::new(), errors, false),
    };
    let products = catalog.all_products().await?;

    Ok(ShopTemplate {
        nav,
        query: form.query.trim().to_string(),
        errors,
        searched,
        results: product_views(&results),
        products: product_views(&products),
    })
}
