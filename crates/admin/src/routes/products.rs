//! Product management: listing, create, edit and delete.
//!
//! Creating a product announces it to every customer by email. The mail is
//! sent from a background task so the redirect does not wait on SMTP.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::{PageInfo, Paginator, ProductId};

use super::{AdminNav, admin_nav, set_flash, unprocessable};
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{FieldErrors, ProductForm, duplicate_name_message};
use crate::middleware::{RequireAdminAuth, RequireCatalogWriter};
use crate::models::{AdminProduct, Choice, ChoiceKind, CurrentAdmin, ProductInput};
use crate::services::email::{NewProductEmail, notify_product_added};
use crate::state::AppState;

/// Products per listing page.
const PRODUCTS_PER_PAGE: u32 = 25;

/// Menu section of every product page.
const SECTION: &str = "/products";

/// Listing query string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductListQuery {
    pub q: String,
    pub page: Option<String>,
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub nav: AdminNav,
    pub currency: String,
    pub query: String,
    /// Query string prefix that keeps the search across page links.
    pub page_query: String,
    pub total: u64,
    pub page: PageInfo,
    pub products: Vec<AdminProduct>,
}

/// New and edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub nav: AdminNav,
    pub heading: String,
    pub action: String,
    pub product_id: Option<ProductId>,
    pub form: ProductForm,
    pub errors: FieldErrors,
    pub product_types: Vec<Choice>,
    pub categories: Vec<Choice>,
}

/// Delete confirmation template, shared with categories and product types.
#[derive(Template, WebTemplate)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub nav: AdminNav,
    pub label: String,
    pub name: String,
    pub action: String,
    pub cancel_url: String,
    /// Note on what happens to related rows.
    pub consequence: Option<String>,
}

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/new", get(new_form))
        .route("/products/{id}", axum::routing::post(update))
        .route("/products/{id}/edit", get(edit_form))
        .route("/products/{id}/delete", get(confirm_delete).post(delete))
}

/// Product listing, newest first.
///
/// GET /products
#[instrument(skip(admin, state, session))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductListQuery>,
) -> Result<ProductsTemplate> {
    let catalog = state.catalog();
    let search = Some(query.q.trim()).filter(|q| !q.is_empty());

    let total = catalog.count_products(search).await?;
    let page = Paginator::new(total, PRODUCTS_PER_PAGE).page(query.page.as_deref());
    let products = catalog.list_products(search, page.offset, page.limit).await?;

    Ok(ProductsTemplate {
        nav: admin_nav(&session, &admin, SECTION).await?,
        currency: state.currency().to_string(),
        query: query.q.trim().to_string(),
        page_query: search_query(search),
        total,
        page,
        products,
    })
}

/// `q=...&` for page links, or nothing without a search.
fn search_query(search: Option<&str>) -> String {
    search.map_or_else(String::new, |q| {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", q)
            .finish();
        format!("{encoded}&")
    })
}

/// Select options for the product form.
async fn form_choices(state: &AppState) -> Result<(Vec<Choice>, Vec<Choice>)> {
    let catalog = state.catalog();
    let product_types = catalog.list_choices(ChoiceKind::ProductType).await?;
    let categories = catalog.list_choices(ChoiceKind::Category).await?;
    Ok((product_types, categories))
}

/// Render the product form.
async fn render_form(
    state: &AppState,
    session: &Session,
    admin: &CurrentAdmin,
    product_id: Option<ProductId>,
    form: ProductForm,
    errors: FieldErrors,
) -> Result<ProductFormTemplate> {
    let (product_types, categories) = form_choices(state).await?;
    let (heading, action) = product_id.map_or_else(
        || ("Add product".to_string(), "/products".to_string()),
        |id| (format!("Change product #{id}"), format!("/products/{id}")),
    );

    Ok(ProductFormTemplate {
        nav: admin_nav(session, admin, SECTION).await?,
        heading,
        action,
        product_id,
        form,
        errors,
        product_types,
        categories,
    })
}

/// Validate a submitted form, including the unique name check.
async fn validate_submission(
    state: &AppState,
    form: &ProductForm,
    exclude: Option<ProductId>,
) -> Result<std::result::Result<ProductInput, FieldErrors>> {
    let (product_types, categories) = form_choices(state).await?;
    let type_ids: Vec<i32> = product_types.iter().map(|c| c.id).collect();
    let category_ids: Vec<i32> = categories.iter().map(|c| c.id).collect();

    let input = match form.validate(&type_ids, &category_ids) {
        Ok(input) => input,
        Err(errors) => return Ok(Err(errors)),
    };

    if state.catalog().product_name_exists(&input.name, exclude).await? {
        let mut errors = FieldErrors::default();
        errors.add("name", duplicate_name_message("Product"));
        return Ok(Err(errors));
    }

    Ok(Ok(input))
}

/// Map a unique-index race to a form error.
fn conflict_errors(err: &RepositoryError) -> Option<FieldErrors> {
    matches!(err, RepositoryError::Conflict(_)).then(|| {
        let mut errors = FieldErrors::default();
        errors.add("name", duplicate_name_message("Product"));
        errors
    })
}

/// Blank product form.
///
/// GET /products/new
async fn new_form(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    session: Session,
) -> Result<ProductFormTemplate> {
    render_form(&state, &session, &admin, None, ProductForm::default(), FieldErrors::default()).await
}

/// Create a product and announce it.
///
/// POST /products
#[instrument(skip(admin, state, session, form), fields(admin_id = %admin.id))]
async fn create(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match validate_submission(&state, &form, None).await? {
        Ok(input) => input,
        Err(errors) => {
            let page = render_form(&state, &session, &admin, None, form, errors).await?;
            return Ok(unprocessable(page));
        }
    };

    let product = match state.catalog().create_product(&input).await {
        Ok(product) => product,
        Err(e) => {
            let Some(errors) = conflict_errors(&e) else {
                return Err(e.into());
            };
            let page = render_form(&state, &session, &admin, None, form, errors).await?;
            return Ok(unprocessable(page));
        }
    };
    tracing::info!(product_id = %product.id, "product created");

    let announcement = NewProductEmail::for_product(
        &product,
        &state.config().storefront_url,
        state.currency(),
    );
    tokio::spawn(notify_product_added(
        state.email().cloned(),
        state.pool().clone(),
        announcement,
    ));

    set_flash(
        &session,
        format!("The product \u{201c}{}\u{201d} was added successfully.", product.display_name()),
    )
    .await?;
    Ok(Redirect::to(SECTION).into_response())
}

/// Load a product or 404.
async fn find_product(state: &AppState, id: ProductId) -> Result<AdminProduct> {
    state
        .catalog()
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Product form filled with the stored values.
///
/// GET /products/{id}/edit
async fn edit_form(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<ProductFormTemplate> {
    let product = find_product(&state, id).await?;
    render_form(
        &state,
        &session,
        &admin,
        Some(id),
        ProductForm::from(&product),
        FieldErrors::default(),
    )
    .await
}

/// Save an edited product.
///
/// POST /products/{id}
#[instrument(skip(admin, state, session, form), fields(admin_id = %admin.id))]
async fn update(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    find_product(&state, id).await?;

    let input = match validate_submission(&state, &form, Some(id)).await? {
        Ok(input) => input,
        Err(errors) => {
            let page = render_form(&state, &session, &admin, Some(id), form, errors).await?;
            return Ok(unprocessable(page));
        }
    };

    if let Err(e) = state.catalog().update_product(id, &input).await {
        let Some(errors) = conflict_errors(&e) else {
            return Err(e.into());
        };
        let page = render_form(&state, &session, &admin, Some(id), form, errors).await?;
        return Ok(unprocessable(page));
    }
    tracing::info!(product_id = %id, "product updated");

    set_flash(
        &session,
        format!("The product \u{201c}{}\u{201d} was changed successfully.", input.name),
    )
    .await?;
    Ok(Redirect::to(SECTION).into_response())
}

/// Ask before deleting.
///
/// GET /products/{id}/delete
async fn confirm_delete(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<ConfirmDeleteTemplate> {
    let product = find_product(&state, id).await?;
    Ok(ConfirmDeleteTemplate {
        nav: admin_nav(&session, &admin, SECTION).await?,
        label: "product".to_string(),
        name: product.display_name(),
        action: format!("/products/{id}/delete"),
        cancel_url: format!("/products/{id}/edit"),
        consequence: Some("Orders that contain it keep their line items without a product.".to_string()),
    })
}

/// Delete a product.
///
/// POST /products/{id}/delete
#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
async fn delete(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let product = find_product(&state, id).await?;
    state.catalog().delete_product(id).await?;
    tracing::info!(product_id = %id, "product deleted");

    set_flash(
        &session,
        format!("The product \u{201c}{}\u{201d} was deleted successfully.", product.display_name()),
    )
    .await?;
    Ok(Redirect::to(SECTION).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketstall_core::{AdminRole, AdminUserId, Email};

    use super::*;
    use crate::routes::AdminUserView;

    fn nav(role: AdminRole) -> AdminNav {
        let admin = CurrentAdmin {
            id: AdminUserId::new(3),
            email: Email::parse("stock@shop.test").unwrap(),
            name: "Stock".to_string(),
            role,
        };
        AdminNav {
            admin_user: AdminUserView::from(&admin),
            current_path: SECTION,
            flash: Some("The product \u{201c}Garri\u{201d} was added successfully.".to_string()),
        }
    }

    #[test]
    fn form_shows_field_errors_and_keeps_input() {
        let mut errors = FieldErrors::default();
        errors.add("name", duplicate_name_message("Product"));
        let form = ProductForm {
            name: "Garri".to_string(),
            price: "abc".to_string(),
            ..ProductForm::default()
        };

        let html = ProductFormTemplate {
            nav: nav(AdminRole::Admin),
            heading: "Add product".to_string(),
            action: "/products".to_string(),
            product_id: None,
            form,
            errors,
            product_types: Vec::new(),
            categories: Vec::new(),
        }
        .render()
        .unwrap();

        assert!(html.contains("Product with this Name already exists."));
        assert!(html.contains("value=\"Garri\""));
        assert!(html.contains("value=\"abc\""));
        assert!(html.contains("Garri") && html.contains("added successfully"));
    }

    #[test]
    fn viewer_listing_has_no_add_button() {
        let html = ProductsTemplate {
            nav: nav(AdminRole::Viewer),
            currency: "\u{20a6}".to_string(),
            query: String::new(),
            page_query: String::new(),
            total: 0,
            page: Paginator::new(0, PRODUCTS_PER_PAGE).page(None),
            products: Vec::new(),
        }
        .render()
        .unwrap();

        assert!(html.contains("No products yet."));
        assert!(!html.contains("/products/new"));
    }

    #[test]
    fn page_links_keep_the_search() {
        assert_eq!(search_query(None), "");
        assert_eq!(search_query(Some("palm oil & co")), "q=palm+oil+%26+co&");
    }

    #[test]
    fn only_unique_conflicts_become_form_errors() {
        let errors = conflict_errors(&RepositoryError::Conflict("product already exists".to_string()));
        assert_eq!(
            errors.as_ref().and_then(|e| e.get("name")),
            Some("Product with this Name already exists.")
        );
        assert!(conflict_errors(&RepositoryError::NotFound).is_none());
    }
}
