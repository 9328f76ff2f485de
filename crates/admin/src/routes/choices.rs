//! Category and product type management.
//!
//! Both tables hold a name and an image URL, so one set of handlers serves
//! both. Each router carries its [`ChoiceKind`] as a request extension.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension, Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use super::products::ConfirmDeleteTemplate;
use super::{AdminNav, admin_nav, set_flash, unprocessable};
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{ChoiceForm, FieldErrors, duplicate_name_message};
use crate::middleware::{RequireAdminAuth, RequireCatalogWriter};
use crate::models::{Choice, ChoiceInput, ChoiceKind, CurrentAdmin};
use crate::state::AppState;

/// Listing template.
#[derive(Template, WebTemplate)]
#[template(path = "choices/index.html")]
pub struct ChoicesTemplate {
    pub nav: AdminNav,
    pub kind: ChoiceKind,
    pub choices: Vec<Choice>,
}

/// New and edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "choices/form.html")]
pub struct ChoiceFormTemplate {
    pub nav: AdminNav,
    pub kind: ChoiceKind,
    pub heading: String,
    pub action: String,
    pub choice_id: Option<i32>,
    pub form: ChoiceForm,
    pub errors: FieldErrors,
}

/// Build the router for one lookup table.
pub fn router(kind: ChoiceKind) -> Router<AppState> {
    let base = kind.path();
    Router::new()
        .route(base, get(index).post(create))
        .route(&format!("{base}/new"), get(new_form))
        .route(&format!("{base}/{{id}}"), post(update))
        .route(&format!("{base}/{{id}}/edit"), get(edit_form))
        .route(&format!("{base}/{{id}}/delete"), get(confirm_delete).post(delete))
        .layer(Extension(kind))
}

/// All rows with their product counts.
#[instrument(skip(admin, state, session))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Extension(kind): Extension<ChoiceKind>,
    session: Session,
) -> Result<ChoicesTemplate> {
    let choices = state.catalog().list_choices(kind).await?;
    Ok(ChoicesTemplate {
        nav: admin_nav(&session, &admin, kind.path()).await?,
        kind,
        choices,
    })
}

async fn render_form(
    session: &Session,
    admin: &CurrentAdmin,
    kind: ChoiceKind,
    choice_id: Option<i32>,
    form: ChoiceForm,
    errors: FieldErrors,
) -> Result<ChoiceFormTemplate> {
    let (heading, action) = choice_id.map_or_else(
        || (format!("Add {}", kind.label().to_lowercase()), kind.path().to_string()),
        |id| {
            (
                format!("Change {} #{id}", kind.label().to_lowercase()),
                format!("{}/{id}", kind.path()),
            )
        },
    );

    Ok(ChoiceFormTemplate {
        nav: admin_nav(session, admin, kind.path()).await?,
        kind,
        heading,
        action,
        choice_id,
        form,
        errors,
    })
}

fn duplicate_name(kind: ChoiceKind) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.add("name", duplicate_name_message(kind.label()));
    errors
}

/// Validate a submitted form, including the unique name check.
async fn validate_submission(
    state: &AppState,
    kind: ChoiceKind,
    form: &ChoiceForm,
    exclude: Option<i32>,
) -> Result<std::result::Result<ChoiceInput, FieldErrors>> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return Ok(Err(errors)),
    };
    if state.catalog().choice_name_exists(kind, &input.name, exclude).await? {
        return Ok(Err(duplicate_name(kind)));
    }
    Ok(Ok(input))
}

async fn find_choice(state: &AppState, kind: ChoiceKind, id: i32) -> Result<Choice> {
    state
        .catalog()
        .get_choice(kind, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {id}", kind.label().to_lowercase())))
}

async fn new_form(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    Extension(kind): Extension<ChoiceKind>,
    session: Session,
) -> Result<ChoiceFormTemplate> {
    render_form(&session, &admin, kind, None, ChoiceForm::default(), FieldErrors::default()).await
}

#[instrument(skip(admin, state, session, form), fields(admin_id = %admin.id))]
async fn create(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    Extension(kind): Extension<ChoiceKind>,
    session: Session,
    Form(form): Form<ChoiceForm>,
) -> Result<Response> {
    let input = match validate_submission(&state, kind, &form, None).await? {
        Ok(input) => input,
        Err(errors) => {
            let page = render_form(&session, &admin, kind, None, form, errors).await?;
            return Ok(unprocessable(page));
        }
    };

    match state.catalog().create_choice(kind, &input).await {
        Ok(id) => tracing::info!(id, kind = kind.label(), "lookup row created"),
        Err(RepositoryError::Conflict(_)) => {
            let page = render_form(&session, &admin, kind, None, form, duplicate_name(kind)).await?;
            return Ok(unprocessable(page));
        }
        Err(e) => return Err(e.into()),
    }

    set_flash(
        &session,
        format!(
            "The {} \u{201c}{}\u{201d} was added successfully.",
            kind.label().to_lowercase(),
            input.name
        ),
    )
    .await?;
    Ok(Redirect::to(kind.path()).into_response())
}

async fn edit_form(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    Extension(kind): Extension<ChoiceKind>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<ChoiceFormTemplate> {
    let choice = find_choice(&state, kind, id).await?;
    render_form(
        &session,
        &admin,
        kind,
        Some(id),
        ChoiceForm::from(&choice),
        FieldErrors::default(),
    )
    .await
}

#[instrument(skip(admin, state, session, form), fields(admin_id = %admin.id))]
async fn update(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    Extension(kind): Extension<ChoiceKind>,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<ChoiceForm>,
) -> Result<Response> {
    find_choice(&state, kind, id).await?;

    let input = match validate_submission(&state, kind, &form, Some(id)).await? {
        Ok(input) => input,
        Err(errors) => {
            let page = render_form(&session, &admin, kind, Some(id), form, errors).await?;
            return Ok(unprocessable(page));
        }
    };

    match state.catalog().update_choice(kind, id, &input).await {
        Ok(()) => tracing::info!(id, kind = kind.label(), "lookup row updated"),
        Err(RepositoryError::Conflict(_)) => {
            let page =
                render_form(&session, &admin, kind, Some(id), form, duplicate_name(kind)).await?;
            return Ok(unprocessable(page));
        }
        Err(e) => return Err(e.into()),
    }

    set_flash(
        &session,
        format!(
            "The {} \u{201c}{}\u{201d} was changed successfully.",
            kind.label().to_lowercase(),
            input.name
        ),
    )
    .await?;
    Ok(Redirect::to(kind.path()).into_response())
}

async fn confirm_delete(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    Extension(kind): Extension<ChoiceKind>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<ConfirmDeleteTemplate> {
    let choice = find_choice(&state, kind, id).await?;
    let consequence = (choice.product_count > 0).then(|| {
        format!(
            "{} product(s) will stay in the catalog without a {}.",
            choice.product_count,
            kind.label().to_lowercase()
        )
    });

    Ok(ConfirmDeleteTemplate {
        nav: admin_nav(&session, &admin, kind.path()).await?,
        label: kind.label().to_lowercase(),
        name: choice.display_name(),
        action: format!("{}/{id}/delete", kind.path()),
        cancel_url: format!("{}/{id}/edit", kind.path()),
        consequence,
    })
}

#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
async fn delete(
    RequireCatalogWriter(admin): RequireCatalogWriter,
    State(state): State<AppState>,
    Extension(kind): Extension<ChoiceKind>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response> {
    let choice = find_choice(&state, kind, id).await?;
    state.catalog().delete_choice(kind, id).await?;
    tracing::info!(id, kind = kind.label(), "lookup row deleted");

    set_flash(
        &session,
        format!(
            "The {} \u{201c}{}\u{201d} was deleted successfully.",
            kind.label().to_lowercase(),
            choice.display_name()
        ),
    )
    .await?;
    Ok(Redirect::to(kind.path()).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_message_names_the_table() {
        assert_eq!(
            duplicate_name(ChoiceKind::Category).get("name"),
            Some("Category with this Name already exists.")
        );
        assert_eq!(
            duplicate_name(ChoiceKind::ProductType).get("name"),
            Some("Product type with this Name already exists.")
        );
    }
}
