//! Authentication route handlers.
//!
//! Password login and registration for storefront customers. A guest cart
//! collected before logging in is merged into the customer's open order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::views::{NavContext, page_context};
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_customer, set_current_customer};
use crate::models::CurrentCustomer;
use crate::services::auth::{AuthError, AuthService};
use crate::services::cart;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub name: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: NavContext,
    pub email: String,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: NavContext,
    pub email: String,
    pub name: String,
    pub error: Option<String>,
}

/// Re-render a form with a 422 status.
fn unprocessable(template: impl IntoResponse) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// Put the customer in the session and fold in the guest cart.
async fn start_session(
    state: &AppState,
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), AppError> {
    session.cycle_id().await?;
    set_current_customer(session, customer).await?;
    cart::merge_guest_cart(state.pool(), session, customer).await?;
    set_sentry_user(&customer.user_id, Some(&customer.email));
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Response, AppError> {
    if customer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let (nav, _cart) = page_context(&state, &session, None).await?;
    Ok(LoginTemplate {
        nav,
        email: String::new(),
        error: None,
    }
    .into_response())
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(customer) => {
            start_session(&state, &session, &customer).await?;
            tracing::info!(customer_id = %customer.customer_id, "customer logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("login failed");
            let (nav, _cart) = page_context(&state, &session, None).await?;
            Ok(unprocessable(LoginTemplate {
                nav,
                email: form.email,
                error: Some("Invalid email or password.".to_string()),
            }))
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Response, AppError> {
    if customer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let (nav, _cart) = page_context(&state, &session, None).await?;
    Ok(RegisterTemplate {
        nav,
        email: String::new(),
        name: String::new(),
        error: None,
    }
    .into_response())
}

/// Handle registration form submission.
///
/// Creates the account and logs the customer in.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let result = if form.password == form.password_confirm {
        AuthService::new(state.pool())
            .register(&form.email, &form.name, &form.password)
            .await
    } else {
        Err(AuthError::WeakPassword("passwords do not match".to_string()))
    };

    match result {
        Ok(customer) => {
            start_session(&state, &session, &customer).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) if e.is_user_error() => {
            let (nav, _cart) = page_context(&state, &session, None).await?;
            Ok(unprocessable(RegisterTemplate {
                nav,
                email: form.email,
                name: form.name,
                error: Some(e.to_string()),
            }))
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Clears the customer and destroys the session, including any cart state.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_customer(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}
