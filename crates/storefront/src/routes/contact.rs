//! Contact page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;

use super::views::{NavContext, page_context};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub nav: NavContext,
}

/// Display the contact page.
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<ContactTemplate> {
    let (nav, _cart) = page_context(&state, &session, customer.as_ref()).await?;
    Ok(ContactTemplate { nav })
}
