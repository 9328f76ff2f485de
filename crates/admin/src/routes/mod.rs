//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Health check
//! GET  /health/ready                   - Readiness check (database)
//!
//! # Dashboard
//! GET  /                               - Dashboard overview
//!
//! # Auth (password login; accounts come from the CLI)
//! GET  /auth/login                     - Login page
//! POST /auth/login                     - Login action
//! POST /auth/logout                    - Logout
//!
//! # Products
//! GET  /products                       - Product listing (?q=, ?page=)
//! GET  /products/new                   - New product form
//! POST /products                       - Create product, then email customers
//! GET  /products/{id}/edit             - Edit product form
//! POST /products/{id}                  - Update product
//! GET  /products/{id}/delete           - Delete confirmation
//! POST /products/{id}/delete           - Delete product
//!
//! # Categories and product types (same handlers, one router each)
//! GET  /categories                     - Listing
//! GET  /categories/new                 - New form
//! POST /categories                     - Create
//! GET  /categories/{id}/edit           - Edit form
//! POST /categories/{id}                - Update
//! GET  /categories/{id}/delete         - Delete confirmation
//! POST /categories/{id}/delete         - Delete
//! ... the same under /product-types
//!
//! # Orders (read-only)
//! GET  /orders                         - Order listing (?page=)
//! ```
//!
//! Reads need a logged-in admin; writes need a role that may change the
//! catalog.

pub mod auth;
pub mod choices;
pub mod dashboard;
pub mod orders;
pub mod products;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::error::Result;
use crate::models::{AdminRole, ChoiceKind, CurrentAdmin, session_keys};
use crate::state::AppState;

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub can_write: bool,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
            role: admin.role,
            can_write: admin.can_write(),
        }
    }
}

/// Layout data every signed-in page renders.
#[derive(Debug, Clone)]
pub struct AdminNav {
    pub admin_user: AdminUserView,
    /// Section prefix used to highlight the active menu entry.
    pub current_path: &'static str,
    /// Message left by the previous request, shown once.
    pub flash: Option<String>,
}

impl AdminNav {
    /// Whether `section` is the active menu entry.
    #[must_use]
    pub fn is_active(&self, section: &str) -> bool {
        self.current_path == section
    }
}

/// Build the layout data, consuming any pending flash message.
pub(crate) async fn admin_nav(
    session: &Session,
    admin: &CurrentAdmin,
    current_path: &'static str,
) -> Result<AdminNav> {
    let flash = session.remove::<String>(session_keys::FLASH).await?;
    Ok(AdminNav {
        admin_user: AdminUserView::from(admin),
        current_path,
        flash,
    })
}

/// Leave a message for the next page rendered in this session.
pub(crate) async fn set_flash(session: &Session, message: impl Into<String>) -> Result<()> {
    session.insert(session_keys::FLASH, message.into()).await?;
    Ok(())
}

/// Re-render a form with a 422 status.
pub(crate) fn unprocessable(template: impl IntoResponse) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// Create all admin page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(dashboard::router())
        .merge(auth::router())
        .merge(products::router())
        .merge(choices::router(ChoiceKind::Category))
        .merge(choices::router(ChoiceKind::ProductType))
        .merge(orders::router())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketstall_core::{AdminUserId, Email};

    use super::*;

    fn admin(role: AdminRole) -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::new(1),
            email: Email::parse("ops@shop.test").unwrap(),
            name: "Ops".to_string(),
            role,
        }
    }

    #[test]
    fn viewer_cannot_write() {
        assert!(!AdminUserView::from(&admin(AdminRole::Viewer)).can_write);
        assert!(AdminUserView::from(&admin(AdminRole::Admin)).can_write);
    }

    #[test]
    fn nav_marks_active_section() {
        let nav = AdminNav {
            admin_user: AdminUserView::from(&admin(AdminRole::Admin)),
            current_path: "/products",
            flash: None,
        };
        assert!(nav.is_active("/products"));
        assert!(!nav.is_active("/orders"));
    }
}
