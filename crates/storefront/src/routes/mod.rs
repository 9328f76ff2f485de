//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (paginated products, tiles, strips)
//! GET  /categories/            - Filtered catalog
//! GET  /shop/                  - Product search
//! GET  /contact/               - Contact page
//!
//! # Cart (JSON endpoints used by static/js/cart.js)
//! GET  /cart/                  - Cart page
//! POST /update_item/           - Add or remove one unit
//! POST /clear_cart/            - Empty the cart
//!
//! # Checkout
//! GET  /checkout/              - Checkout page with payment popup
//! POST /process_order/         - Record a completed payment
//! GET  /order/                 - Order history (requires auth)
//!
//! # Session
//! GET|POST /clear-alert-session/ - Reset the welcome alert flag
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod orders;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create all storefront page and API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route(
            "/clear-alert-session/",
            get(home::clear_alert_session).post(home::clear_alert_session),
        )
        .route("/categories/", get(catalog::categories))
        .route("/shop/", get(catalog::shop))
        .route("/cart/", get(cart::show))
        .route("/update_item/", post(cart::update_item))
        .route("/clear_cart/", post(cart::clear_cart))
        .route("/checkout/", get(checkout::show))
        .route("/process_order/", post(checkout::process_order))
        .route("/order/", get(orders::index))
        .route("/contact/", get(contact::show))
        .nest("/auth", auth_routes())
}
