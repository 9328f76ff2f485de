//! Checkout page and order finalization.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Json, body::Bytes, extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use super::cart::decode_json;
use super::views::{CartView, NavContext, page_context};
use crate::error::{JsonError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::checkout::{self, ProcessOrderRequest};
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub nav: NavContext,
    pub cart: CartView,
    /// Gateway public key for the inline payment popup.
    pub paystack_public_key: String,
    /// Total in minor units, as the gateway expects.
    pub amount_minor: i64,
    /// Prefilled payer details for logged-in customers.
    pub customer_name: String,
    pub customer_email: String,
    pub logged_in: bool,
}

/// Display the checkout form.
#[instrument(skip(state, session, customer))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<CheckoutTemplate> {
    let (nav, cart) = page_context(&state, &session, customer.as_ref()).await?;

    Ok(CheckoutTemplate {
        nav,
        amount_minor: cart.summary.total.to_minor_units(),
        cart: CartView::from(&cart.summary),
        paystack_public_key: state.config().paystack.public_key.clone(),
        customer_name: customer.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
        customer_email: customer.as_ref().map(|c| c.email.clone()).unwrap_or_default(),
        logged_in: customer.is_some(),
    })
}

/// Record a completed payment.
///
/// `POST /process_order/` with `{"form": {...}, "shipping": {...}}`
#[instrument(skip(state, session, customer, body))]
pub async fn process_order(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    body: Bytes,
) -> std::result::Result<impl IntoResponse, JsonError> {
    let request: ProcessOrderRequest = decode_json(&body)?;
    let processed =
        checkout::process_order(state.pool(), &session, customer.as_ref(), &request).await?;

    tracing::info!(
        order_id = %processed.order_id,
        customer_id = %processed.customer_id,
        complete = processed.complete,
        "order processed"
    );
    Ok(Json("Payment Complete"))
}
