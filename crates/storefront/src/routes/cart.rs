//! Cart page and the JSON cart endpoints used by `static/js/cart.js`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Json, body::Bytes, extract::State, response::IntoResponse};
use serde::{Deserialize, Deserializer};
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::{CartAction, ProductId};

use super::views::{CartView, NavContext, page_context};
use crate::error::{AppError, JsonError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::cart;
use crate::state::AppState;

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub nav: NavContext,
    pub cart: CartView,
}

/// Body of `POST /update_item/`.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    /// Sent as a number or, from `data-` attributes, a string.
    #[serde(rename = "productId", deserialize_with = "product_id_from_any")]
    pub product_id: ProductId,
    pub action: CartAction,
}

fn product_id_from_any<'de, D>(deserializer: D) -> std::result::Result<ProductId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(id) => Ok(ProductId::new(id)),
        Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

/// Decode a JSON body, reporting failures the way the cart script expects.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    body: &Bytes,
) -> std::result::Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Error decoding JSON: {e}")))
}

/// Display the cart.
#[instrument(skip(state, session, customer))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<CartTemplate> {
    let (nav, cart) = page_context(&state, &session, customer.as_ref()).await?;

    Ok(CartTemplate {
        nav,
        cart: CartView::from(&cart.summary),
    })
}

/// Add or remove one unit of a product.
///
/// `POST /update_item/` with `{"productId": 3, "action": "add" | "remove"}`
#[instrument(skip(state, session, customer, body))]
pub async fn update_item(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    body: Bytes,
) -> std::result::Result<impl IntoResponse, JsonError> {
    let request: UpdateItemRequest = decode_json(&body)?;
    let quantity = cart::update_item(
        state.pool(),
        &session,
        customer.as_ref(),
        request.product_id,
        request.action,
    )
    .await?;

    tracing::info!(
        product_id = %request.product_id,
        action = ?request.action,
        quantity,
        "cart updated"
    );
    Ok(Json("Item was added"))
}

/// Remove everything from the cart.
///
/// `POST /clear_cart/`
#[instrument(skip(state, session, customer))]
pub async fn clear_cart(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> std::result::Result<impl IntoResponse, JsonError> {
    cart::clear_cart(state.pool(), &session, customer.as_ref()).await?;
    Ok(Json("Cart was cleared"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decode(json: &str) -> std::result::Result<UpdateItemRequest, AppError> {
        decode_json(&Bytes::from(json.to_owned()))
    }

    #[test]
    fn product_id_accepts_numbers_and_strings() {
        assert_eq!(
            decode(r#"{"productId": 4, "action": "add"}"#).unwrap().product_id,
            ProductId::new(4)
        );
        assert_eq!(
            decode(r#"{"productId": "4", "action": "remove"}"#)
                .unwrap()
                .action,
            CartAction::Remove
        );
    }

    #[test]
    fn unknown_action_is_a_bad_request() {
        let err = decode(r#"{"productId": 4, "action": "delete"}"#).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.starts_with("Error decoding JSON")));
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        assert!(matches!(decode("{not json"), Err(AppError::BadRequest(_))));
    }
}
