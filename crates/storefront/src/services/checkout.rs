//! Order finalization.
//!
//! The browser completes payment with the gateway and then posts the paid
//! total plus delivery details. The order is marked complete only when that
//! total equals the cart total computed here.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::{
    CartLine, CartSummary, CustomerId, Email, EmailError, Money, MoneyError, OrderId, ProductId,
    totals_match,
};

use super::cart::{self, CartError};
use crate::db::orders::{self, NewShippingAddress};
use crate::db::{RepositoryError, customers};
use crate::models::CurrentCustomer;

/// Errors from order processing.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Guest email missing or malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Submitted total is not a number.
    #[error("invalid total: {0}")]
    InvalidTotal(#[from] MoneyError),

    /// Nothing to pay for.
    #[error("your cart is empty")]
    EmptyCart,

    /// Cart could not be read.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Body of `POST /process_order/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessOrderRequest {
    pub form: OrderForm,
    #[serde(default)]
    pub shipping: ShippingForm,
}

/// Payer details and the amount actually paid.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Number or numeric string.
    pub total: serde_json::Value,
}

/// Delivery details. Only stored when the order has physical items.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShippingForm {
    pub address: String,
    pub town: String,
    pub lga: String,
    pub state: String,
    pub phone: String,
    pub email: String,
}

/// Outcome of processing an order.
#[derive(Debug, Clone)]
pub struct ProcessedOrder {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub transaction_id: String,
    pub total: Money,
    pub complete: bool,
}

/// Payment reference: UNIX time with microseconds, e.g. `1767225600.123456`.
#[must_use]
pub fn transaction_id_at(now: DateTime<Utc>) -> String {
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

/// Finalize the visitor's order.
///
/// Customers pay for their open order. Guests are matched to a customer by
/// the submitted email, and their session cart is copied into a new order
/// for that customer. Every write happens in one transaction.
///
/// # Errors
///
/// Returns `CheckoutError::InvalidTotal` if the total is not numeric.
/// Returns `CheckoutError::InvalidEmail` if a guest email is invalid.
/// Returns `CheckoutError::EmptyCart` if there is nothing to pay for.
#[instrument(skip(pool, session, customer, request), fields(order_id = tracing::field::Empty, complete = tracing::field::Empty))]
pub async fn process_order(
    pool: &PgPool,
    session: &Session,
    customer: Option<&CurrentCustomer>,
    request: &ProcessOrderRequest,
) -> Result<ProcessedOrder, CheckoutError> {
    let submitted = Money::parse_submitted(&request.form.total)?;
    let transaction_id = transaction_id_at(Utc::now());

    let mut tx = pool.begin().await?;

    let (customer_id, order_id) = match customer {
        Some(customer) => {
            let order_id = orders::open_order(&mut tx, customer.customer_id).await?;
            (customer.customer_id, order_id)
        }
        None => {
            let guest = cart::guest_cart(session).await?;
            if guest.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }
            let email = Email::parse(&request.form.email)?;
            let guest_customer =
                customers::upsert_guest_customer(&mut *tx, &email, request.form.name.trim()).await?;
            let order_id = orders::create_guest_order(&mut *tx, guest_customer.id).await?;
            let items: Vec<(ProductId, u32)> = guest
                .entries()
                .iter()
                .map(|e| (e.product_id, e.quantity))
                .collect();
            orders::insert_items(&mut tx, order_id, &items).await?;
            (guest_customer.id, order_id)
        }
    };

    let lines = orders::lines(&mut *tx, order_id).await?;
    let summary = CartSummary::from_lines(lines.into_iter().map(CartLine::from).collect());
    if summary.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let complete = totals_match(submitted, summary.total);
    orders::record_payment(&mut *tx, order_id, &transaction_id, complete).await?;

    if summary.needs_shipping {
        let shipping = &request.shipping;
        orders::insert_shipping_address(
            &mut *tx,
            &NewShippingAddress {
                customer_id: Some(customer_id),
                order_id,
                phone: shipping.phone.trim(),
                email: shipping.email.trim(),
                address: shipping.address.trim(),
                town: shipping.town.trim(),
                lga: shipping.lga.trim(),
                state: shipping.state.trim(),
            },
        )
        .await?;
    }

    tx.commit().await?;

    let span = tracing::Span::current();
    span.record("order_id", order_id.as_i32());
    span.record("complete", complete);
    if complete {
        tracing::info!(%transaction_id, total = %summary.total, "order completed");
        if customer.is_none() {
            cart::clear_guest_cart(session).await?;
        }
    } else {
        tracing::warn!(
            %transaction_id,
            submitted = %submitted,
            computed = %summary.total,
            "submitted total does not match cart total"
        );
    }

    Ok(ProcessedOrder {
        order_id,
        customer_id,
        transaction_id,
        total: summary.total,
        complete,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn transaction_id_is_unix_seconds_with_micros() {
        let at = Utc.timestamp_opt(1_767_225_600, 120_000).unwrap();
        assert_eq!(transaction_id_at(at), "1767225600.000120");
    }

    #[test]
    fn request_decodes_with_numeric_total() {
        let request: ProcessOrderRequest = serde_json::from_value(serde_json::json!({
            "form": { "name": "Ada", "email": "ada@example.com", "total": 2550.5 },
            "shipping": {
                "address": "1 Marina", "town": "Lagos Island", "lga": "Lagos",
                "state": "Lagos", "phone": "08000000000", "email": "ada@example.com"
            }
        }))
        .unwrap();
        assert_eq!(
            Money::parse_submitted(&request.form.total).unwrap(),
            Money::parse("2550.50").unwrap()
        );
        assert_eq!(request.shipping.lga, "Lagos");
    }

    #[test]
    fn shipping_is_optional() {
        let request: ProcessOrderRequest = serde_json::from_value(serde_json::json!({
            "form": { "total": "100.00" }
        }))
        .unwrap();
        assert!(request.shipping.address.is_empty());
        assert!(request.form.email.is_empty());
    }

    #[test]
    fn missing_total_is_a_decode_error() {
        let result: Result<ProcessOrderRequest, _> =
            serde_json::from_value(serde_json::json!({ "form": { "name": "Ada" } }));
        assert!(result.is_err());
    }
}
