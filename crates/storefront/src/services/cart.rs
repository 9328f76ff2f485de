//! Cart operations.
//!
//! An authenticated customer's cart is their open order in `store.orders`.
//! A guest's cart is a [`GuestCart`] stored in the session under
//! [`session_keys::GUEST_CART`].

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::{CartAction, CartLine, CartSummary, GuestCart, OrderId, ProductId};

use crate::db::{CatalogRepository, RepositoryError, orders};
use crate::models::{CurrentCustomer, session_keys};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session store error.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// The resolved cart shown on every page.
#[derive(Debug, Clone)]
pub struct CartData {
    /// Open order backing the cart (customers only).
    pub order_id: Option<OrderId>,
    pub summary: CartSummary,
}

impl CartData {
    /// Units in the cart, for the header badge.
    #[must_use]
    pub const fn item_count(&self) -> u32 {
        self.summary.item_count
    }
}

/// Read the guest cart from the session (empty if absent).
///
/// # Errors
///
/// Returns `CartError::Session` if the session cannot be read.
pub async fn guest_cart(session: &Session) -> Result<GuestCart, CartError> {
    Ok(session
        .get::<GuestCart>(session_keys::GUEST_CART)
        .await?
        .unwrap_or_default())
}

async fn save_guest_cart(session: &Session, cart: &GuestCart) -> Result<(), CartError> {
    if cart.is_empty() {
        session.remove_value(session_keys::GUEST_CART).await?;
    } else {
        session.insert(session_keys::GUEST_CART, cart).await?;
    }
    Ok(())
}

/// Remove the guest cart from the session.
///
/// # Errors
///
/// Returns `CartError::Session` if the session cannot be modified.
pub async fn clear_guest_cart(session: &Session) -> Result<(), CartError> {
    session.remove_value(session_keys::GUEST_CART).await?;
    Ok(())
}

/// Resolve guest entries into cart lines, in the order they were added.
/// Entries for deleted products are skipped.
async fn guest_lines(pool: &PgPool, cart: &GuestCart) -> Result<Vec<CartLine>, CartError> {
    let ids: Vec<ProductId> = cart.entries().iter().map(|e| e.product_id).collect();
    let products = CatalogRepository::new(pool).products_by_ids(&ids).await?;

    Ok(cart
        .entries()
        .iter()
        .filter_map(|entry| {
            products
                .iter()
                .find(|p| p.id == entry.product_id)
                .map(|p| p.to_cart_line(entry.quantity))
        })
        .collect())
}

/// Load the current visitor's cart.
///
/// # Errors
///
/// Returns `CartError` if the database or session cannot be read.
#[instrument(skip(pool, session, customer), fields(customer_id = tracing::field::Empty))]
pub async fn cart_data(
    pool: &PgPool,
    session: &Session,
    customer: Option<&CurrentCustomer>,
) -> Result<CartData, CartError> {
    if let Some(customer) = customer {
        tracing::Span::current().record("customer_id", customer.customer_id.as_i32());

        let mut conn = pool.acquire().await?;
        let order_id = orders::open_order(&mut conn, customer.customer_id).await?;
        let lines = orders::lines(&mut *conn, order_id).await?;

        return Ok(CartData {
            order_id: Some(order_id),
            summary: CartSummary::from_lines(lines.into_iter().map(CartLine::from).collect()),
        });
    }

    let cart = guest_cart(session).await?;
    let lines = guest_lines(pool, &cart).await?;
    Ok(CartData {
        order_id: None,
        summary: CartSummary::from_lines(lines),
    })
}

/// Add or remove one unit of a product. Returns the product's new quantity.
///
/// # Errors
///
/// Returns `CartError::ProductNotFound` if the product does not exist.
#[instrument(skip(pool, session, customer))]
pub async fn update_item(
    pool: &PgPool,
    session: &Session,
    customer: Option<&CurrentCustomer>,
    product_id: ProductId,
    action: CartAction,
) -> Result<u32, CartError> {
    if CatalogRepository::new(pool)
        .get_product(product_id)
        .await?
        .is_none()
    {
        return Err(CartError::ProductNotFound(product_id));
    }

    if let Some(customer) = customer {
        let mut tx = pool.begin().await?;
        let order_id = orders::open_order(&mut tx, customer.customer_id).await?;
        let quantity = orders::adjust_item(&mut tx, order_id, product_id, action.delta()).await?;
        tx.commit().await?;

        tracing::debug!(%order_id, quantity, "order item updated");
        return Ok(u32::try_from(quantity).unwrap_or(0));
    }

    let mut cart = guest_cart(session).await?;
    cart.apply(product_id, action);
    save_guest_cart(session, &cart).await?;
    Ok(cart.quantity_of(product_id))
}

/// Empty the current visitor's cart.
///
/// # Errors
///
/// Returns `CartError` if the database or session cannot be modified.
#[instrument(skip(pool, session, customer))]
pub async fn clear_cart(
    pool: &PgPool,
    session: &Session,
    customer: Option<&CurrentCustomer>,
) -> Result<(), CartError> {
    if let Some(customer) = customer {
        let mut conn = pool.acquire().await?;
        let order_id = orders::open_order(&mut conn, customer.customer_id).await?;
        let removed = orders::clear_items(&mut *conn, order_id).await?;
        tracing::debug!(%order_id, removed, "cart cleared");
        return Ok(());
    }

    clear_guest_cart(session).await
}

/// Move the guest cart into a customer's open order after login.
///
/// Quantities are added to any items already in the order. Products that no
/// longer exist are dropped. The guest cart is removed afterwards.
///
/// # Errors
///
/// Returns `CartError` if the database or session cannot be modified.
#[instrument(skip(pool, session, customer))]
pub async fn merge_guest_cart(
    pool: &PgPool,
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), CartError> {
    let mut cart = guest_cart(session).await?;
    if cart.is_empty() {
        return Ok(());
    }

    let ids: Vec<ProductId> = cart.entries().iter().map(|e| e.product_id).collect();
    let known: Vec<ProductId> = CatalogRepository::new(pool)
        .products_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    cart.retain_products(&known);

    let mut tx = pool.begin().await?;
    let order_id = orders::open_order(&mut tx, customer.customer_id).await?;
    for entry in cart.entries() {
        let delta = i32::try_from(entry.quantity).unwrap_or(i32::MAX);
        orders::adjust_item(&mut tx, order_id, entry.product_id, delta).await?;
    }
    tx.commit().await?;

    tracing::info!(%order_id, items = cart.item_count(), "guest cart merged");
    clear_guest_cart(session).await
}
