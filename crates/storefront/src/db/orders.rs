//! Open orders (carts), order items and order completion.
//!
//! Every account holder has at most one open cart order, enforced by the
//! `orders_one_open_cart_per_customer` partial index. Guest checkouts are
//! flagged `guest` and always get a fresh order.

use sqlx::{PgConnection, PgExecutor};

use marketstall_core::{CustomerId, OrderId, ProductId};

use super::RepositoryError;
use crate::models::{OrderLineRow, OrderSummaryRow};

/// Delivery details captured at checkout.
#[derive(Debug, Clone)]
pub struct NewShippingAddress<'a> {
    pub customer_id: Option<CustomerId>,
    pub order_id: OrderId,
    pub phone: &'a str,
    pub email: &'a str,
    pub address: &'a str,
    pub town: &'a str,
    pub lga: &'a str,
    pub state: &'a str,
}

/// The customer's open cart order, created if missing.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn open_order(conn: &mut PgConnection, customer_id: CustomerId) -> Result<OrderId, RepositoryError> {
    let inserted: Option<OrderId> = sqlx::query_scalar(
        "INSERT INTO store.orders (customer_id, complete) VALUES ($1, FALSE) \
         ON CONFLICT (customer_id) WHERE complete = FALSE AND guest = FALSE DO NOTHING \
         RETURNING id",
    )
    .bind(customer_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = inserted {
        return Ok(id);
    }

    let existing: OrderId = sqlx::query_scalar(
        "SELECT id FROM store.orders \
         WHERE customer_id = $1 AND complete = FALSE AND guest = FALSE",
    )
    .bind(customer_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(existing)
}

/// Start a new order for a guest checkout.
///
/// Earlier guest orders for the same customer are left untouched.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create_guest_order<'e, E>(executor: E, customer_id: CustomerId) -> Result<OrderId, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let id: OrderId = sqlx::query_scalar(
        "INSERT INTO store.orders (customer_id, complete, guest) VALUES ($1, FALSE, TRUE) \
         RETURNING id",
    )
    .bind(customer_id)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

/// Items of an order joined with their products, oldest first.
///
/// Items whose product was deleted are skipped.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lines<'e, E>(executor: E, order_id: OrderId) -> Result<Vec<OrderLineRow>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OrderLineRow>(
        "SELECT p.id AS product_id, p.name, p.price, p.shipping, p.digital, p.image_url, \
                oi.quantity \
         FROM store.order_items oi \
         JOIN store.products p ON p.id = oi.product_id \
         WHERE oi.order_id = $1 \
         ORDER BY oi.date_added, oi.id",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Change an item's quantity by `delta`, creating the item if needed and
/// deleting it when the quantity drops to zero or below.
///
/// Returns the new quantity (0 when deleted).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn adjust_item(
    conn: &mut PgConnection,
    order_id: OrderId,
    product_id: ProductId,
    delta: i32,
) -> Result<i32, RepositoryError> {
    let quantity: Option<i32> = sqlx::query_scalar(
        "INSERT INTO store.order_items (order_id, product_id, quantity) VALUES ($1, $2, $3) \
         ON CONFLICT (order_id, product_id) \
         DO UPDATE SET quantity = COALESCE(store.order_items.quantity, 0) + EXCLUDED.quantity \
         RETURNING quantity",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(delta)
    .fetch_one(&mut *conn)
    .await?;

    let quantity = quantity.unwrap_or(0);
    if quantity <= 0 {
        sqlx::query("DELETE FROM store.order_items WHERE order_id = $1 AND product_id = $2")
            .bind(order_id)
            .bind(product_id)
            .execute(&mut *conn)
            .await?;
        return Ok(0);
    }

    Ok(quantity)
}

/// Delete every item of an order. Returns the number of items removed.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn clear_items<'e, E>(executor: E, order_id: OrderId) -> Result<u64, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM store.order_items WHERE order_id = $1")
        .bind(order_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Add `items` to a new order. Products that do not exist are skipped.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn insert_items(
    conn: &mut PgConnection,
    order_id: OrderId,
    items: &[(ProductId, u32)],
) -> Result<(), RepositoryError> {
    for &(product_id, quantity) in items {
        let Ok(quantity) = i32::try_from(quantity) else {
            continue;
        };
        if quantity <= 0 {
            continue;
        }
        sqlx::query(
            "INSERT INTO store.order_items (order_id, product_id, quantity) \
             SELECT $1, p.id, $3 FROM store.products p WHERE p.id = $2",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Record the payment reference and completion state of an order.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist.
/// Returns `RepositoryError::Database` if the query fails.
pub async fn record_payment<'e, E>(
    executor: E,
    order_id: OrderId,
    transaction_id: &str,
    complete: bool,
) -> Result<(), RepositoryError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE store.orders SET transaction_id = $2, complete = $3 WHERE id = $1",
    )
    .bind(order_id)
    .bind(transaction_id)
    .bind(complete)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Store a shipping address for an order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn insert_shipping_address<'e, E>(
    executor: E,
    address: &NewShippingAddress<'_>,
) -> Result<(), RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO store.shipping_addresses \
             (customer_id, order_id, phone, email, address, town, lga, state) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(address.customer_id)
    .bind(address.order_id)
    .bind(address.phone)
    .bind(address.email)
    .bind(address.address)
    .bind(address.town)
    .bind(address.lga)
    .bind(address.state)
    .execute(executor)
    .await?;

    Ok(())
}

/// A customer's orders with totals, newest first. Empty open orders are omitted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn history<'e, E>(
    executor: E,
    customer_id: CustomerId,
) -> Result<Vec<OrderSummaryRow>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OrderSummaryRow>(
        "SELECT o.id, c.name AS customer_name, o.date_ordered, o.complete, o.transaction_id, \
                COALESCE(SUM(oi.quantity), 0)::BIGINT AS item_count, \
                COALESCE(SUM(p.price * oi.quantity + p.shipping), 0)::NUMERIC(20, 2) AS total \
         FROM store.orders o \
         LEFT JOIN store.customers c ON c.id = o.customer_id \
         LEFT JOIN store.order_items oi ON oi.order_id = o.id \
         LEFT JOIN store.products p ON p.id = oi.product_id \
         WHERE o.customer_id = $1 \
         GROUP BY o.id, c.name \
         HAVING o.complete IS TRUE OR COUNT(oi.id) > 0 \
         ORDER BY o.date_ordered DESC, o.id DESC",
    )
    .bind(customer_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
