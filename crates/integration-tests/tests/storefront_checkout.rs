//! Integration tests for checkout and customer accounts.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database, reachable through
//!   `STOREFRONT_DATABASE_URL` for the order checks
//! - The storefront server running (cargo run -p marketstall-storefront)

use marketstall_integration_tests::{client, store_pool, storefront_base_url, unique_suffix};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;

/// One order of a guest customer as stored.
#[derive(Debug, sqlx::FromRow)]
struct GuestOrder {
    id: i32,
    complete: Option<bool>,
    transaction_id: Option<String>,
    items: i64,
    addresses: i64,
}

/// A product id and its single-unit cart total (price plus shipping).
async fn sample_product(pool: &PgPool, digital: bool) -> (i32, String) {
    sqlx::query_as(
        "SELECT id, (price + shipping)::TEXT FROM store.products \
         WHERE COALESCE(digital, FALSE) = $1 ORDER BY id LIMIT 1",
    )
    .bind(digital)
    .fetch_one(pool)
    .await
    .expect("seeded catalog has no matching product")
}

async fn guest_orders(pool: &PgPool, email: &str) -> Vec<GuestOrder> {
    sqlx::query_as(
        "SELECT o.id, o.complete, o.transaction_id, \
                (SELECT COALESCE(SUM(oi.quantity), 0)::BIGINT FROM store.order_items oi \
                 WHERE oi.order_id = o.id) AS items, \
                (SELECT COUNT(*) FROM store.shipping_addresses s WHERE s.order_id = o.id) AS addresses \
         FROM store.orders o \
         JOIN store.customers c ON c.id = o.customer_id \
         WHERE c.user_id IS NULL AND lower(c.email) = lower($1) \
         ORDER BY o.id",
    )
    .bind(email)
    .fetch_all(pool)
    .await
    .expect("Failed to load guest orders")
}

async fn add_to_cart(client: &Client, product_id: i32) {
    let resp = client
        .post(format!("{}/update_item/", storefront_base_url()))
        .json(&json!({"productId": product_id, "action": "add"}))
        .send()
        .await
        .expect("Failed to post update_item");
    assert_eq!(resp.status(), StatusCode::OK);
}

async fn cart_lists(client: &Client, product_id: i32) -> bool {
    client
        .get(format!("{}/cart/", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .text()
        .await
        .expect("Failed to read cart")
        .contains(&format!("data-product=\"{product_id}\""))
}

fn order_body(email: &str, total: &str) -> Value {
    json!({
        "form": { "name": "Guest Shopper", "email": email, "total": total },
        "shipping": {
            "address": "1 Marina", "town": "Lagos Island", "lga": "Lagos",
            "state": "Lagos", "phone": "08000000000", "email": email
        }
    })
}

async fn process_order(client: &Client, body: &Value) -> reqwest::Response {
    client
        .post(format!("{}/process_order/", storefront_base_url()))
        .json(body)
        .send()
        .await
        .expect("Failed to post process_order")
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_empty_guest_cart_cannot_be_ordered() {
    let client = client();
    let resp = process_order(
        &client,
        &json!({"form": {"name": "Ada", "email": "ada@example.com", "total": "0.00"}}),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_non_numeric_total_is_rejected() {
    let client = client();
    let resp = process_order(
        &client,
        &json!({"form": {"name": "Ada", "email": "ada@example.com", "total": "lots"}}),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap_or_default();
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_missing_form_is_a_decode_error() {
    let client = client();
    let resp = process_order(&client, &json!({"shipping": {"address": "1 Broad St"}})).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_register_logout_and_login() {
    let client = client();
    let base_url = storefront_base_url();
    let email = format!("shopper-{}@example.com", unique_suffix());
    let password = "a long enough password";

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .form(&[
            ("email", email.as_str()),
            ("name", "Test Shopper"),
            ("password", password),
            ("password_confirm", password),
        ])
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .get(format!("{base_url}/order/"))
        .send()
        .await
        .expect("Failed to get orders");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to logout");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", "wrong password here")])
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", password)])
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_duplicate_registration_is_rejected() {
    let client = client();
    let base_url = storefront_base_url();
    let email = format!("dup-{}@example.com", unique_suffix());
    let password = "a long enough password";
    let form = [
        ("email", email.as_str()),
        ("name", "Dup Shopper"),
        ("password", password),
        ("password_confirm", password),
    ];

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .form(&form)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let other = marketstall_integration_tests::client();
    let resp = other
        .post(format!("{base_url}/auth/register"))
        .form(&form)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database access"]
async fn test_each_guest_checkout_gets_its_own_order() {
    let pool = store_pool().await;
    let (product_id, total) = sample_product(&pool, false).await;
    let email = format!("guest-{}@example.com", unique_suffix());

    // First browser pays the wrong amount.
    let first = client();
    add_to_cart(&first, product_id).await;
    let resp = process_order(&first, &order_body(&email, "1.00")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap_or_default(), json!("Payment Complete"));

    // Second browser, same email, pays the cart total.
    let second = client();
    add_to_cart(&second, product_id).await;
    let resp = process_order(&second, &order_body(&email, &total)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let orders = guest_orders(&pool, &email).await;
    let [unpaid, paid] = orders.as_slice() else {
        panic!("expected two guest orders, got {orders:?}");
    };
    assert_ne!(unpaid.id, paid.id);

    assert_eq!(unpaid.complete, Some(false));
    assert!(unpaid.transaction_id.is_some());
    assert_eq!(unpaid.items, 1);

    assert_eq!(paid.complete, Some(true));
    assert!(paid.transaction_id.is_some());
    assert_ne!(unpaid.transaction_id, paid.transaction_id);
    assert_eq!(paid.items, 1);

    // Only the completed checkout empties the session cart.
    assert!(cart_lists(&first, product_id).await);
    assert!(!cart_lists(&second, product_id).await);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database access"]
async fn test_guest_email_matching_ignores_case() {
    let pool = store_pool().await;
    let (product_id, total) = sample_product(&pool, false).await;
    let email = format!("Casey-{}@Example.com", unique_suffix());

    for spelling in [email.clone(), email.to_lowercase()] {
        let client = client();
        add_to_cart(&client, product_id).await;
        let resp = process_order(&client, &order_body(&spelling, &total)).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let customers: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM store.customers WHERE user_id IS NULL AND lower(email) = lower($1)",
    )
    .bind(&email)
    .fetch_one(&pool)
    .await
    .expect("Failed to count guest customers");
    assert_eq!(customers, 1);
    assert_eq!(guest_orders(&pool, &email).await.len(), 2);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database access"]
async fn test_shipping_address_only_for_physical_items() {
    let pool = store_pool().await;

    for digital in [true, false] {
        let (product_id, total) = sample_product(&pool, digital).await;
        let email = format!("ship-{digital}-{}@example.com", unique_suffix());
        let client = client();
        add_to_cart(&client, product_id).await;
        let resp = process_order(&client, &order_body(&email, &total)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let orders = guest_orders(&pool, &email).await;
        let [order] = orders.as_slice() else {
            panic!("expected one guest order, got {orders:?}");
        };
        assert_eq!(order.complete, Some(true));
        assert_eq!(order.addresses, i64::from(!digital), "digital = {digital}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server and database access"]
async fn test_login_merges_guest_cart_into_open_order() {
    let pool = store_pool().await;
    let (product_id, _) = sample_product(&pool, false).await;
    let base_url = storefront_base_url();
    let email = format!("merge-{}@example.com", unique_suffix());
    let password = "a long enough password";

    let client = client();
    let resp = client
        .post(format!("{base_url}/auth/register"))
        .form(&[
            ("email", email.as_str()),
            ("name", "Merge Shopper"),
            ("password", password),
            ("password_confirm", password),
        ])
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to logout");

    add_to_cart(&client, product_id).await;
    add_to_cart(&client, product_id).await;

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", password)])
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(cart_lists(&client, product_id).await);

    let quantity: Option<i32> = sqlx::query_scalar(
        "SELECT oi.quantity FROM store.order_items oi \
         JOIN store.orders o ON o.id = oi.order_id \
         JOIN store.customers c ON c.id = o.customer_id \
         JOIN store.users u ON u.id = c.user_id \
         WHERE u.email = $1 AND o.complete = FALSE AND oi.product_id = $2",
    )
    .bind(&email)
    .bind(product_id)
    .fetch_one(&pool)
    .await
    .expect("merged item missing from the open order");
    assert_eq!(quantity, Some(2));
}
