//! Integration tests for the storefront catalog and guest cart.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`mk-cli migrate && mk-cli seed`)
//! - The storefront server running (cargo run -p marketstall-storefront)

use marketstall_integration_tests::{client, storefront_base_url};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// First product id linked from the shop page.
async fn first_product_id(client: &Client) -> i64 {
    let html = client
        .get(format!("{}/shop/", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get shop page")
        .text()
        .await
        .expect("Failed to read shop page");

    let marker = "data-product=\"";
    let start = html.find(marker).expect("shop page lists no products") + marker.len();
    html.get(start..)
        .and_then(|rest| rest.split('"').next())
        .and_then(|id| id.parse().ok())
        .expect("product id is not numeric")
}

async fn update_item(client: &Client, body: &Value) -> reqwest::Response {
    client
        .post(format!("{}/update_item/", storefront_base_url()))
        .json(body)
        .send()
        .await
        .expect("Failed to post update_item")
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_public_pages_render() {
    let client = client();
    let base_url = storefront_base_url();

    for path in ["/", "/shop/", "/categories/", "/cart/", "/checkout/", "/contact/"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get page");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_shop_filters_by_unknown_category() {
    let client = client();
    let resp = client
        .get(format!("{}/shop/?category=no-such-category-xyz", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get shop page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(!body.contains("data-product=\""));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_orders_page_requires_login() {
    let client = client();
    let resp = client
        .get(format!("{}/order/", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get orders page");

    assert!(resp.status().is_redirection());
}

// ============================================================================
// Cart API
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_guest_cart_add_remove_and_clear() {
    let client = client();
    let product_id = first_product_id(&client).await;

    let resp = update_item(&client, &json!({"productId": product_id, "action": "add"})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap_or_default(), json!("Item was added"));

    // String ids come from data- attributes.
    let resp = update_item(
        &client,
        &json!({"productId": product_id.to_string(), "action": "add"}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = update_item(&client, &json!({"productId": product_id, "action": "remove"})).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cart = client
        .get(format!("{}/cart/", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .text()
        .await
        .expect("Failed to read cart");
    assert!(cart.contains(&format!("data-product=\"{product_id}\"")));

    let resp = client
        .post(format!("{}/clear_cart/", storefront_base_url()))
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap_or_default(), json!("Cart was cleared"));

    let cart = client
        .get(format!("{}/cart/", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .text()
        .await
        .expect("Failed to read cart");
    assert!(!cart.contains(&format!("data-product=\"{product_id}\"")));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_update_item_rejects_bad_requests() {
    let client = client();

    let resp = update_item(&client, &json!({"productId": 2_000_000_000, "action": "add"})).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = update_item(&client, &json!({"productId": 1, "action": "explode"})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{}/update_item/", storefront_base_url()))
        .body("not json")
        .send()
        .await
        .expect("Failed to post update_item");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap_or_default();
    assert!(body["error"].as_str().is_some_and(|e| e.starts_with("Error decoding JSON")));
}
