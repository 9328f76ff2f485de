//! Integration tests for the admin panel.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`mk-cli migrate`)
//! - The admin server running (cargo run -p marketstall-admin)
//! - An admin and a viewer created with `mk-cli admin create`, with their
//!   credentials in `ADMIN_TEST_*` and `ADMIN_VIEWER_*`
//!
//! Run with: cargo test -p marketstall-integration-tests -- --ignored

use marketstall_integration_tests::{admin_base_url, admin_client, client, unique_suffix};
use reqwest::{StatusCode, header};

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_anonymous_pages_redirect_to_login() {
    let client = client();
    let base_url = admin_base_url();

    for path in ["/", "/products", "/categories", "/product-types", "/orders"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get page");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(
            resp.headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/auth/login")
        );
    }
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_anonymous_json_requests_get_401() {
    let client = client();
    let resp = client
        .get(format!("{}/products", admin_base_url()))
        .header(header::ACCEPT, "application/json")
        .send()
        .await
        .expect("Failed to get products");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_wrong_password_rerenders_login() {
    let client = client();
    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", "nobody@example.com"), ("password", "not the password")])
        .send()
        .await
        .expect("Failed to post login");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Please enter the correct email and password."));
}

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_logout_ends_the_session() {
    let client = admin_client("ADMIN_TEST").await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to logout");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

// ============================================================================
// Catalog management
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_pages_render_for_admin() {
    let client = admin_client("ADMIN_TEST").await;
    let base_url = admin_base_url();

    for path in [
        "/",
        "/products",
        "/products?q=garri&page=1",
        "/products/new",
        "/categories",
        "/categories/new",
        "/product-types",
        "/orders",
    ] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get page");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_duplicate_category_name_is_rejected() {
    let client = admin_client("ADMIN_TEST").await;
    let base_url = admin_base_url();
    let name = format!("Test category {}", unique_suffix());

    let resp = client
        .post(format!("{base_url}/categories"))
        .form(&[("name", name.as_str()), ("image_url", "")])
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    // Same name, different case and padding.
    let shouted = format!("  {}  ", name.to_uppercase());
    let resp = client
        .post(format!("{base_url}/categories"))
        .form(&[("name", shouted.as_str()), ("image_url", "")])
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Category with this Name already exists."));
}

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_invalid_product_form_is_rejected() {
    let client = admin_client("ADMIN_TEST").await;
    let resp = client
        .post(format!("{}/products", admin_base_url()))
        .form(&[
            ("name", ""),
            ("product_type", ""),
            ("category", ""),
            ("price", "abc"),
            ("original_price", ""),
            ("shipping", ""),
            ("description", ""),
            ("image_url", "not a url"),
        ])
        .send()
        .await
        .expect("Failed to create product");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires running admin server and viewer credentials"]
async fn test_viewer_cannot_write() {
    let client = admin_client("ADMIN_VIEWER").await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to get products");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/products/new"))
        .send()
        .await
        .expect("Failed to get product form");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .post(format!("{base_url}/categories"))
        .form(&[("name", "Viewer category"), ("image_url", "")])
        .send()
        .await
        .expect("Failed to post category");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
