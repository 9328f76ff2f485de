//! Integration tests for Marketstall.
//!
//! The tests talk to running servers over HTTP, so they are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and seed the database
//! cargo run -p marketstall-cli -- migrate
//! cargo run -p marketstall-cli -- seed
//!
//! # Start both servers, then
//! cargo test -p marketstall-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` - default `http://localhost:3000`
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - the storefront database,
//!   read directly by the checkout tests
//! - `ADMIN_BASE_URL` - default `http://localhost:3001`
//! - `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD` - an `admin` role user
//! - `ADMIN_VIEWER_EMAIL` / `ADMIN_VIEWER_PASSWORD` - a `viewer` role user

use reqwest::{Client, StatusCode, redirect::Policy};
use sqlx::PgPool;

/// Base URL for the storefront.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin panel.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Client with a cookie jar that does not follow redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Admin credentials from the environment.
///
/// # Panics
///
/// Panics if either variable is unset.
#[must_use]
pub fn admin_credentials(prefix: &str) -> (String, String) {
    let email = std::env::var(format!("{prefix}_EMAIL"))
        .unwrap_or_else(|_| panic!("{prefix}_EMAIL must be set"));
    let password = std::env::var(format!("{prefix}_PASSWORD"))
        .unwrap_or_else(|_| panic!("{prefix}_PASSWORD must be set"));
    (email, password)
}

/// Log in to the admin panel and return the session-holding client.
///
/// `prefix` selects the credential variables, e.g. `ADMIN_TEST`.
///
/// # Panics
///
/// Panics if the login request fails or is rejected.
pub async fn admin_client(prefix: &str) -> Client {
    let client = client();
    let (email, password) = admin_credentials(prefix);

    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(
        resp.status(),
        StatusCode::SEE_OTHER,
        "admin login for {prefix} was rejected"
    );

    client
}

/// Suffix for names that must not collide between runs.
#[must_use]
pub fn unique_suffix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{nanos:x}")
}

/// Connect to the storefront database.
///
/// # Panics
///
/// Panics if no database URL is set or the connection fails.
pub async fn store_pool() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL or DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to the storefront database")
}
