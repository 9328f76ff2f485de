//! Session middleware configuration for admin.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions with
//! stricter security settings (SameSite=Strict, 24hr expiry).

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "mk_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Cookie signing key derived from the configured session secret.
///
/// SHA-512 stretches the secret to the 64 bytes the cookie key needs.
pub(crate) fn signing_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Create the session layer with the `admin.session` store.
///
/// The cookie is signed with `ADMIN_SESSION_SECRET`.
///
/// # Panics
///
/// Panics if the schema name or table name is rejected, which cannot happen
/// with the hardcoded `admin` and `session` values.
#[must_use]
#[allow(clippy::expect_used)]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("admin")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(&config.session_secret))
}

#[cfg(test)]
mod tests {
    use tower_sessions::cookie::{Cookie, CookieJar};

    use super::*;

    #[test]
    fn signing_key_is_stable_per_secret() {
        let a = signing_key(&SecretString::from("a".repeat(40)));
        let again = signing_key(&SecretString::from("a".repeat(40)));
        let b = signing_key(&SecretString::from("b".repeat(40)));

        assert_eq!(a.signing(), again.signing());
        assert_ne!(a.signing(), b.signing());
    }

    #[test]
    fn cookies_signed_with_another_secret_are_rejected() {
        let key = signing_key(&SecretString::from("a".repeat(40)));
        let other = signing_key(&SecretString::from("b".repeat(40)));

        let mut jar = CookieJar::new();
        jar.signed_mut(&key).add(Cookie::new(SESSION_COOKIE_NAME, "session-id"));

        assert_eq!(
            jar.signed(&key).get(SESSION_COOKIE_NAME).map(|c| c.value().to_owned()),
            Some("session-id".to_string())
        );
        assert!(jar.signed(&other).get(SESSION_COOKIE_NAME).is_none());
    }
}
