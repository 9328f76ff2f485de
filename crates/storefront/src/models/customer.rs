//! Customer and account rows.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use marketstall_core::{CustomerId, UserId};

/// A storefront login account. Each account owns exactly one [`Customer`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A customer: either linked to a [`User`] or a guest identified by email.
#[derive(Debug, Clone, FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: Option<UserId>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}
