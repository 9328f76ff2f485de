//! Session-related types.
//!
//! Types stored in the session for authentication and guest cart state.

use serde::{Deserialize, Serialize};

use marketstall_core::{CustomerId, UserId};

/// Session-stored customer identity.
///
/// Minimal data stored in the session to identify the logged-in customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Login account ID.
    pub user_id: UserId,
    /// Customer row owned by the account.
    pub customer_id: CustomerId,
    /// Account email address.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the guest cart (`marketstall_core::GuestCart`).
    pub const GUEST_CART: &str = "guest_cart";

    /// Set once the welcome alert has been shown in this session.
    pub const ALERT_SHOWN: &str = "alert_shown";
}
