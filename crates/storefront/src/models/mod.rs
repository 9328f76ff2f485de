//! Domain models for the storefront.
//!
//! Row types decode straight from `store.*` tables via `sqlx::FromRow`.
//! Session types are what the storefront keeps in `tower-sessions`.

pub mod catalog;
pub mod customer;
pub mod order;
pub mod session;

pub use catalog::{Category, Product, ProductType};
pub use customer::{Customer, User};
pub use order::{OrderLineRow, OrderSummaryRow};
pub use session::{CurrentCustomer, keys as session_keys};
