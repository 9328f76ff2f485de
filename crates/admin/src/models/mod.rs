//! Domain models for admin.

pub mod admin_user;
pub mod catalog;
pub mod order;
pub mod session;

pub use admin_user::{AdminRole, AdminUser};
pub use catalog::{AdminProduct, Choice, ChoiceInput, ChoiceKind, ProductInput};
pub use order::{AdminOrderRow, OrderStats};
pub use session::{CurrentAdmin, keys as session_keys};
