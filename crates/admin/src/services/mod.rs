//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Email and password authentication for admin users
//! - `email` - SMTP delivery of customer notifications

pub mod auth;
pub mod email;

pub use auth::{AdminAuthError, AdminAuthService};
pub use email::{EmailError, EmailService, notify_product_added};
