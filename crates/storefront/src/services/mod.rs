//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Customer registration and password login
//! - `cart` - Cart reads and updates for guests and customers
//! - `checkout` - Order finalization after payment

pub mod auth;
pub mod cart;
pub mod checkout;
