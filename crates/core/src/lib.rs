//! Marketstall Core - Shared domain types.
//!
//! This crate provides the types used by every Marketstall component:
//! - `storefront` - Public catalog, cart and checkout
//! - `admin` - Catalog management panel
//! - `cli` - Migrations, seeding and admin user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Cart arithmetic and pagination live here so both binaries
//! compute totals and page windows the same way.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, money and status enums
//! - [`cart`] - Cart lines, totals and the session-stored guest cart
//! - [`pagination`] - Lenient page lookup for listings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod pagination;
pub mod types;

pub use cart::{CartAction, CartLine, CartSummary, GuestCart, totals_match};
pub use pagination::{PageInfo, Paginator};
pub use types::*;
