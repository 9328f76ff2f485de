//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use marketstall_core::Money;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an amount with two decimals and thousands separators.
///
/// Usage in templates: `{{ product.price|format_price }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn format_price(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(Money::parse(&raw).map_or(raw, |m| m.format_grouped()))
}
