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
/// Non-numeric input is rendered unchanged.
///
/// Usage in templates: `{{ product.price|format_price }}` renders `1,234,567.50`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn format_price(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(grouped(&value.to_string()))
}

fn grouped(raw: &str) -> String {
    Money::parse(raw).map_or_else(|_| raw.to_string(), |m| m.format_grouped())
}

/// Returns the build-time content hash of a static asset.
///
/// Usage in templates: `{{ "main.css"|asset_hash }}`, `{{ "cart.js"|asset_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn asset_hash(name: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(hash_for(&name.to_string()))
}

fn hash_for(name: &str) -> &'static str {
    match name {
        "main.css" => env!("CSS_HASH"),
        "cart.js" => env!("CART_JS_HASH"),
        "checkout.js" => env!("CHECKOUT_JS_HASH"),
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_prices() {
        assert_eq!(grouped("1234567.5"), "1,234,567.50");
        assert_eq!(grouped("15000.00"), "15,000.00");
        assert_eq!(grouped("n/a"), "n/a");
    }

    #[test]
    fn unknown_assets_have_no_hash() {
        assert_eq!(hash_for("missing.js"), "");
    }
}
