//! Display types shared by page templates.

use tower_sessions::Session;

use marketstall_core::{CartLine, CartSummary, Money};

use crate::error::AppError;
use crate::models::{Category, CurrentCustomer, Product, ProductType};
use crate::services::cart::{self, CartData};
use crate::state::AppState;

/// Header data rendered on every page.
#[derive(Debug, Clone)]
pub struct NavContext {
    /// Units in the cart, for the header badge.
    pub cart_items: u32,
    /// Logged-in customer's name.
    pub customer_name: Option<String>,
    /// Currency symbol prefixed to prices.
    pub currency: String,
}

/// A product card.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Money,
    /// Shown struck through when above the selling price.
    pub original_price: Option<Money>,
    pub image_url: String,
    pub digital: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.display_name().to_string(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price,
            original_price: (product.original_price > product.price).then_some(product.original_price),
            image_url: product.image_url().to_string(),
            digital: product.is_digital(),
        }
    }
}

/// Convert a list of products into cards.
#[must_use]
pub fn product_views(products: &[Product]) -> Vec<ProductView> {
    products.iter().map(ProductView::from).collect()
}

/// A select option for product types and categories.
#[derive(Debug, Clone)]
pub struct ChoiceView {
    pub id: i32,
    pub name: String,
    pub image_url: String,
}

impl From<&ProductType> for ChoiceView {
    fn from(t: &ProductType) -> Self {
        Self {
            id: t.id.as_i32(),
            name: t.name.clone().unwrap_or_default(),
            image_url: t.image_url().to_string(),
        }
    }
}

impl From<&Category> for ChoiceView {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id.as_i32(),
            name: c.name.clone().unwrap_or_default(),
            image_url: c.image_url().to_string(),
        }
    }
}

/// One cart row.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: i32,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: Money,
    pub shipping: Money,
    pub total: Money,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.as_i32(),
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            quantity: line.quantity,
            price: line.price,
            shipping: line.shipping,
            total: line.total(),
        }
    }
}

/// The cart as rendered on the cart and checkout pages.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub total: Money,
    pub needs_shipping: bool,
}

impl From<&CartSummary> for CartView {
    fn from(summary: &CartSummary) -> Self {
        Self {
            lines: summary.lines.iter().map(CartLineView::from).collect(),
            item_count: summary.item_count,
            total: summary.total,
            needs_shipping: summary.needs_shipping,
        }
    }
}

impl CartView {
    /// Whether there is nothing in the cart.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Load the visitor's cart and the header context in one go.
///
/// # Errors
///
/// Returns `AppError` if the cart cannot be loaded.
pub async fn page_context(
    state: &AppState,
    session: &Session,
    customer: Option<&CurrentCustomer>,
) -> Result<(NavContext, CartData), AppError> {
    let cart = cart::cart_data(state.pool(), session, customer).await?;
    let nav = NavContext {
        cart_items: cart.item_count(),
        customer_name: customer.map(|c| c.name.clone()),
        currency: state.currency().to_string(),
    };
    Ok((nav, cart))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use marketstall_core::ProductId;

    use super::*;

    fn product(price: &str, original: &str) -> Product {
        Product {
            id: ProductId::new(1),
            name: Some("Ankara tote".to_string()),
            product_type_id: None,
            category_id: None,
            description: None,
            original_price: Money::parse(original).unwrap(),
            price: Money::parse(price).unwrap(),
            shipping: Money::ZERO,
            digital: None,
            image_url: None,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn original_price_only_when_discounted() {
        assert!(ProductView::from(&product("800", "1000")).original_price.is_some());
        assert!(ProductView::from(&product("1000", "1000")).original_price.is_none());
    }

    #[test]
    fn missing_fields_render_empty() {
        let view = ProductView::from(&product("1", "1"));
        assert_eq!(view.image_url, "");
        assert_eq!(view.description, "");
        assert!(!view.digital);
    }
}
