//! Catalog rows: products, product types and categories.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use marketstall_core::{CartLine, CategoryId, Money, ProductId, ProductTypeId};

/// A product type (top-level grouping shown as tiles on the home page).
#[derive(Debug, Clone, FromRow)]
pub struct ProductType {
    pub id: ProductTypeId,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

/// A product category.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

/// A product for sale.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: Option<String>,
    pub product_type_id: Option<ProductTypeId>,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    pub original_price: Money,
    pub price: Money,
    pub shipping: Money,
    pub digital: Option<bool>,
    pub image_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl ProductType {
    /// Image URL, or an empty string when none is set.
    #[must_use]
    pub fn image_url(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }
}

impl Category {
    /// Image URL, or an empty string when none is set.
    #[must_use]
    pub fn image_url(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }
}

impl Product {
    /// Image URL, or an empty string when none is set.
    #[must_use]
    pub fn image_url(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }

    /// Display name (empty for unnamed rows).
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Whether the product is delivered electronically.
    #[must_use]
    pub fn is_digital(&self) -> bool {
        self.digital.unwrap_or(false)
    }

    /// Build a cart line for this product.
    #[must_use]
    pub fn to_cart_line(&self, quantity: u32) -> CartLine {
        CartLine {
            product_id: self.id,
            name: self.display_name().to_string(),
            price: self.price,
            shipping: self.shipping,
            digital: self.is_digital(),
            quantity,
            image_url: self.image_url().to_string(),
        }
    }
}
