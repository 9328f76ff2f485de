//! Catalog rows as the admin panel edits them.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use marketstall_core::{CategoryId, Money, ProductId, ProductTypeId};

/// A product row.
#[derive(Debug, Clone, FromRow)]
pub struct AdminProduct {
    pub id: ProductId,
    pub name: Option<String>,
    pub product_type_id: Option<ProductTypeId>,
    pub category_id: Option<CategoryId>,
    /// Joined product type name, for listings.
    pub product_type_name: Option<String>,
    /// Joined category name, for listings.
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub original_price: Money,
    pub price: Money,
    pub shipping: Money,
    pub digital: Option<bool>,
    pub image_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl AdminProduct {
    /// Name for display; unnamed rows show their ID.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Product #{}", self.id))
    }
}

/// Validated product fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub product_type_id: Option<ProductTypeId>,
    pub category_id: Option<CategoryId>,
    pub description: String,
    pub original_price: Money,
    pub price: Money,
    pub shipping: Money,
    pub digital: bool,
    pub image_url: String,
}

/// The two name-and-image lookup tables products are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    Category,
    ProductType,
}

impl ChoiceKind {
    /// Fully qualified table name.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Category => "store.categories",
            Self::ProductType => "store.product_types",
        }
    }

    /// Singular label, e.g. in "Category with this Name already exists."
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::ProductType => "Product type",
        }
    }

    /// Plural label for headings.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Category => "Categories",
            Self::ProductType => "Product types",
        }
    }

    /// Path prefix of the admin pages.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Category => "/categories",
            Self::ProductType => "/product-types",
        }
    }
}

/// A category or product type row.
#[derive(Debug, Clone, FromRow)]
pub struct Choice {
    pub id: i32,
    pub name: Option<String>,
    pub image_url: Option<String>,
    /// Products referencing this row.
    pub product_count: i64,
}

impl Choice {
    /// Name for display; unnamed rows show their ID.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

/// Validated category/product type fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceInput {
    pub name: String,
    pub image_url: String,
}
