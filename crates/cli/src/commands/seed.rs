//! Seed the catalog with sample data for local development.
//!
//! Rows are matched by name (ignoring case and surrounding whitespace), so
//! running the command again inserts nothing new.

use marketstall_admin::db;
use marketstall_core::{Money, MoneyError};
use sqlx::PgPool;
use thiserror::Error;

use super::{ConnectError, database_url};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Connection settings are missing.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A sample price failed to parse.
    #[error("Invalid sample price: {0}")]
    Price(#[from] MoneyError),
}

/// Name and image of a lookup row.
struct SampleChoice {
    name: &'static str,
    image_url: &'static str,
}

/// A sample product referencing its lookup rows by name.
struct SampleProduct {
    name: &'static str,
    product_type: &'static str,
    category: &'static str,
    description: &'static str,
    original_price: &'static str,
    price: &'static str,
    shipping: &'static str,
    digital: bool,
    image_url: &'static str,
}

const PRODUCT_TYPES: &[SampleChoice] = &[
    SampleChoice { name: "Food", image_url: "https://images.example.com/types/food.jpg" },
    SampleChoice { name: "Clothing", image_url: "https://images.example.com/types/clothing.jpg" },
    SampleChoice { name: "E-book", image_url: "https://images.example.com/types/ebook.jpg" },
];

const CATEGORIES: &[SampleChoice] = &[
    SampleChoice { name: "Groceries", image_url: "https://images.example.com/categories/groceries.jpg" },
    SampleChoice { name: "Fashion", image_url: "https://images.example.com/categories/fashion.jpg" },
    SampleChoice { name: "Books", image_url: "https://images.example.com/categories/books.jpg" },
];

const PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        name: "Ijebu garri (5kg)",
        product_type: "Food",
        category: "Groceries",
        description: "Crisp, sour garri from Ijebu-Ode.",
        original_price: "6500.00",
        price: "5800.00",
        shipping: "1500.00",
        digital: false,
        image_url: "https://images.example.com/products/garri.jpg",
    },
    SampleProduct {
        name: "Red palm oil (4L)",
        product_type: "Food",
        category: "Groceries",
        description: "Unrefined palm oil, pressed this season.",
        original_price: "12000.00",
        price: "10500.00",
        shipping: "2000.00",
        digital: false,
        image_url: "https://images.example.com/products/palm-oil.jpg",
    },
    SampleProduct {
        name: "Adire scarf",
        product_type: "Clothing",
        category: "Fashion",
        description: "Hand-dyed indigo cotton scarf from Abeokuta.",
        original_price: "9000.00",
        price: "7500.00",
        shipping: "1000.00",
        digital: false,
        image_url: "https://images.example.com/products/adire-scarf.jpg",
    },
    SampleProduct {
        name: "Ankara tote bag",
        product_type: "Clothing",
        category: "Fashion",
        description: "Lined tote in wax print fabric.",
        original_price: "15000.00",
        price: "15000.00",
        shipping: "1000.00",
        digital: false,
        image_url: "https://images.example.com/products/ankara-tote.jpg",
    },
    SampleProduct {
        name: "Small business bookkeeping guide",
        product_type: "E-book",
        category: "Books",
        description: "PDF guide to keeping books for a market stall.",
        original_price: "5000.00",
        price: "3500.00",
        shipping: "0.00",
        digital: true,
        image_url: "https://images.example.com/products/bookkeeping.jpg",
    },
];

/// Counts of inserted rows.
#[derive(Debug, Default)]
struct SeedSummary {
    product_types: u64,
    categories: u64,
    products: u64,
}

/// Insert the sample catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn catalog() -> Result<(), SeedError> {
    let pool = db::create_pool(&database_url("ADMIN_DATABASE_URL")?).await?;

    let mut summary = SeedSummary::default();
    for choice in PRODUCT_TYPES {
        summary.product_types += insert_choice(&pool, "store.product_types", choice).await?;
    }
    for choice in CATEGORIES {
        summary.categories += insert_choice(&pool, "store.categories", choice).await?;
    }
    for product in PRODUCTS {
        summary.products += insert_product(&pool, product).await?;
    }

    tracing::info!(
        product_types = summary.product_types,
        categories = summary.categories,
        products = summary.products,
        "Seeding complete"
    );
    Ok(())
}

async fn insert_choice(pool: &PgPool, table: &str, choice: &SampleChoice) -> Result<u64, SeedError> {
    let result = sqlx::query(&format!(
        "INSERT INTO {table} (name, image_url) \
         SELECT $1, $2 \
         WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE lower(btrim(name)) = lower(btrim($1)))"
    ))
    .bind(choice.name)
    .bind(choice.image_url)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

async fn insert_product(pool: &PgPool, product: &SampleProduct) -> Result<u64, SeedError> {
    let result = sqlx::query(
        "INSERT INTO store.products \
             (name, product_type_id, category_id, description, original_price, price, \
              shipping, digital, image_url) \
         SELECT $1, \
             (SELECT id FROM store.product_types WHERE lower(name) = lower($2) ORDER BY id LIMIT 1), \
             (SELECT id FROM store.categories WHERE lower(name) = lower($3) ORDER BY id LIMIT 1), \
             $4, $5, $6, $7, $8, $9 \
         WHERE NOT EXISTS ( \
             SELECT 1 FROM store.products WHERE lower(btrim(name)) = lower(btrim($1)) \
         )",
    )
    .bind(product.name)
    .bind(product.product_type)
    .bind(product.category)
    .bind(product.description)
    .bind(Money::parse(product.original_price)?)
    .bind(Money::parse(product.price)?)
    .bind(Money::parse(product.shipping)?)
    .bind(product.digital)
    .bind(product.image_url)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_products_reference_known_rows() {
        for product in PRODUCTS {
            assert!(PRODUCT_TYPES.iter().any(|t| t.name == product.product_type));
            assert!(CATEGORIES.iter().any(|c| c.name == product.category));
        }
    }

    #[test]
    fn sample_prices_are_valid_and_digital_items_ship_free() {
        for product in PRODUCTS {
            let price = Money::parse(product.price).unwrap_or(Money::ZERO);
            let original = Money::parse(product.original_price).unwrap_or(Money::ZERO);
            assert!(price <= original, "{} is priced above its original", product.name);
            if product.digital {
                assert_eq!(Money::parse(product.shipping).ok(), Some(Money::ZERO));
            }
        }
    }
}
