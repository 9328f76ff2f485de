//! Catalog reads: product types, categories and products.

use sqlx::{PgPool, Postgres, QueryBuilder};

use marketstall_core::{CategoryId, Money, ProductId, ProductTypeId};

use super::{RepositoryError, contains_pattern};
use crate::models::{Category, Product, ProductType};

const PRODUCT_COLUMNS: &str = "id, name, product_type_id, category_id, description, \
     original_price, price, shipping, digital, image_url, added_at";

/// Criteria for the filtered catalog. `None` fields are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub product_type: Option<ProductTypeId>,
    pub category: Option<CategoryId>,
    pub price_min: Option<Money>,
    pub price_max: Option<Money>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
}

/// Repository for catalog queries.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Product types in id order, optionally limited.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_types(&self, limit: Option<i64>) -> Result<Vec<ProductType>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductType>(
            "SELECT id, name, image_url FROM store.product_types ORDER BY id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// All categories in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, image_url FROM store.categories ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Number of products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_products(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store.products")
            .fetch_one(self.pool)
            .await?;

        u64::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative row count {count}")))
    }

    /// One page of all products, in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products_page(&self, offset: i64, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products ORDER BY id OFFSET $1 LIMIT $2"
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(offset)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// All products, in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM store.products ORDER BY id");
        let rows = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// The `limit` cheapest products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cheapest(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products ORDER BY price ASC, id LIMIT $1"
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// The `limit` most recently added products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products ORDER BY added_at DESC, id DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Products matching every set criterion of `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn filter_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM store.products WHERE TRUE"));

        if let Some(product_type) = filter.product_type {
            qb.push(" AND product_type_id = ").push_bind(product_type);
        }
        if let Some(category) = filter.category {
            qb.push(" AND category_id = ").push_bind(category);
        }
        if let Some(min) = filter.price_min {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filter.price_max {
            qb.push(" AND price <= ").push_bind(max);
        }
        if let Some(description) = &filter.description {
            qb.push(" AND description ILIKE ")
                .push_bind(contains_pattern(description))
                .push(" ESCAPE '\\'");
        }
        qb.push(" ORDER BY id");

        let rows = qb.build_query_as::<Product>().fetch_all(self.pool).await?;
        Ok(rows)
    }

    /// Products whose name or description contains `query`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products \
             WHERE name ILIKE $1 ESCAPE '\\' OR description ILIKE $1 ESCAPE '\\' \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(contains_pattern(query))
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM store.products WHERE id = $1");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Products with the given IDs. Unknown IDs are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM store.products WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(raw)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }
}
