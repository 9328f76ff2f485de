//! Catalog writes: products, categories and product types.

use sqlx::{PgPool, Postgres, QueryBuilder};

use marketstall_core::ProductId;

use super::{RepositoryError, contains_pattern};
use crate::models::{AdminProduct, Choice, ChoiceInput, ChoiceKind, ProductInput};

const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.product_type_id, p.category_id, \
     pt.name AS product_type_name, c.name AS category_name, p.description, \
     p.original_price, p.price, p.shipping, p.digital, p.image_url, p.added_at \
     FROM store.products p \
     LEFT JOIN store.product_types pt ON pt.id = p.product_type_id \
     LEFT JOIN store.categories c ON c.id = p.category_id";

/// Repository for catalog management.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Products whose name contains `search`, counted for pagination.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_products(&self, search: Option<&str>) -> Result<u64, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM store.products p");
        push_name_search(&mut qb, search);
        let count: i64 = qb.build_query_scalar().fetch_one(self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// One page of products, newest first, optionally filtered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AdminProduct>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        push_name_search(&mut qb, search);
        qb.push(" ORDER BY p.added_at DESC, p.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build_query_as::<AdminProduct>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<AdminProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminProduct>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a product and return it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_product(&self, input: &ProductInput) -> Result<AdminProduct, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            "INSERT INTO store.products \
                 (name, product_type_id, category_id, description, original_price, \
                  price, shipping, digital, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(&input.name)
        .bind(input.product_type_id)
        .bind(input.category_id)
        .bind(&input.description)
        .bind(input.original_price)
        .bind(input.price)
        .bind(input.shipping)
        .bind(input.digital)
        .bind(&input.image_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product"))?;

        self.get_product(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Overwrite a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE store.products SET \
                 name = $2, product_type_id = $3, category_id = $4, description = $5, \
                 original_price = $6, price = $7, shipping = $8, digital = $9, image_url = $10 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.product_type_id)
        .bind(input.category_id)
        .bind(&input.description)
        .bind(input.original_price)
        .bind(input.price)
        .bind(input.shipping)
        .bind(input.digital)
        .bind(&input.image_url)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a product. Order items keep their row with a null product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Whether another product already uses `name`, ignoring case and
    /// surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_name_exists(
        &self,
        name: &str,
        exclude: Option<ProductId>,
    ) -> Result<bool, RepositoryError> {
        self.name_exists("store.products", name, exclude.map(i32::from))
            .await
    }

    /// Number of products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_total(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM store.products")
            .fetch_one(self.pool)
            .await?)
    }

    // =========================================================================
    // Categories and product types
    // =========================================================================

    /// All rows of `kind` with their product counts, in name order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_choices(&self, kind: ChoiceKind) -> Result<Vec<Choice>, RepositoryError> {
        let column = product_column(kind);
        let rows = sqlx::query_as::<_, Choice>(&format!(
            "SELECT t.id, t.name, t.image_url, \
                 (SELECT COUNT(*) FROM store.products p WHERE p.{column} = t.id) AS product_count \
             FROM {table} t \
             ORDER BY lower(t.name) NULLS LAST, t.id",
            table = kind.table(),
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get one row of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_choice(&self, kind: ChoiceKind, id: i32) -> Result<Option<Choice>, RepositoryError> {
        let column = product_column(kind);
        let row = sqlx::query_as::<_, Choice>(&format!(
            "SELECT t.id, t.name, t.image_url, \
                 (SELECT COUNT(*) FROM store.products p WHERE p.{column} = t.id) AS product_count \
             FROM {table} t WHERE t.id = $1",
            table = kind.table(),
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a row of `kind` and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create_choice(&self, kind: ChoiceKind, input: &ChoiceInput) -> Result<i32, RepositoryError> {
        let id = sqlx::query_scalar(&format!(
            "INSERT INTO {} (name, image_url) VALUES ($1, $2) RETURNING id",
            kind.table()
        ))
        .bind(&input.name)
        .bind(&input.image_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, kind.label()))?;
        Ok(id)
    }

    /// Overwrite a row of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist.
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn update_choice(
        &self,
        kind: ChoiceKind,
        id: i32,
        input: &ChoiceInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET name = $2, image_url = $3 WHERE id = $1",
            kind.table()
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.image_url)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, kind.label()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a row of `kind`. Its products are kept, ungrouped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist.
    pub async fn delete_choice(&self, kind: ChoiceKind, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Whether another row of `kind` already uses `name`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn choice_name_exists(
        &self,
        kind: ChoiceKind,
        name: &str,
        exclude: Option<i32>,
    ) -> Result<bool, RepositoryError> {
        self.name_exists(kind.table(), name, exclude).await
    }

    async fn name_exists(
        &self,
        table: &str,
        name: &str,
        exclude: Option<i32>,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar(&format!(
            "SELECT EXISTS ( \
                 SELECT 1 FROM {table} \
                 WHERE lower(btrim(name)) = lower(btrim($1)) \
                   AND ($2::int IS NULL OR id <> $2) \
             )"
        ))
        .bind(name)
        .bind(exclude)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }
}

/// Foreign key column on `store.products` referencing `kind`.
const fn product_column(kind: ChoiceKind) -> &'static str {
    match kind {
        ChoiceKind::Category => "category_id",
        ChoiceKind::ProductType => "product_type_id",
    }
}

fn push_name_search(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        qb.push(" WHERE p.name ILIKE ")
            .push_bind(contains_pattern(term))
            .push(" ESCAPE '\\'");
    }
}
