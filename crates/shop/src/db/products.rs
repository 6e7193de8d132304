//! Database operations for the product catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::{CategoryId, CurrencyCode, ProductId, Slug};

use super::{RepositoryError, parse_status};
use crate::models::product::{CreateProductInput, Product, ProductFilter, UpdateProductInput};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    price: Decimal,
    currency: String,
    stock: i32,
    reserved_stock: i32,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let slug = Slug::parse(&self.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;
        let currency: CurrencyCode = parse_status(&self.currency, "currency")?;
        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            slug,
            description: self.description,
            price: self.price,
            currency,
            stock: self.stock,
            reserved_stock: self.reserved_stock,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price, currency, \
                               stock, reserved_stock, active, created_at, updated_at";

/// How many slug-suffix attempts to make before giving up on a title.
const MAX_SLUG_ATTEMPTS: u32 = 20;

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product, deriving a unique slug from its name.
    ///
    /// Slug collisions are resolved by appending `-2`, `-3`, ... up to a
    /// bounded number of attempts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if no free slug could be found.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &CreateProductInput) -> Result<Product, RepositoryError> {
        let base = Slug::from_title(&input.name);

        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = if attempt == 0 {
                base.clone()
            } else {
                base.with_suffix(attempt + 1)
            };

            let result = sqlx::query_as::<_, ProductRow>(&format!(
                r"
                INSERT INTO product (name, slug, description, price, currency, stock)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {PRODUCT_COLUMNS}
                "
            ))
            .bind(&input.name)
            .bind(slug.as_str())
            .bind(&input.description)
            .bind(input.price)
            .bind(input.currency.code())
            .bind(input.stock)
            .fetch_one(self.pool)
            .await;

            match result {
                Ok(row) => {
                    let product = row.into_product()?;
                    self.set_categories(product.id, &input.category_ids).await?;
                    return Ok(product);
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {}
                Err(e) => return Err(RepositoryError::Database(e)),
            }
        }

        Err(RepositoryError::Conflict(format!(
            "could not find a free slug for '{base}'"
        )))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Get a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// List products with filtering and pagination.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let include_inactive = filter.include_inactive.unwrap_or(false);
        let category_slug = filter.category.as_ref().map(Slug::as_str);

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT DISTINCT
                p.id, p.name, p.slug, p.description, p.price, p.currency,
                p.stock, p.reserved_stock, p.active, p.created_at, p.updated_at
            FROM product p
            LEFT JOIN product_category pc ON pc.product_id = p.id
            LEFT JOIN category c ON c.id = pc.category_id
            WHERE ($1 OR p.active)
              AND ($2::text IS NULL OR c.slug = $2)
            ORDER BY p.id ASC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(include_inactive)
        .bind(category_slug)
        .bind(filter.clamped_limit())
        .bind(filter.clamped_offset())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Update a product. Absent fields keep their current value.
    ///
    /// Stock updates clamp `reserved_stock` into the new bound is NOT done
    /// here; lowering `stock` below `reserved_stock` fails the CHECK and
    /// surfaces as a conflict.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new stock would drop below
    /// currently reserved stock.
    pub async fn update(
        &self,
        id: ProductId,
        input: &UpdateProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE product
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                stock = COALESCE($5, stock),
                active = COALESCE($6, active)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.stock)
        .bind(input.active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_check_violation()
            {
                return RepositoryError::Conflict(
                    "stock cannot drop below currently reserved stock".to_string(),
                );
            }
            RepositoryError::Database(e)
        })?
        .ok_or(RepositoryError::NotFound)?;

        row.into_product()
    }

    /// Delete a product, or deactivate it when order/invoice history
    /// references it.
    ///
    /// # Returns
    ///
    /// `true` if the row was deleted, `false` if it was deactivated instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete_or_deactivate(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(true),
            Ok(_) => Err(RepositoryError::NotFound),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                let done = sqlx::query("UPDATE product SET active = FALSE WHERE id = $1")
                    .bind(id.as_i32())
                    .execute(self.pool)
                    .await?;
                if done.rows_affected() == 0 {
                    return Err(RepositoryError::NotFound);
                }
                Ok(false)
            }
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }

    /// Replace a product's category assignments.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn set_categories(
        &self,
        id: ProductId,
        category_ids: &[CategoryId],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_category WHERE product_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        for category_id in category_ids {
            sqlx::query(
                "INSERT INTO product_category (product_id, category_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(id.as_i32())
            .bind(category_id.as_i32())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
