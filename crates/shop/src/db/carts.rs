//! Database operations for carts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use tamarind_core::{CartId, CartItemId, CurrencyCode, ProductId, UserId};

use super::{RepositoryError, parse_status};
use crate::models::cart::{Cart, CartItem, CartLine};

/// Internal row type for cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: Option<i32>,
    token: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            token: row.token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for cart item queries.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    cart_id: i32,
    product_id: i32,
    quantity: i32,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            cart_id: CartId::new(row.cart_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
        }
    }
}

/// Internal row type for cart lines joined with product data.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    item_id: i32,
    product_id: i32,
    name: String,
    quantity: i32,
    unit_price: Decimal,
    currency: String,
}

impl CartLineRow {
    fn into_line(self) -> Result<CartLine, RepositoryError> {
        let currency: CurrencyCode = parse_status(&self.currency, "currency")?;
        let line_total = self.unit_price * Decimal::from(self.quantity);
        Ok(CartLine {
            item_id: CartItemId::new(self.item_id),
            product_id: ProductId::new(self.product_id),
            name: self.name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            currency,
            line_total,
        })
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a cart with a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, user_id: Option<UserId>) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO cart (user_id, token)
            VALUES ($1, $2)
            RETURNING id, user_id, token, created_at, updated_at
            ",
        )
        .bind(user_id.map(|id| id.as_i32()))
        .bind(Uuid::new_v4())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get a cart by its token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_token(&self, token: Uuid) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, user_id, token, created_at, updated_at
            FROM cart
            WHERE token = $1
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Attach a user to an anonymous cart (e.g. login during checkout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart doesn't exist.
    pub async fn attach_user(&self, id: CartId, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cart SET user_id = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Add a product to a cart, summing quantities on repeat adds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails (including
    /// foreign-key violations for unknown products).
    pub async fn upsert_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            INSERT INTO cart_item (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = cart_item.quantity + EXCLUDED.quantity
            RETURNING id, cart_id, product_id, quantity
            ",
        )
        .bind(cart_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Set a cart item's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item isn't in this cart.
    pub async fn set_item_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            UPDATE cart_item
            SET quantity = $3
            WHERE id = $2 AND cart_id = $1
            RETURNING id, cart_id, product_id, quantity
            ",
        )
        .bind(cart_id.as_i32())
        .bind(item_id.as_i32())
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Remove an item from a cart.
    ///
    /// # Returns
    ///
    /// `true` if the item was removed, `false` if it wasn't in this cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE id = $2 AND cart_id = $1")
            .bind(cart_id.as_i32())
            .bind(item_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a cart's lines joined with current product names and prices.
    ///
    /// Only active products are priced; a deactivated product drops out of
    /// the cart view (and checkout re-validates against the same rule).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT
                ci.id AS item_id,
                ci.product_id,
                p.name,
                ci.quantity,
                p.price AS unit_price,
                p.currency
            FROM cart_item ci
            INNER JOIN product p ON p.id = ci.product_id
            WHERE ci.cart_id = $1 AND p.active
            ORDER BY ci.id ASC
            ",
        )
        .bind(cart_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLineRow::into_line).collect()
    }

    /// Empty a cart after a successful checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_item WHERE cart_id = $1")
            .bind(cart_id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
