//! Database operations for orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use tamarind_core::{
    CurrencyCode, InvoiceId, OrderId, OrderItemId, OrderStatus, ProductId, UserId,
};

use super::{RepositoryError, parse_status};
use crate::models::invoice::Invoice;
use crate::models::order::{Order, OrderItem, OrderWithItems};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    invoice_id: i32,
    total: Decimal,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let currency: CurrencyCode = parse_status(&self.currency, "currency")?;
        let status: OrderStatus = parse_status(&self.status, "order status")?;
        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            invoice_id: InvoiceId::new(self.invoice_id),
            total: self.total,
            currency,
            status,
            created_at: self.created_at,
        })
    }
}

/// Internal row type for order item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, invoice_id, total, currency, status, created_at";

/// Create the order for a paid invoice, copying its items.
///
/// Runs inside the webhook's commit transaction. If the invoice already has
/// an order (repeat webhook delivery), the existing order is returned and
/// nothing is written.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn create_order_from_invoice(
    conn: &mut PgConnection,
    invoice: &Invoice,
) -> Result<Order, RepositoryError> {
    if let Some(existing) = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM shop_order WHERE invoice_id = $1"
    ))
    .bind(invoice.id.as_i32())
    .fetch_optional(&mut *conn)
    .await?
    {
        return existing.into_order();
    }

    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r"
        INSERT INTO shop_order (user_id, invoice_id, total, currency, status)
        VALUES ($1, $2, $3, $4, 'paid')
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(invoice.user_id.as_i32())
    .bind(invoice.id.as_i32())
    .bind(invoice.amount)
    .bind(invoice.currency.code())
    .fetch_one(&mut *conn)
    .await?;

    let order = row.into_order()?;

    sqlx::query(
        r"
        INSERT INTO order_item (order_id, product_id, quantity, unit_price)
        SELECT $1, product_id, quantity, unit_price
        FROM invoice_item
        WHERE invoice_id = $2
        ",
    )
    .bind(order.id.as_i32())
    .bind(invoice.id.as_i32())
    .execute(&mut *conn)
    .await?;

    Ok(order)
}

/// Repository for order reads.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM shop_order
            WHERE user_id = $1
            ORDER BY created_at DESC
            "
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Get one of a user's orders with its items.
    ///
    /// The owner filter is part of the query, so another user's order id
    /// behaves exactly like a missing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist or
    /// belongs to someone else.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderWithItems, RepositoryError> {
        let order = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop_order WHERE id = $1 AND user_id = $2"
        ))
        .bind(order_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .into_order()?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM order_item
            WHERE order_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(OrderWithItems {
            order,
            items: items.into_iter().map(Into::into).collect(),
        })
    }
}
