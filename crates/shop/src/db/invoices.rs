//! Database operations for invoices.
//!
//! Invoice creation happens inside the checkout transaction, so the
//! creating functions take a `&mut PgConnection`; reads and status updates
//! go through [`InvoiceRepository`] on the pool.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use tamarind_core::{
    CartId, CurrencyCode, InvoiceId, InvoiceItemId, InvoiceStatus, ProductId, UserId,
};

use super::{RepositoryError, parse_status};
use crate::models::invoice::{Invoice, InvoiceItem};

/// Internal row type for invoice queries.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: i32,
    user_id: i32,
    cart_id: i32,
    provider_invoice_id: Option<String>,
    amount: Decimal,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InvoiceRow {
    fn into_invoice(self) -> Result<Invoice, RepositoryError> {
        let currency: CurrencyCode = parse_status(&self.currency, "currency")?;
        let status: InvoiceStatus = parse_status(&self.status, "invoice status")?;
        Ok(Invoice {
            id: InvoiceId::new(self.id),
            user_id: UserId::new(self.user_id),
            cart_id: CartId::new(self.cart_id),
            provider_invoice_id: self.provider_invoice_id,
            amount: self.amount,
            currency,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Internal row type for invoice item queries.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceItemRow {
    id: i32,
    invoice_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
}

impl From<InvoiceItemRow> for InvoiceItem {
    fn from(row: InvoiceItemRow) -> Self {
        Self {
            id: InvoiceItemId::new(row.id),
            invoice_id: InvoiceId::new(row.invoice_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

const INVOICE_COLUMNS: &str = "id, user_id, cart_id, provider_invoice_id, amount, currency, \
                               status, created_at, updated_at";

/// A line to freeze onto an invoice at checkout.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Create an invoice inside the checkout transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn create_invoice(
    conn: &mut PgConnection,
    user_id: UserId,
    cart_id: CartId,
    amount: Decimal,
    currency: CurrencyCode,
) -> Result<Invoice, RepositoryError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
        r"
        INSERT INTO invoice (user_id, cart_id, amount, currency, status)
        VALUES ($1, $2, $3, $4, 'open')
        RETURNING {INVOICE_COLUMNS}
        "
    ))
    .bind(user_id.as_i32())
    .bind(cart_id.as_i32())
    .bind(amount)
    .bind(currency.code())
    .fetch_one(&mut *conn)
    .await?;

    row.into_invoice()
}

/// Insert the invoice's priced lines.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn create_invoice_items(
    conn: &mut PgConnection,
    invoice_id: InvoiceId,
    lines: &[InvoiceLine],
) -> Result<(), RepositoryError> {
    for line in lines {
        sqlx::query(
            r"
            INSERT INTO invoice_item (invoice_id, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(invoice_id.as_i32())
        .bind(line.product_id.as_i32())
        .bind(line.quantity)
        .bind(line.unit_price)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// List an invoice's items inside a transaction (used to build the order).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_items(
    conn: &mut PgConnection,
    invoice_id: InvoiceId,
) -> Result<Vec<InvoiceItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, InvoiceItemRow>(
        r"
        SELECT id, invoice_id, product_id, quantity, unit_price
        FROM invoice_item
        WHERE invoice_id = $1
        ORDER BY id ASC
        ",
    )
    .bind(invoice_id.as_i32())
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Update an invoice's status inside a transaction.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the invoice doesn't exist.
pub async fn set_status(
    conn: &mut PgConnection,
    invoice_id: InvoiceId,
    status: InvoiceStatus,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE invoice SET status = $2 WHERE id = $1")
        .bind(invoice_id.as_i32())
        .bind(status.to_string())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Repository for invoice reads and pool-scoped updates.
pub struct InvoiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InvoiceRepository<'a> {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoice WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    /// Get an invoice by the payment provider's invoice id.
    ///
    /// Webhook events carry only the provider id; this is the correlation
    /// point back to local state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_provider_id(
        &self,
        provider_invoice_id: &str,
    ) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoice WHERE provider_invoice_id = $1"
        ))
        .bind(provider_invoice_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    /// Record the provider's invoice id after the provider accepts it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the invoice doesn't exist.
    pub async fn set_provider_invoice_id(
        &self,
        id: InvoiceId,
        provider_invoice_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE invoice SET provider_invoice_id = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(provider_invoice_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Update an invoice's status outside a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the invoice doesn't exist.
    pub async fn set_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        set_status(&mut conn, id, status).await
    }
}
