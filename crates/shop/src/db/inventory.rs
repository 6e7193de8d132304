//! Stock reservation accounting.
//!
//! The three operations here — reserve, commit, release — are the whole
//! lifecycle of a stock hold. Each runs inside a caller-owned transaction
//! and takes `SELECT ... FOR UPDATE` row locks; product rows are always
//! locked in ascending id order so concurrent checkouts cannot deadlock.
//!
//! Counters on `product`:
//! - `stock` - on-hand units, decremented only by commit
//! - `reserved_stock` - units held by open checkouts; reserve increments,
//!   commit and release decrement
//!
//! `0 <= reserved_stock <= stock` holds at every commit point; a CHECK
//! constraint backs the code.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use thiserror::Error;

use tamarind_core::{InvoiceId, ProductId, ReservationId, ReservationStatus};

/// Errors from reservation accounting.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Not enough unreserved stock to satisfy a line.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    Insufficient {
        product_id: ProductId,
        requested: i32,
        available: i32,
    },

    /// The product does not exist or is inactive.
    #[error("product {0} is unavailable")]
    Unavailable(ProductId),

    /// A requested quantity was zero or negative.
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i32),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A line to reserve: product and quantity.
#[derive(Debug, Clone, Copy)]
pub struct ReserveLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A reservation converted by [`commit_stock`].
#[derive(Debug, Clone, Copy)]
pub struct ConvertedLine {
    pub reservation_id: ReservationId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Locked view of a product's counters.
#[derive(Debug, sqlx::FromRow)]
struct ProductCounters {
    stock: i32,
    reserved_stock: i32,
}

/// Locked view of a pending reservation.
#[derive(Debug, sqlx::FromRow)]
struct PendingReservation {
    id: i32,
    product_id: i32,
    invoice_id: i32,
    quantity: i32,
}

/// Hold stock for every line of an invoice.
///
/// For each line (in ascending product id order): locks the product row,
/// verifies `stock - reserved_stock >= quantity`, increments
/// `reserved_stock`, and inserts a `reserved` reservation row expiring at
/// `expires_at`. Any failure aborts the whole set; the caller's transaction
/// rolls back and no partial hold survives.
///
/// # Errors
///
/// Returns [`InventoryError::Insufficient`] naming the first short product,
/// [`InventoryError::Unavailable`] for unknown/inactive products, and
/// [`InventoryError::NonPositiveQuantity`] for bad line quantities.
pub async fn reserve_stock(
    conn: &mut PgConnection,
    invoice_id: InvoiceId,
    lines: &[ReserveLine],
    expires_at: DateTime<Utc>,
) -> Result<Vec<ReservationId>, InventoryError> {
    let mut sorted: Vec<ReserveLine> = lines.to_vec();
    sorted.sort_by_key(|line| line.product_id);

    let mut reservation_ids = Vec::with_capacity(sorted.len());

    for line in &sorted {
        if line.quantity <= 0 {
            return Err(InventoryError::NonPositiveQuantity(line.quantity));
        }

        let counters = sqlx::query_as::<_, ProductCounters>(
            r"
            SELECT stock, reserved_stock
            FROM product
            WHERE id = $1 AND active
            FOR UPDATE
            ",
        )
        .bind(line.product_id.as_i32())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(InventoryError::Unavailable(line.product_id))?;

        let available = counters.stock - counters.reserved_stock;
        if available < line.quantity {
            return Err(InventoryError::Insufficient {
                product_id: line.product_id,
                requested: line.quantity,
                available,
            });
        }

        sqlx::query("UPDATE product SET reserved_stock = reserved_stock + $2 WHERE id = $1")
            .bind(line.product_id.as_i32())
            .bind(line.quantity)
            .execute(&mut *conn)
            .await?;

        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO stock_reservation (product_id, invoice_id, quantity, status, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(line.product_id.as_i32())
        .bind(invoice_id.as_i32())
        .bind(line.quantity)
        .bind(ReservationStatus::Reserved.to_string())
        .bind(expires_at)
        .fetch_one(&mut *conn)
        .await?;

        reservation_ids.push(ReservationId::new(id));
    }

    Ok(reservation_ids)
}

/// Convert an invoice's holds into permanent stock decrements.
///
/// Locks the invoice's `reserved` reservations and their products, verifies
/// `stock >= quantity`, then decrements both `stock` and `reserved_stock`
/// and marks the reservations `converted`.
///
/// Idempotent: an invoice with no `reserved` reservations left (a repeated
/// webhook delivery) returns an empty vec and changes nothing.
///
/// # Errors
///
/// Returns [`InventoryError::Insufficient`] if on-hand stock somehow fell
/// below the held quantity (the hold itself prevents this; a violation
/// means counters were edited out-of-band).
pub async fn commit_stock(
    conn: &mut PgConnection,
    invoice_id: InvoiceId,
) -> Result<Vec<ConvertedLine>, InventoryError> {
    let pending = lock_pending(conn, Scope::Invoice(invoice_id), Utc::now()).await?;

    let mut converted = Vec::with_capacity(pending.len());

    for reservation in &pending {
        let product_id = ProductId::new(reservation.product_id);

        let counters = sqlx::query_as::<_, ProductCounters>(
            "SELECT stock, reserved_stock FROM product WHERE id = $1 FOR UPDATE",
        )
        .bind(reservation.product_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(InventoryError::Unavailable(product_id))?;

        if counters.stock < reservation.quantity {
            return Err(InventoryError::Insufficient {
                product_id,
                requested: reservation.quantity,
                available: counters.stock,
            });
        }

        sqlx::query(
            r"
            UPDATE product
            SET stock = stock - $2,
                reserved_stock = reserved_stock - $2
            WHERE id = $1
            ",
        )
        .bind(reservation.product_id)
        .bind(reservation.quantity)
        .execute(&mut *conn)
        .await?;

        mark(conn, reservation.id, ReservationStatus::Converted).await?;

        converted.push(ConvertedLine {
            reservation_id: ReservationId::new(reservation.id),
            product_id,
            quantity: reservation.quantity,
        });
    }

    Ok(converted)
}

/// Release all of an invoice's holds back to available stock.
///
/// Only rows still `reserved` are touched, so releasing after a commit (or
/// twice) is a no-op. `reserved_stock` is floored at zero.
///
/// # Errors
///
/// Returns [`InventoryError::Database`] if a query fails.
pub async fn release_stock(
    conn: &mut PgConnection,
    invoice_id: InvoiceId,
) -> Result<u64, InventoryError> {
    release(conn, Scope::Invoice(invoice_id), Utc::now()).await
}

/// Release every hold whose expiry has passed.
///
/// Returns the invoices whose holds were released, so the caller can void
/// them. Each expired reservation is released exactly once: the status
/// filter plus the row lock mean a second sweep finds nothing.
///
/// # Errors
///
/// Returns [`InventoryError::Database`] if a query fails.
pub async fn release_expired_reservations(
    conn: &mut PgConnection,
    now: DateTime<Utc>,
) -> Result<Vec<InvoiceId>, InventoryError> {
    let pending = lock_pending(conn, Scope::Expired, now).await?;

    let mut invoice_ids: Vec<InvoiceId> = Vec::new();

    for reservation in &pending {
        release_one(conn, reservation).await?;
        let invoice_id = InvoiceId::new(reservation.invoice_id);
        if !invoice_ids.contains(&invoice_id) {
            invoice_ids.push(invoice_id);
        }
    }

    Ok(invoice_ids)
}

/// Which pending reservations to lock.
enum Scope {
    /// All `reserved` rows of one invoice.
    Invoice(InvoiceId),
    /// All `reserved` rows past their expiry.
    Expired,
}

/// Lock pending reservations (and implicitly serialize with other
/// reserve/commit/release calls touching the same rows).
///
/// Ordered by product id so the subsequent product locks are taken in the
/// same order everywhere.
async fn lock_pending(
    conn: &mut PgConnection,
    scope: Scope,
    now: DateTime<Utc>,
) -> Result<Vec<PendingReservation>, InventoryError> {
    let rows = match scope {
        Scope::Invoice(invoice_id) => {
            sqlx::query_as::<_, PendingReservation>(
                r"
                SELECT id, product_id, invoice_id, quantity
                FROM stock_reservation
                WHERE invoice_id = $1 AND status = 'reserved'
                ORDER BY product_id ASC
                FOR UPDATE
                ",
            )
            .bind(invoice_id.as_i32())
            .fetch_all(&mut *conn)
            .await?
        }
        Scope::Expired => {
            sqlx::query_as::<_, PendingReservation>(
                r"
                SELECT id, product_id, invoice_id, quantity
                FROM stock_reservation
                WHERE status = 'reserved' AND expires_at <= $1
                ORDER BY product_id ASC
                FOR UPDATE
                ",
            )
            .bind(now)
            .fetch_all(&mut *conn)
            .await?
        }
    };

    Ok(rows)
}

async fn release(
    conn: &mut PgConnection,
    scope: Scope,
    now: DateTime<Utc>,
) -> Result<u64, InventoryError> {
    let pending = lock_pending(conn, scope, now).await?;

    for reservation in &pending {
        release_one(conn, reservation).await?;
    }

    Ok(pending.len() as u64)
}

/// Return one hold to available stock and mark it `released`.
async fn release_one(
    conn: &mut PgConnection,
    reservation: &PendingReservation,
) -> Result<(), InventoryError> {
    sqlx::query(
        r"
        UPDATE product
        SET reserved_stock = GREATEST(reserved_stock - $2, 0)
        WHERE id = $1
        ",
    )
    .bind(reservation.product_id)
    .bind(reservation.quantity)
    .execute(&mut *conn)
    .await?;

    mark(conn, reservation.id, ReservationStatus::Released).await
}

/// Move a `reserved` row to a terminal status.
async fn mark(
    conn: &mut PgConnection,
    reservation_id: i32,
    status: ReservationStatus,
) -> Result<(), InventoryError> {
    debug_assert!(ReservationStatus::Reserved.can_transition_to(status));

    sqlx::query(
        r"
        UPDATE stock_reservation
        SET status = $2
        WHERE id = $1 AND status = 'reserved'
        ",
    )
    .bind(reservation_id)
    .bind(status.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}
