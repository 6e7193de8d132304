//! Checkout orchestration.
//!
//! A checkout runs in two acts:
//!
//! 1. **Local transaction** - price the cart into an invoice and hold stock
//!    (`reserve_stock`). Either everything is held or nothing is.
//! 2. **Provider round trip** - create the invoice with the payment
//!    provider. If the provider rejects it, the holds are released and the
//!    local invoice voided (the compensating path).
//!
//! The webhook handlers then finish the story: `handle_paid` converts the
//! holds into an order, `handle_failed` releases them. Both are idempotent
//! because the underlying inventory operations only touch rows still
//! `reserved`.

use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use tamarind_core::{CurrencyCode, InvoiceId, InvoiceStatus};

use crate::db::carts::CartRepository;
use crate::db::inventory::{self, ReserveLine};
use crate::db::invoices::{self, InvoiceLine, InvoiceRepository};
use crate::db::orders;
use crate::error::{AppError, Result};
use crate::models::cart::{CartLine, CartWithItems};
use crate::models::invoice::Invoice;
use crate::models::order::Order;
use crate::models::user::CurrentUser;
use crate::stripe::StripeClient;

/// Response body for a successful checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    /// Where the customer completes payment.
    pub payment_url: Option<String>,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    stripe: &'a StripeClient,
    reservation_ttl: std::time::Duration,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        stripe: &'a StripeClient,
        reservation_ttl: std::time::Duration,
    ) -> Self {
        Self {
            pool,
            stripe,
            reservation_ttl,
        }
    }

    /// Run a checkout for the user's cart.
    ///
    /// # Errors
    ///
    /// - `NotFound` - unknown cart token
    /// - `Unauthorized` - cart belongs to another user
    /// - `BadRequest` - empty cart or mixed currencies
    /// - `InsufficientStock` - a line exceeds available stock
    /// - `Payment` - the provider rejected the invoice (holds are released)
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn begin(&self, user: &CurrentUser, cart_token: Uuid) -> Result<CheckoutResponse> {
        let carts = CartRepository::new(self.pool);

        let cart = carts
            .get_by_token(cart_token)
            .await?
            .ok_or_else(|| AppError::NotFound("cart".to_string()))?;

        match cart.user_id {
            None => carts.attach_user(cart.id, user.id).await?,
            Some(owner) if owner == user.id => {}
            Some(_) => {
                return Err(AppError::Unauthorized(
                    "cart belongs to another user".to_string(),
                ));
            }
        }

        let lines = carts.list_lines(cart.id).await?;
        if lines.is_empty() {
            return Err(AppError::BadRequest("cart is empty".to_string()));
        }
        let currency = single_currency(&lines)?;
        let subtotal = CartWithItems::subtotal_of(&lines);

        let expires_at = Utc::now()
            + ChronoDuration::from_std(self.reservation_ttl)
                .map_err(|e| AppError::Internal(format!("invalid reservation ttl: {e}")))?;

        // Act one: invoice + stock holds, atomically.
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let invoice =
            invoices::create_invoice(&mut tx, user.id, cart.id, subtotal, currency).await?;

        let invoice_lines: Vec<InvoiceLine> = lines
            .iter()
            .map(|line| InvoiceLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();
        invoices::create_invoice_items(&mut tx, invoice.id, &invoice_lines).await?;

        let reserve_lines: Vec<ReserveLine> = lines
            .iter()
            .map(|line| ReserveLine {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect();
        inventory::reserve_stock(&mut tx, invoice.id, &reserve_lines, expires_at).await?;

        tx.commit().await.map_err(db_err)?;

        info!(invoice_id = %invoice.id, amount = %subtotal, "Stock reserved for checkout");

        // Act two: the provider round trip, with a compensating release on
        // failure.
        let provider_invoice = match self
            .stripe
            .create_invoice(invoice.id, subtotal, currency, user.email.as_str())
            .await
        {
            Ok(provider_invoice) => provider_invoice,
            Err(e) => {
                warn!(invoice_id = %invoice.id, error = %e, "Provider rejected invoice, releasing holds");
                self.release_and_void(invoice.id).await?;
                return Err(AppError::Payment(e));
            }
        };

        let invoice_repo = InvoiceRepository::new(self.pool);
        invoice_repo
            .set_provider_invoice_id(invoice.id, &provider_invoice.id)
            .await?;

        carts.clear(cart.id).await?;

        Ok(CheckoutResponse {
            invoice_id: invoice.id,
            amount: subtotal,
            currency,
            payment_url: provider_invoice.hosted_invoice_url,
        })
    }

    /// Payment succeeded: convert the holds and create the order.
    ///
    /// Idempotent; a repeat delivery returns the already-created order.
    ///
    /// # Errors
    ///
    /// Returns `Database` / `InsufficientStock` errors from the commit.
    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    pub async fn handle_paid(&self, invoice: &Invoice) -> Result<Order> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let converted = inventory::commit_stock(&mut tx, invoice.id).await?;
        let order = orders::create_order_from_invoice(&mut tx, invoice).await?;
        invoices::set_status(&mut tx, invoice.id, InvoiceStatus::Paid).await?;

        tx.commit().await.map_err(db_err)?;

        info!(
            order_id = %order.id,
            converted = converted.len(),
            "Reservations converted and order created"
        );

        Ok(order)
    }

    /// Payment failed or the invoice was voided: release the holds.
    ///
    /// # Errors
    ///
    /// Returns `Database` errors from the release.
    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    pub async fn handle_failed(&self, invoice: &Invoice) -> Result<()> {
        self.release_and_void(invoice.id).await?;
        info!("Reservations released after failed payment");
        Ok(())
    }

    /// Release every hold of an invoice and void it if still open.
    async fn release_and_void(&self, invoice_id: InvoiceId) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let released = inventory::release_stock(&mut tx, invoice_id).await?;
        // Paid invoices stay paid; only open ones become void.
        sqlx::query("UPDATE invoice SET status = 'void' WHERE id = $1 AND status = 'open'")
            .bind(invoice_id.as_i32())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(released)
    }

    /// Release all expired holds and void their invoices.
    ///
    /// Called by the background sweeper. Returns the number of invoices
    /// whose holds were released.
    ///
    /// # Errors
    ///
    /// Returns `Database` errors from the sweep transaction.
    pub async fn release_expired(&self, now: chrono::DateTime<Utc>) -> Result<usize> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let invoice_ids = inventory::release_expired_reservations(&mut tx, now).await?;

        for invoice_id in &invoice_ids {
            sqlx::query("UPDATE invoice SET status = 'void' WHERE id = $1 AND status = 'open'")
                .bind(invoice_id.as_i32())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        Ok(invoice_ids.len())
    }
}

/// All cart lines must share one currency; mixed carts can't be invoiced.
fn single_currency(lines: &[CartLine]) -> Result<CurrencyCode> {
    let mut iter = lines.iter();
    let first = iter
        .next()
        .map(|l| l.currency)
        .ok_or_else(|| AppError::BadRequest("cart is empty".to_string()))?;

    if iter.any(|l| l.currency != first) {
        return Err(AppError::BadRequest(
            "cart mixes currencies; remove items priced in a different currency".to_string(),
        ));
    }

    Ok(first)
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::Database(crate::db::RepositoryError::Database(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tamarind_core::{CartItemId, ProductId};

    fn line(currency: CurrencyCode) -> CartLine {
        CartLine {
            item_id: CartItemId::new(1),
            product_id: ProductId::new(1),
            name: "test".to_string(),
            quantity: 1,
            unit_price: Decimal::ONE,
            currency,
            line_total: Decimal::ONE,
        }
    }

    #[test]
    fn test_single_currency_ok() {
        let lines = vec![line(CurrencyCode::USD), line(CurrencyCode::USD)];
        assert_eq!(
            single_currency(&lines).expect("single currency"),
            CurrencyCode::USD
        );
    }

    #[test]
    fn test_single_currency_mixed() {
        let lines = vec![line(CurrencyCode::USD), line(CurrencyCode::EUR)];
        assert!(matches!(
            single_currency(&lines),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_single_currency_empty() {
        assert!(matches!(single_currency(&[]), Err(AppError::BadRequest(_))));
    }
}
