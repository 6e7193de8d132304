//! Invoice models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tamarind_core::{CartId, CurrencyCode, InvoiceId, InvoiceItemId, InvoiceStatus, ProductId, UserId};

/// An invoice created at checkout.
///
/// `provider_invoice_id` is set once the payment provider accepts the
/// invoice; webhook events are correlated through it.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub user_id: UserId,
    pub cart_id: CartId,
    pub provider_invoice_id: Option<String>,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A priced line on an invoice, frozen at checkout time.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub invoice_id: InvoiceId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
}
