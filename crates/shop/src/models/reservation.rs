//! Stock reservation model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tamarind_core::{InvoiceId, ProductId, ReservationId, ReservationStatus};

/// A temporary hold on product stock pending payment completion.
///
/// Rows are never deleted: a reservation is created `reserved` and ends up
/// `converted` (stock permanently decremented, order created) or `released`
/// (hold returned to available stock).
#[derive(Debug, Clone, Serialize)]
pub struct StockReservation {
    pub id: ReservationId,
    pub product_id: ProductId,
    pub invoice_id: InvoiceId,
    pub quantity: i32,
    pub status: ReservationStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockReservation {
    /// Whether the hold has passed its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Reserved && self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reservation(status: ReservationStatus, expires_at: DateTime<Utc>) -> StockReservation {
        StockReservation {
            id: ReservationId::new(1),
            product_id: ProductId::new(1),
            invoice_id: InvoiceId::new(1),
            quantity: 2,
            status,
            expires_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let past = now - Duration::minutes(1);
        let future = now + Duration::minutes(15);

        assert!(reservation(ReservationStatus::Reserved, past).is_expired(now));
        assert!(!reservation(ReservationStatus::Reserved, future).is_expired(now));
        // Terminal reservations no longer hold stock, expired or not.
        assert!(!reservation(ReservationStatus::Released, past).is_expired(now));
        assert!(!reservation(ReservationStatus::Converted, past).is_expired(now));
    }
}
