//! Cart models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use tamarind_core::{CartId, CartItemId, CurrencyCode, ProductId, UserId};

/// A shopping cart, addressed by its opaque token.
///
/// Anonymous carts carry only the token; carts created by a logged-in user
/// also record the owner.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: Option<UserId>,
    pub token: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line in a cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A cart line joined with current product data, as priced at read time.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub item_id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub currency: CurrencyCode,
    pub line_total: Decimal,
}

/// A cart with its lines and subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct CartWithItems {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
}

impl CartWithItems {
    /// Sum line totals into a subtotal. Lines are priced in one currency.
    #[must_use]
    pub fn subtotal_of(lines: &[CartLine]) -> Decimal {
        lines.iter().map(|l| l.line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, unit_price: Decimal) -> CartLine {
        CartLine {
            item_id: CartItemId::new(1),
            product_id: ProductId::new(1),
            name: "test".to_string(),
            quantity,
            unit_price,
            currency: CurrencyCode::USD,
            line_total: unit_price * Decimal::from(quantity),
        }
    }

    #[test]
    fn test_subtotal() {
        let lines = vec![
            line(2, Decimal::new(1050, 2)), // 21.00
            line(1, Decimal::new(399, 2)),  // 3.99
        ];
        assert_eq!(CartWithItems::subtotal_of(&lines), Decimal::new(2499, 2));
    }

    #[test]
    fn test_subtotal_empty() {
        assert_eq!(CartWithItems::subtotal_of(&[]), Decimal::ZERO);
    }
}
