//! Product catalog models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_core::{CategoryId, CurrencyCode, ProductId, Slug};

/// A sellable product.
///
/// `stock` is the on-hand quantity; `reserved_stock` is the portion of it
/// currently held by open checkouts. The invariant
/// `0 <= reserved_stock <= stock` is maintained under row locks by the
/// inventory repository and backed by a CHECK constraint.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub price: Decimal,
    pub currency: CurrencyCode,
    pub stock: i32,
    pub reserved_stock: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Units that can still be reserved.
    #[must_use]
    pub const fn available(&self) -> i32 {
        self.stock - self.reserved_stock
    }
}

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
}

/// Payload for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

/// Payload for updating a product. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub active: Option<bool>,
}

/// Listing filter for products.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<Slug>,
    /// Defaults to active-only for the public listing.
    pub include_inactive: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductFilter {
    /// Hard cap on page size.
    pub const MAX_LIMIT: i64 = 100;

    /// Clamp the requested limit into `1..=MAX_LIMIT`.
    #[must_use]
    pub fn clamped_limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, Self::MAX_LIMIT)
    }

    /// Offset, floored at zero.
    #[must_use]
    pub fn clamped_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available() {
        let product = Product {
            id: ProductId::new(1),
            name: "Crate of Pears".to_string(),
            slug: Slug::from_title("Crate of Pears"),
            description: String::new(),
            price: Decimal::new(1250, 2),
            currency: CurrencyCode::USD,
            stock: 10,
            reserved_stock: 4,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(product.available(), 6);
    }

    #[test]
    fn test_filter_clamps() {
        let filter = ProductFilter {
            limit: Some(10_000),
            offset: Some(-5),
            ..ProductFilter::default()
        };
        assert_eq!(filter.clamped_limit(), ProductFilter::MAX_LIMIT);
        assert_eq!(filter.clamped_offset(), 0);

        let filter = ProductFilter::default();
        assert_eq!(filter.clamped_limit(), 50);
        assert_eq!(filter.clamped_offset(), 0);

        let filter = ProductFilter {
            limit: Some(0),
            ..ProductFilter::default()
        };
        assert_eq!(filter.clamped_limit(), 1);
    }
}
