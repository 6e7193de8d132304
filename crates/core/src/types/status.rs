//! Status enums for various entities.
//!
//! Statuses are stored as lowercase TEXT in the database; repositories parse
//! them back through `FromStr` and treat unknown values as data corruption.

use serde::{Deserialize, Serialize};

/// Lifecycle of a stock reservation.
///
/// A reservation is created as `Reserved` when checkout holds stock, and
/// moves exactly once to `Converted` (payment succeeded, stock decremented)
/// or `Released` (payment failed, voided, or the hold expired). There is no
/// path back: rows are never deleted and never return to `Reserved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Reserved,
    Converted,
    Released,
}

impl ReservationStatus {
    /// Whether a transition from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Reserved, Self::Converted) | (Self::Reserved, Self::Released)
        )
    }

    /// Whether the reservation still holds stock.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Reserved)
    }
}

/// Order lifecycle.
///
/// Orders are only created once payment has been confirmed, so `Paid` is the
/// common case; `Pending` covers manually created orders awaiting capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

/// Invoice lifecycle, mirroring the payment provider's states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Open,
    Paid,
    Void,
    Uncollectible,
}

/// Blog post lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

macro_rules! impl_status_str {
    ($ty:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $s)),+
                }
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(format!(concat!("invalid ", stringify!($ty), ": {}"), s)),
                }
            }
        }
    };
}

impl_status_str!(ReservationStatus {
    Reserved => "reserved",
    Converted => "converted",
    Released => "released",
});

impl_status_str!(OrderStatus {
    Pending => "pending",
    Paid => "paid",
    Cancelled => "cancelled",
});

impl_status_str!(InvoiceStatus {
    Open => "open",
    Paid => "paid",
    Void => "void",
    Uncollectible => "uncollectible",
});

impl_status_str!(PostStatus {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_transitions_one_way() {
        use ReservationStatus::{Converted, Released, Reserved};

        assert!(Reserved.can_transition_to(Converted));
        assert!(Reserved.can_transition_to(Released));

        // Terminal states never move again, and nothing returns to Reserved.
        for terminal in [Converted, Released] {
            for next in [Reserved, Converted, Released] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!Reserved.can_transition_to(Reserved));
    }

    #[test]
    fn test_reservation_is_active() {
        assert!(ReservationStatus::Reserved.is_active());
        assert!(!ReservationStatus::Converted.is_active());
        assert!(!ReservationStatus::Released.is_active());
    }

    #[test]
    fn test_status_str_roundtrip() {
        for status in [
            ReservationStatus::Reserved,
            ReservationStatus::Converted,
            ReservationStatus::Released,
        ] {
            let parsed: ReservationStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }

        let parsed: InvoiceStatus = "uncollectible".parse().unwrap();
        assert_eq!(parsed, InvoiceStatus::Uncollectible);

        assert!("bogus".parse::<OrderStatus>().is_err());
        assert!("".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&ReservationStatus::Reserved).unwrap();
        assert_eq!(json, "\"reserved\"");
        let json = serde_json::to_string(&PostStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
    }
}
