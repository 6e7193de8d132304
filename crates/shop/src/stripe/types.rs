//! Typed payloads for the payment provider API.

use serde::{Deserialize, Serialize};

/// An invoice as the provider reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderInvoice {
    /// The provider's invoice id (`in_...`).
    pub id: String,
    /// Provider-side status (`open`, `paid`, `void`, ...).
    pub status: String,
    /// URL where the customer completes payment.
    #[serde(default)]
    pub hosted_invoice_url: Option<String>,
    /// Amount due in the currency's minor unit (cents).
    pub amount_due: i64,
    /// Lowercase ISO currency code.
    pub currency: String,
}

/// Error envelope the provider wraps failures in.
#[derive(Debug, Deserialize)]
pub struct ProviderErrorEnvelope {
    pub error: ProviderErrorBody,
}

/// The inner error payload.
#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

/// Webhook event types this service reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventType {
    /// Payment succeeded; commit the stock hold and create the order.
    InvoicePaid,
    /// Payment failed; release the hold.
    InvoicePaymentFailed,
    /// Invoice was voided upstream; release the hold.
    InvoiceVoided,
    /// Anything else; acknowledged and ignored.
    Other,
}

impl WebhookEventType {
    /// Map the provider's dotted event name.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "invoice.paid" => Self::InvoicePaid,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            "invoice.voided" => Self::InvoiceVoided,
            _ => Self::Other,
        }
    }
}

/// A deserialized webhook event.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

/// The `data` envelope of a webhook event.
#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookInvoiceObject,
}

/// The invoice object inside a webhook event.
#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookInvoiceObject {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parse() {
        assert_eq!(
            WebhookEventType::parse("invoice.paid"),
            WebhookEventType::InvoicePaid
        );
        assert_eq!(
            WebhookEventType::parse("invoice.payment_failed"),
            WebhookEventType::InvoicePaymentFailed
        );
        assert_eq!(
            WebhookEventType::parse("invoice.voided"),
            WebhookEventType::InvoiceVoided
        );
        assert_eq!(
            WebhookEventType::parse("customer.created"),
            WebhookEventType::Other
        );
    }

    #[test]
    fn test_webhook_event_deserialize() {
        let json = r#"{
            "id": "evt_123",
            "type": "invoice.paid",
            "data": { "object": { "id": "in_456", "status": "paid" } }
        }"#;

        let event: WebhookEvent = serde_json::from_str(json).expect("valid event");
        assert_eq!(event.id, "evt_123");
        assert_eq!(
            WebhookEventType::parse(&event.event_type),
            WebhookEventType::InvoicePaid
        );
        assert_eq!(event.data.object.id, "in_456");
    }
}
