//! Payment provider REST client.
//!
//! Thin reqwest wrapper over the invoice endpoints the checkout flow needs.
//! Requests are form-encoded and bearer-authenticated, per the provider's
//! API conventions.

use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use tamarind_core::{CurrencyCode, InvoiceId};

use super::error::StripeError;
use super::types::{ProviderErrorEnvelope, ProviderInvoice};
use crate::config::StripeConfig;

/// Payment provider API client.
#[derive(Clone)]
pub struct StripeClient {
    /// HTTP client.
    client: Client,
    /// API base URL (overridable for tests).
    api_base: String,
    /// API secret key.
    secret_key: SecretString,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.api_base)
            .field("secret_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Create and finalize an invoice for a checkout.
    ///
    /// The local invoice id travels in metadata so support staff can
    /// correlate the two sides; webhook routing uses the returned provider
    /// id instead.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the provider rejects it.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn create_invoice(
        &self,
        invoice_id: InvoiceId,
        amount: Decimal,
        currency: CurrencyCode,
        customer_email: &str,
    ) -> Result<ProviderInvoice, StripeError> {
        let amount_due = minor_units(amount)
            .ok_or_else(|| StripeError::Request(format!("amount out of range: {amount}")))?;

        let params = [
            ("amount_due", amount_due.to_string()),
            ("currency", currency.code().to_lowercase()),
            ("customer_email", customer_email.to_string()),
            ("metadata[shop_invoice_id]", invoice_id.to_string()),
            ("auto_advance", "true".to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/invoices", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&params)
            .send()
            .await
            .map_err(|e| StripeError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(StripeError::Api(message));
        }

        let invoice: ProviderInvoice = response
            .json()
            .await
            .map_err(|e| StripeError::Response(e.to_string()))?;

        debug!(provider_invoice_id = %invoice.id, "Provider invoice created");

        Ok(invoice)
    }

    /// Void an open provider invoice (checkout abandoned or holds expired).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the provider rejects it.
    #[instrument(skip(self))]
    pub async fn void_invoice(&self, provider_invoice_id: &str) -> Result<(), StripeError> {
        let response = self
            .client
            .post(format!(
                "{}/invoices/{provider_invoice_id}/void",
                self.api_base
            ))
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| StripeError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StripeError::Api(format!("void returned {status}: {body}")));
        }

        debug!(provider_invoice_id, "Provider invoice voided");

        Ok(())
    }
}

/// Convert a decimal major-unit amount to the provider's integer minor
/// units (cents). Returns `None` for negative amounts or values that do not
/// fit an `i64` after scaling.
fn minor_units(amount: Decimal) -> Option<i64> {
    if amount.is_sign_negative() {
        return None;
    }
    let cents = amount.checked_mul(Decimal::from(100))?.round();
    cents.to_i64()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units() {
        assert_eq!(minor_units(Decimal::new(1999, 2)), Some(1999)); // 19.99
        assert_eq!(minor_units(Decimal::new(5, 0)), Some(500)); // 5
        assert_eq!(minor_units(Decimal::ZERO), Some(0));
    }

    #[test]
    fn test_minor_units_rounds_sub_cent() {
        // 0.005 rounds bankers' style to 0 cents
        assert_eq!(minor_units(Decimal::new(5, 3)), Some(0));
        assert_eq!(minor_units(Decimal::new(15, 3)), Some(2)); // 0.015 -> 2
    }

    #[test]
    fn test_minor_units_rejects_negative() {
        assert_eq!(minor_units(Decimal::new(-100, 2)), None);
    }

    #[test]
    fn test_minor_units_overflow() {
        assert_eq!(minor_units(Decimal::MAX), None);
    }

    #[test]
    fn test_client_debug_redacts_key() {
        let client = StripeClient::new(&StripeConfig {
            api_base: "http://localhost:12111/".to_string(),
            secret_key: SecretString::from("sk_test_abc123"),
            webhook_secret: SecretString::from("whsec_abc123"),
        });

        let debug_output = format!("{client:?}");
        assert!(debug_output.contains("localhost:12111"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk_test_abc123"));

        // Trailing slash is trimmed so URL joins stay clean.
        assert!(!debug_output.contains("12111/\""));
    }
}
