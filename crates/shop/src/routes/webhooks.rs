//! Payment provider webhook handler.
//!
//! The provider retries deliveries until it sees a 2xx, and may deliver an
//! event more than once, so everything downstream of the signature check is
//! idempotent. Events for unknown invoices and event types we don't handle
//! are acknowledged with 200 and logged.

use axum::{extract::State, http::HeaderMap, http::StatusCode};
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::db::{InvoiceRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::invoice::Invoice;
use crate::services::CheckoutService;
use crate::state::AppState;
use crate::stripe::types::{WebhookEvent, WebhookEventType};
use crate::stripe::verify_signature;

/// Header carrying the provider's signature.
const SIGNATURE_HEADER: &str = "stripe-signature";

/// Handle a signed provider event.
///
/// The body is taken raw because the signature covers the exact bytes sent.
#[instrument(skip_all)]
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("missing signature header".to_string()))?;

    verify_signature(
        &state.config().stripe.webhook_secret,
        signature,
        &body,
        Utc::now().timestamp(),
    )
    .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid event payload: {e}")))?;

    let event_type = WebhookEventType::parse(&event.event_type);
    let provider_invoice_id = &event.data.object.id;

    let Some(invoice) = InvoiceRepository::new(state.pool())
        .get_by_provider_id(provider_invoice_id)
        .await?
    else {
        // Not ours (another environment, or created outside this service).
        warn!(
            event_id = %event.id,
            provider_invoice_id,
            "Webhook for unknown invoice, acknowledging"
        );
        return Ok(StatusCode::OK);
    };

    let service = CheckoutService::new(
        state.pool(),
        state.stripe(),
        state.config().reservation_ttl,
    );

    match event_type {
        WebhookEventType::InvoicePaid => {
            let order = service.handle_paid(&invoice).await?;
            send_receipt(&state, &invoice, order.id, &format!("{} {}", order.total, order.currency)).await;
        }
        WebhookEventType::InvoicePaymentFailed | WebhookEventType::InvoiceVoided => {
            service.handle_failed(&invoice).await?;
            send_payment_failed(&state, &invoice).await;
        }
        WebhookEventType::Other => {
            info!(event_id = %event.id, event_type = %event.event_type, "Ignoring event type");
        }
    }

    Ok(StatusCode::OK)
}

/// Send the order receipt. Mail failures are logged, never bubbled: the
/// stock commit already happened and the provider must not retry it.
async fn send_receipt(state: &AppState, invoice: &Invoice, order_id: tamarind_core::OrderId, total: &str) {
    let Some(email_service) = state.email() else {
        return;
    };

    let recipient = match UserRepository::new(state.pool()).get_by_id(invoice.user_id).await {
        Ok(Some(user)) => user.email,
        Ok(None) => {
            warn!(user_id = %invoice.user_id, "Receipt skipped: user not found");
            return;
        }
        Err(e) => {
            warn!(error = %e, "Receipt skipped: user lookup failed");
            return;
        }
    };

    if let Err(e) = email_service
        .send_order_receipt(recipient.as_str(), order_id, total)
        .await
    {
        warn!(error = %e, order_id = %order_id, "Failed to send order receipt");
    }
}

/// Send the payment-failed notice; same best-effort rules as the receipt.
async fn send_payment_failed(state: &AppState, invoice: &Invoice) {
    let Some(email_service) = state.email() else {
        return;
    };

    let recipient = match UserRepository::new(state.pool()).get_by_id(invoice.user_id).await {
        Ok(Some(user)) => user.email,
        _ => return,
    };

    if let Err(e) = email_service
        .send_payment_failed(recipient.as_str(), invoice.id)
        .await
    {
        warn!(error = %e, invoice_id = %invoice.id, "Failed to send payment-failed notice");
    }
}
