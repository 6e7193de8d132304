//! Email service for order receipts and payment notices.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. When no
//! SMTP host is configured the service is absent and callers skip sending.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use tamarind_core::{InvoiceId, OrderId};

use crate::config::EmailConfig;

/// HTML template for the order receipt email.
#[derive(Template)]
#[template(path = "email/order_receipt.html")]
struct OrderReceiptHtml<'a> {
    order_id: OrderId,
    total: &'a str,
}

/// Plain text template for the order receipt email.
#[derive(Template)]
#[template(path = "email/order_receipt.txt")]
struct OrderReceiptText<'a> {
    order_id: OrderId,
    total: &'a str,
}

/// HTML template for the payment failed email.
#[derive(Template)]
#[template(path = "email/payment_failed.html")]
struct PaymentFailedHtml {
    invoice_id: InvoiceId,
}

/// Plain text template for the payment failed email.
#[derive(Template)]
#[template(path = "email/payment_failed.txt")]
struct PaymentFailedText {
    invoice_id: InvoiceId,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for transactional mail.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay parameters are invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send an order receipt after a successful payment.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_order_receipt(
        &self,
        to: &str,
        order_id: OrderId,
        total: &str,
    ) -> Result<(), EmailError> {
        let html = OrderReceiptHtml { order_id, total }.render()?;
        let text = OrderReceiptText { order_id, total }.render()?;

        self.send_multipart_email(to, &format!("Your order #{order_id}"), &text, &html)
            .await
    }

    /// Send a payment-failed notice so the customer can retry.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_payment_failed(
        &self,
        to: &str,
        invoice_id: InvoiceId,
    ) -> Result<(), EmailError> {
        let html = PaymentFailedHtml { invoice_id }.render()?;
        let text = PaymentFailedText { invoice_id }.render()?;

        self.send_multipart_email(to, "There was a problem with your payment", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_templates_render() {
        let html = OrderReceiptHtml {
            order_id: OrderId::new(12),
            total: "34.50 USD",
        }
        .render()
        .unwrap();
        assert!(html.contains("34.50 USD"));
        assert!(html.contains("12"));

        let text = OrderReceiptText {
            order_id: OrderId::new(12),
            total: "34.50 USD",
        }
        .render()
        .unwrap();
        assert!(text.contains("34.50 USD"));
    }

    #[test]
    fn test_payment_failed_templates_render() {
        let html = PaymentFailedHtml {
            invoice_id: InvoiceId::new(7),
        }
        .render()
        .unwrap();
        assert!(html.contains('7'));

        let text = PaymentFailedText {
            invoice_id: InvoiceId::new(7),
        }
        .render()
        .unwrap();
        assert!(text.contains('7'));
    }
}
