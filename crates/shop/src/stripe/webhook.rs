//! Webhook signature verification.
//!
//! The provider signs each callback with an HMAC-SHA256 over
//! `"{timestamp}.{raw_body}"` and sends it in the `Stripe-Signature`
//! header as `t=<unix_ts>,v1=<hex_mac>[,v1=<hex_mac>...]`. Verification
//! checks a replay window on the timestamp and compares signatures in
//! constant time.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::error::StripeError;

/// Maximum accepted age of a signed payload, in seconds.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verify a webhook signature header against the raw request body.
///
/// `now` is the current unix timestamp; it is a parameter so tests can pin
/// it.
///
/// # Errors
///
/// Returns `StripeError::InvalidSignature` if the header is malformed, the
/// timestamp is outside the replay window, or no candidate signature
/// matches.
pub fn verify_signature(
    webhook_secret: &SecretString,
    header: &str,
    body: &str,
    now: i64,
) -> Result<(), StripeError> {
    let parsed = parse_signature_header(header)?;

    if (now - parsed.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(StripeError::InvalidSignature(
            "timestamp outside tolerance".to_string(),
        ));
    }

    let signed_payload = format!("{}.{body}", parsed.timestamp);

    let mut mac = Hmac::<Sha256>::new_from_slice(webhook_secret.expose_secret().as_bytes())
        .map_err(|e| StripeError::InvalidSignature(e.to_string()))?;
    mac.update(signed_payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    // The header may carry several v1 candidates during secret rotation;
    // any match passes.
    if parsed
        .signatures
        .iter()
        .any(|candidate| constant_time_compare(&expected, candidate))
    {
        Ok(())
    } else {
        Err(StripeError::InvalidSignature(
            "no matching signature".to_string(),
        ))
    }
}

/// A parsed `Stripe-Signature` header.
struct ParsedHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> Result<ParsedHeader, StripeError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| {
                    StripeError::InvalidSignature("invalid timestamp".to_string())
                })?);
            }
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| StripeError::InvalidSignature("missing timestamp".to_string()))?;

    if signatures.is_empty() {
        return Err(StripeError::InvalidSignature(
            "missing v1 signature".to_string(),
        ));
    }

    Ok(ParsedHeader {
        timestamp,
        signatures,
    })
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_rGk2qX8pTn4vLm9s";

    fn sign(secret: &str, timestamp: i64, body: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{body}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn secret() -> SecretString {
        SecretString::from(SECRET)
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hello", "helloo"));
    }

    #[test]
    fn test_verify_valid_signature() {
        let now = 1_700_000_000;
        let body = r#"{"id":"evt_1"}"#;
        let header = format!("t={now},v1={}", sign(SECRET, now, body));

        assert!(verify_signature(&secret(), &header, body, now).is_ok());
    }

    #[test]
    fn test_verify_accepts_rotated_secrets() {
        let now = 1_700_000_000;
        let body = "{}";
        // First candidate is from an old secret, second matches.
        let header = format!(
            "t={now},v1={},v1={}",
            sign("whsec_old_secret_value_1", now, body),
            sign(SECRET, now, body)
        );

        assert!(verify_signature(&secret(), &header, body, now).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_signature() {
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", "0".repeat(64));

        let result = verify_signature(&secret(), &header, "{}", now);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_verify_rejects_tampered_body() {
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(SECRET, now, r#"{"amount":10}"#));

        let result = verify_signature(&secret(), &header, r#"{"amount":9999}"#, now);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_verify_rejects_old_timestamp() {
        let now = 1_700_000_000;
        let old = now - SIGNATURE_TOLERANCE_SECS - 1;
        let body = "{}";
        let header = format!("t={old},v1={}", sign(SECRET, old, body));

        let result = verify_signature(&secret(), &header, body, now);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_verify_rejects_future_timestamp() {
        let now = 1_700_000_000;
        let future = now + SIGNATURE_TOLERANCE_SECS + 1;
        let body = "{}";
        let header = format!("t={future},v1={}", sign(SECRET, future, body));

        let result = verify_signature(&secret(), &header, body, now);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_verify_rejects_malformed_header() {
        let now = 1_700_000_000;
        for header in ["", "t=abc,v1=00", "v1=00", "t=123"] {
            let result = verify_signature(&secret(), header, "{}", now);
            assert!(
                matches!(result, Err(StripeError::InvalidSignature(_))),
                "header {header:?} should be rejected"
            );
        }
    }
}
