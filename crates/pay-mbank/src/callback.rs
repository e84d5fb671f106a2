//! # MBank Callback Handling
//!
//! The gateway posts status changes to the callback URL sent with each new
//! payment. Payloads are only trusted after their signature has been
//! re-derived with the shared secret.

use chrono::{DateTime, Utc};
use pay_core::{signature, Amount, CallbackEvent, PaymentError, PaymentResult, PaymentStatus};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Verify and parse a raw callback body.
///
/// If the payload carries an integer `timestamp`, it must be within
/// `tolerance_secs` of `now`.
pub fn verify_callback(
    payload: &[u8],
    secret: &str,
    tolerance_secs: i64,
    now: DateTime<Utc>,
) -> PaymentResult<CallbackEvent> {
    let value: Value = serde_json::from_slice(payload).map_err(|e| {
        PaymentError::WebhookParseError(format!("Failed to parse callback: {}", e))
    })?;

    let Value::Object(fields) = value else {
        return Err(PaymentError::WebhookParseError(
            "Callback body is not an object".to_string(),
        ));
    };

    signature::verify(&fields, secret)?;

    if let Some(timestamp) = fields.get("timestamp").and_then(|v| v.as_i64()) {
        if now.timestamp().abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
            return Err(PaymentError::WebhookVerificationFailed(
                "Timestamp outside tolerance".to_string(),
            ));
        }
    }

    let payment_status = string_field(&fields, "payment_status").ok_or_else(|| {
        PaymentError::WebhookParseError("Missing payment_status".to_string())
    })?;

    debug!("Verified MBank callback: status={}", payment_status);

    Ok(CallbackEvent {
        provider: "mbank".to_string(),
        payment_id: string_field(&fields, "payment_id"),
        order_id: string_field(&fields, "order_id"),
        payment_status: PaymentStatus::from_gateway(&payment_status),
        amount: fields
            .get("amount")
            .and_then(|v| v.as_i64())
            .map(Amount::from_minor),
        raw_data: Value::Object(fields),
        received_at: now,
    })
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Callback event handler trait
///
/// Implement this trait to update order state when the gateway reports a
/// status change.
#[allow(unused_variables)]
pub trait CallbackHandler: Send + Sync {
    /// Called when the gateway reports `PAID`
    fn on_payment_paid(&self, event: &CallbackEvent) -> PaymentResult<()> {
        info!(
            "Payment paid: payment={:?}, order={:?}",
            event.payment_id, event.order_id
        );
        Ok(())
    }

    /// Called when the gateway reports `FAILED`
    fn on_payment_failed(&self, event: &CallbackEvent) -> PaymentResult<()> {
        warn!(
            "Payment failed: payment={:?}, order={:?}",
            event.payment_id, event.order_id
        );
        Ok(())
    }

    /// Called when the gateway reports `PENDING`
    fn on_payment_pending(&self, event: &CallbackEvent) -> PaymentResult<()> {
        debug!("Payment pending: payment={:?}", event.payment_id);
        Ok(())
    }

    /// Called for any other status
    fn on_unknown_status(&self, event: &CallbackEvent) -> PaymentResult<()> {
        debug!(
            "Unhandled payment status {}: payment={:?}",
            event.payment_status, event.payment_id
        );
        Ok(())
    }
}

/// Default handler (just logs events)
pub struct LoggingCallbackHandler;

impl CallbackHandler for LoggingCallbackHandler {}

/// Dispatch a verified callback to the matching handler method
pub fn dispatch_callback(handler: &dyn CallbackHandler, event: &CallbackEvent) -> PaymentResult<()> {
    match &event.payment_status {
        PaymentStatus::Paid => handler.on_payment_paid(event),
        PaymentStatus::Failed => handler.on_payment_failed(event),
        PaymentStatus::Pending => handler.on_payment_pending(event),
        PaymentStatus::Unknown(_) => handler.on_unknown_status(event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    const SECRET: &str = "cb-secret";

    fn signed_payload(mut fields: Value) -> Vec<u8> {
        let map = fields.as_object_mut().unwrap();
        let sig = signature::sign(map, SECRET);
        map.insert("signature".to_string(), json!(sig));
        serde_json::to_vec(&fields).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_verify_valid_callback() {
        let payload = signed_payload(json!({
            "payment_id": "p1",
            "order_id": 1042,
            "payment_status": "PAID",
            "amount": 150000,
            "timestamp": 1_700_000_010
        }));

        let event = verify_callback(&payload, SECRET, 300, now()).unwrap();
        assert_eq!(event.provider, "mbank");
        assert_eq!(event.payment_id.as_deref(), Some("p1"));
        assert_eq!(event.order_id.as_deref(), Some("1042"));
        assert_eq!(event.payment_status, PaymentStatus::Paid);
        assert_eq!(event.amount, Some(Amount::from_minor(150000)));
    }

    #[test]
    fn test_tampered_callback_rejected() {
        let payload = signed_payload(json!({
            "payment_id": "p1",
            "payment_status": "FAILED"
        }));
        let tampered = String::from_utf8(payload)
            .unwrap()
            .replace("FAILED", "PAID");

        let err = verify_callback(tampered.as_bytes(), SECRET, 300, now()).unwrap_err();
        assert!(matches!(err, PaymentError::WebhookVerificationFailed(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = signed_payload(json!({ "payment_id": "p1", "payment_status": "PAID" }));
        assert!(verify_callback(&payload, "other", 300, now()).is_err());
    }

    #[test]
    fn test_stale_callback_rejected() {
        let payload = signed_payload(json!({
            "payment_id": "p1",
            "payment_status": "PAID",
            "timestamp": 1_699_990_000
        }));
        let err = verify_callback(&payload, SECRET, 300, now()).unwrap_err();
        assert!(matches!(err, PaymentError::WebhookVerificationFailed(_)));
    }

    #[test]
    fn test_extreme_timestamp_rejected() {
        for timestamp in [i64::MIN, i64::MAX] {
            let payload = signed_payload(json!({
                "payment_id": "p1",
                "payment_status": "PAID",
                "timestamp": timestamp
            }));
            let err = verify_callback(&payload, SECRET, 300, now()).unwrap_err();
            assert!(matches!(err, PaymentError::WebhookVerificationFailed(_)));
        }
    }

    #[test]
    fn test_unparseable_callback() {
        let err = verify_callback(b"payment_id=p1", SECRET, 300, now()).unwrap_err();
        assert!(matches!(err, PaymentError::WebhookParseError(_)));

        let err = verify_callback(b"[]", SECRET, 300, now()).unwrap_err();
        assert!(matches!(err, PaymentError::WebhookParseError(_)));
    }

    #[test]
    fn test_missing_status() {
        let payload = signed_payload(json!({ "payment_id": "p1" }));
        let err = verify_callback(&payload, SECRET, 300, now()).unwrap_err();
        assert!(matches!(err, PaymentError::WebhookParseError(_)));
    }

    #[test]
    fn test_dispatch_callback() {
        struct PaidHandler {
            called: AtomicBool,
        }

        impl CallbackHandler for PaidHandler {
            fn on_payment_paid(&self, _event: &CallbackEvent) -> PaymentResult<()> {
                self.called.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let handler = PaidHandler {
            called: AtomicBool::new(false),
        };

        let payload = signed_payload(json!({ "payment_id": "p1", "payment_status": "PENDING" }));
        let pending = verify_callback(&payload, SECRET, 300, now()).unwrap();
        dispatch_callback(&handler, &pending).unwrap();
        assert!(!handler.called.load(Ordering::SeqCst));

        let payload = signed_payload(json!({ "payment_id": "p1", "payment_status": "PAID" }));
        let paid = verify_callback(&payload, SECRET, 300, now()).unwrap();
        dispatch_callback(&handler, &paid).unwrap();
        assert!(handler.called.load(Ordering::SeqCst));

        assert!(dispatch_callback(&LoggingCallbackHandler, &paid).is_ok());
    }
}
