//! # Payment Gateway Trait
//!
//! The seam between HTTP handlers and a concrete gateway client.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            PaymentGateway (trait)            │
//! │  ├── create_payment()                        │
//! │  ├── verify_payment()                        │
//! │  ├── verify_callback()                       │
//! │  └── provider_name()                         │
//! └──────────────────────────────────────────────┘
//!                        ▲
//!                ┌───────┴───────┐
//!                │ MBankGateway  │
//!                └───────────────┘
//! ```

use crate::error::PaymentResult;
use crate::payment::{CallbackEvent, CreatedPayment, NewPayment, PaymentVerification};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations every payment gateway client provides.
///
/// Implementations must not panic: every failure, including transport
/// faults and malformed responses, comes back as a `PaymentError`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment and return the URL the payer should be redirected to.
    async fn create_payment(&self, payment: &NewPayment) -> PaymentResult<CreatedPayment>;

    /// Ask the gateway for the current status of a previously created payment.
    async fn verify_payment(&self, payment_id: &str) -> PaymentResult<PaymentVerification>;

    /// Authenticate an inbound callback body and parse it.
    fn verify_callback(&self, payload: &[u8]) -> PaymentResult<CallbackEvent>;

    /// Provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use crate::money::Amount;
    use crate::payment::PaymentStatus;
    use chrono::Utc;

    struct EchoGateway;

    #[async_trait]
    impl PaymentGateway for EchoGateway {
        async fn create_payment(&self, payment: &NewPayment) -> PaymentResult<CreatedPayment> {
            Ok(CreatedPayment {
                payment_id: format!("p-{}", payment.order_id),
                payment_url: "https://pay.example/x".to_string(),
                reference: None,
            })
        }

        async fn verify_payment(&self, payment_id: &str) -> PaymentResult<PaymentVerification> {
            if payment_id.is_empty() {
                return Err(PaymentError::InvalidRequest("empty".into()));
            }
            Ok(PaymentVerification::new("PAID", serde_json::json!({})))
        }

        fn verify_callback(&self, _payload: &[u8]) -> PaymentResult<CallbackEvent> {
            Ok(CallbackEvent {
                provider: "echo".into(),
                payment_id: None,
                order_id: None,
                payment_status: PaymentStatus::Pending,
                amount: None,
                raw_data: serde_json::Value::Null,
                received_at: Utc::now(),
            })
        }

        fn provider_name(&self) -> &'static str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_boxed_gateway_dispatch() {
        let gateway: BoxedPaymentGateway = Arc::new(EchoGateway);

        let created = gateway
            .create_payment(&NewPayment::new(7, Amount::from_minor(100), "https://x"))
            .await
            .unwrap();
        assert_eq!(created.payment_id, "p-7");

        assert!(gateway.verify_payment("p-7").await.unwrap().is_paid);
        assert!(gateway.verify_payment("").await.is_err());
        assert_eq!(gateway.provider_name(), "echo");
    }
}
