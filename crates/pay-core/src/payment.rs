//! # Payment Types
//!
//! Caller-facing inputs and normalized results for gateway operations.

use crate::money::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A payment the caller wants the gateway to open
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    /// Our order identifier (opaque, sent as a string)
    pub order_id: String,

    /// Amount to charge
    pub amount: Amount,

    /// Where the gateway sends the payer once they are done
    pub return_url: String,

    /// Free-text description shown to the payer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewPayment {
    pub fn new(order_id: impl ToString, amount: Amount, return_url: impl Into<String>) -> Self {
        Self {
            order_id: order_id.to_string(),
            amount,
            return_url: return_url.into(),
            description: None,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description to send, falling back to `Payment for Order #{order_id}`
    pub fn description_or_default(&self) -> String {
        match self.description.as_deref() {
            Some(desc) if !desc.is_empty() => desc.to_string(),
            _ => format!("Payment for Order #{}", self.order_id),
        }
    }
}

/// A payment the gateway accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPayment {
    /// Gateway payment identifier, used later for status checks
    pub payment_id: String,

    /// URL to redirect the payer to
    pub payment_url: String,

    /// Gateway reference, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Classification of the gateway's payment status string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
    /// Anything else, kept verbatim
    Unknown(String),
}

impl PaymentStatus {
    /// Map the gateway's status string. Only the exact literal `PAID` counts as paid.
    pub fn from_gateway(raw: &str) -> Self {
        match raw {
            "PAID" => PaymentStatus::Paid,
            "PENDING" => PaymentStatus::Pending,
            "FAILED" => PaymentStatus::Failed,
            other => PaymentStatus::Unknown(other.to_string()),
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Paid => f.write_str("PAID"),
            PaymentStatus::Pending => f.write_str("PENDING"),
            PaymentStatus::Failed => f.write_str("FAILED"),
            PaymentStatus::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Result of a status check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerification {
    /// Status string exactly as the gateway reported it
    pub payment_status: String,

    /// True iff `payment_status == "PAID"`
    pub is_paid: bool,

    /// Full gateway response
    pub details: serde_json::Value,
}

impl PaymentVerification {
    pub fn new(payment_status: impl Into<String>, details: serde_json::Value) -> Self {
        let payment_status = payment_status.into();
        Self {
            is_paid: PaymentStatus::from_gateway(&payment_status).is_paid(),
            payment_status,
            details,
        }
    }

    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::from_gateway(&self.payment_status)
    }
}

/// A verified asynchronous notification from the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackEvent {
    /// Provider name
    pub provider: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    pub payment_status: PaymentStatus,

    /// Amount in minor units, when the gateway includes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    /// Raw payload (signature included)
    pub raw_data: serde_json::Value,

    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_description() {
        let payment = NewPayment::new(1042, Amount::from_minor(100), "https://shop.kg/done");
        assert_eq!(payment.order_id, "1042");
        assert_eq!(payment.description_or_default(), "Payment for Order #1042");

        let blank = payment.clone().with_description("");
        assert_eq!(blank.description_or_default(), "Payment for Order #1042");

        let custom = payment.with_description("Two mugs");
        assert_eq!(custom.description_or_default(), "Two mugs");
    }

    #[test]
    fn test_status_mapping() {
        assert!(PaymentStatus::from_gateway("PAID").is_paid());
        assert!(!PaymentStatus::from_gateway("paid").is_paid());
        assert_eq!(PaymentStatus::from_gateway("PENDING"), PaymentStatus::Pending);
        assert_eq!(
            PaymentStatus::from_gateway("REFUNDED"),
            PaymentStatus::Unknown("REFUNDED".to_string())
        );
        assert_eq!(PaymentStatus::from_gateway("REFUNDED").to_string(), "REFUNDED");
    }

    #[test]
    fn test_verification_is_paid() {
        let paid = PaymentVerification::new("PAID", json!({ "status": "success" }));
        assert!(paid.is_paid);
        assert_eq!(paid.status(), PaymentStatus::Paid);

        let pending = PaymentVerification::new("PENDING", json!({}));
        assert!(!pending.is_paid);
    }
}
