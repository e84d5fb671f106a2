//! # Payment Error Types
//!
//! Typed error handling for the payment client.
//! Every gateway operation returns `Result<T, PaymentError>`; no fault
//! escapes an operation any other way.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid URLs)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data, rejected before anything is sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Gateway answered HTTP 200 but reported a non-success status
    #[error("{message}")]
    GatewayRejected { message: String },

    /// Gateway answered with a non-200 HTTP status
    #[error("Payment gateway error: {status}")]
    HttpStatus { status: u16 },

    /// Network/HTTP error communicating with the gateway (includes timeouts)
    #[error("Network error: {0}")]
    TransportError(String),

    /// Gateway body was not the JSON we expect
    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    /// Callback signature verification failed
    #[error("Callback verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Callback payload parsing error
    #[error("Callback parse error: {0}")]
    WebhookParseError(String),

    /// Serialization error while building a request
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Shorthand for a gateway rejection
    pub fn rejected(message: impl Into<String>) -> Self {
        PaymentError::GatewayRejected {
            message: message.into(),
        }
    }

    /// Returns true if the failure happened on the wire rather than in the gateway's answer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PaymentError::HttpStatus { .. }
                | PaymentError::TransportError(_)
                | PaymentError::MalformedResponse(_)
        )
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::TransportError(_) => true,
            PaymentError::HttpStatus { status } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::GatewayRejected { .. } => 402,
            PaymentError::HttpStatus { .. } => 502,
            PaymentError::TransportError(_) => 503,
            PaymentError::MalformedResponse(_) => 502,
            PaymentError::WebhookVerificationFailed(_) => 401,
            PaymentError::WebhookParseError(_) => 400,
            PaymentError::Serialization(_) => 500,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
