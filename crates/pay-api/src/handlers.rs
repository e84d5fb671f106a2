//! # Request Handlers
//!
//! Axum request handlers for the payment endpoints. Each one delegates to
//! the configured `PaymentGateway` and answers with a `success` flag.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pay_core::{Amount, NewPayment, PaymentError};
use pay_mbank::dispatch_callback;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, instrument, warn, Span};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Order identifiers arrive either as JSON strings or numbers
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderRef {
    Number(i64),
    Text(String),
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderRef::Number(n) => write!(f, "{}", n),
            OrderRef::Text(s) => f.write_str(s),
        }
    }
}

/// Create payment request
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub order_id: OrderRef,
    /// Amount in minor units (tyiyn)
    pub amount: i64,
    pub return_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Create payment response
#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub payment_id: String,
    /// Redirect the payer here
    pub payment_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Status check request
#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub payment_id: String,
}

/// Status check response
#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub payment_status: String,
    pub is_paid: bool,
    pub details: serde_json::Value,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            success: false,
            error: error.into(),
            code,
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> HandlerError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Malformed or mistyped request bodies get the same JSON error shape
fn json_rejection_to_response(rejection: JsonRejection) -> HandlerError {
    let status = rejection.status();
    warn!("Rejected request body: {}", rejection.body_text());
    (
        status,
        Json(ErrorResponse::new(rejection.body_text(), status.as_u16())),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mbank-pay",
        "provider": state.gateway.provider_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Open a payment with the gateway
#[instrument(skip(state, payload), fields(order_id))]
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<Json<CreatePaymentResponse>, HandlerError> {
    let Json(request) = payload.map_err(json_rejection_to_response)?;
    Span::current().record("order_id", tracing::field::display(&request.order_id));

    let mut payment = NewPayment::new(
        &request.order_id,
        Amount::from_minor(request.amount),
        request.return_url,
    );
    if let Some(description) = request.description {
        payment = payment.with_description(description);
    }

    let created = state
        .gateway
        .create_payment(&payment)
        .await
        .map_err(payment_error_to_response)?;

    Ok(Json(CreatePaymentResponse {
        success: true,
        payment_id: created.payment_id,
        payment_url: created.payment_url,
        reference: created.reference,
    }))
}

/// Ask the gateway whether a payment went through
#[instrument(skip(state, payload), fields(payment_id))]
pub async fn check_payment_status(
    State(state): State<AppState>,
    payload: Result<Json<PaymentStatusRequest>, JsonRejection>,
) -> Result<Json<PaymentStatusResponse>, HandlerError> {
    let Json(request) = payload.map_err(json_rejection_to_response)?;
    Span::current().record("payment_id", request.payment_id.as_str());

    let verification = state
        .gateway
        .verify_payment(&request.payment_id)
        .await
        .map_err(payment_error_to_response)?;

    Ok(Json(PaymentStatusResponse {
        success: true,
        payment_status: verification.payment_status,
        is_paid: verification.is_paid,
        details: verification.details,
    }))
}

/// Receive an asynchronous status notification from the gateway
#[instrument(skip(state, body))]
pub async fn payment_callback(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, HandlerError> {
    let event = state
        .gateway
        .verify_callback(&body)
        .map_err(payment_error_to_response)?;

    info!(
        "Received callback: provider={}, payment={:?}, status={}",
        event.provider, event.payment_id, event.payment_status
    );

    dispatch_callback(state.callback_handler.as_ref(), &event).map_err(|e| {
        error!("Callback handler error: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert!(!err.success);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_payment_error_conversion() {
        let (status, json) = payment_error_to_response(PaymentError::rejected("insufficient funds"));
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(json.0.error, "insufficient funds");

        let (status, _) = payment_error_to_response(PaymentError::HttpStatus { status: 503 });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_order_ref_accepts_numbers_and_strings() {
        let numeric: OrderRef = serde_json::from_str("1042").unwrap();
        assert_eq!(numeric.to_string(), "1042");

        let text: OrderRef = serde_json::from_str("\"ord-7\"").unwrap();
        assert_eq!(text.to_string(), "ord-7");
    }
}
