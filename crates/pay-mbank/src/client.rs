//! # MBank Gateway Client
//!
//! Signed request/response wrapper around the MBank payment API.
//!
//! Every call sends exactly one `POST` and never retries. Failures are
//! logged where they are detected and returned as `PaymentError`.

use crate::callback;
use crate::config::MBankConfig;
use async_trait::async_trait;
use chrono::Utc;
use pay_core::{
    signature, Amount, CallbackEvent, CreatedPayment, NewPayment, PaymentError, PaymentGateway,
    PaymentResult, PaymentVerification, CURRENCY_KGS,
};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

const CREATE_ENDPOINT: &str = "create";
const STATUS_ENDPOINT: &str = "status";

/// MBank payment gateway client
///
/// Stateless apart from its configuration and pooled HTTP client, so one
/// instance can serve concurrent requests.
pub struct MBankGateway {
    config: MBankConfig,
    client: Client,
}

impl MBankGateway {
    /// Create a new client; the HTTP client is built with the configured timeout
    pub fn new(config: MBankConfig) -> PaymentResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = MBankConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &MBankConfig {
        &self.config
    }

    fn validate_payment(payment: &NewPayment) -> PaymentResult<()> {
        if payment.order_id.is_empty() {
            return Err(PaymentError::InvalidRequest("order_id is empty".to_string()));
        }
        if !payment.amount.is_positive() {
            return Err(PaymentError::InvalidRequest(format!(
                "amount must be positive, got {}",
                payment.amount.minor()
            )));
        }
        let url = Url::parse(&payment.return_url).map_err(|e| {
            PaymentError::InvalidRequest(format!("return_url is not an absolute URL: {}", e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PaymentError::InvalidRequest(format!(
                "return_url must be http(s), got {}",
                url.scheme()
            )));
        }
        Ok(())
    }

    fn build_create_request(&self, payment: &NewPayment, timestamp: i64) -> CreatePaymentRequest {
        CreatePaymentRequest {
            merchant_id: self.config.merchant_id.clone(),
            amount: payment.amount,
            currency: CURRENCY_KGS,
            description: payment.description_or_default(),
            order_id: payment.order_id.clone(),
            timestamp,
            return_url: payment.return_url.clone(),
            callback_url: self.config.callback_url(),
        }
    }

    fn build_status_request(&self, payment_id: &str, timestamp: i64) -> StatusRequest {
        StatusRequest {
            merchant_id: self.config.merchant_id.clone(),
            payment_id: payment_id.to_string(),
            timestamp,
        }
    }

    /// Sign `request`, POST it to `endpoint` and interpret the reply envelope.
    async fn post_signed<T: Serialize>(
        &self,
        endpoint: &str,
        request: &T,
    ) -> PaymentResult<GatewayReply> {
        let body = signature::signed_fields(request, &self.config.secret_key)?;
        let url = self.config.endpoint(endpoint);

        debug!("Sending MBank request: url={}", url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("MBank request failed: url={}, error={}", url, e);
                PaymentError::TransportError(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("MBank API error: status={}", status.as_u16());
            return Err(PaymentError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| {
            error!("Failed to read MBank response body: {}", e);
            PaymentError::TransportError(e.to_string())
        })?;

        GatewayReply::parse(&text).map_err(|e| {
            error!("{}", e);
            e
        })
    }
}

#[async_trait]
impl PaymentGateway for MBankGateway {
    #[instrument(skip(self, payment), fields(order_id = %payment.order_id))]
    async fn create_payment(&self, payment: &NewPayment) -> PaymentResult<CreatedPayment> {
        if let Err(e) = Self::validate_payment(payment) {
            warn!("Rejected payment before sending: {}", e);
            return Err(e);
        }

        let request = self.build_create_request(payment, Utc::now().timestamp());

        match self.post_signed(CREATE_ENDPOINT, &request).await? {
            GatewayReply::Success { raw } => {
                let payment_id =
                    scalar_field(&raw, "payment_id").ok_or_else(|| missing_field("payment_id"))?;
                let payment_url = raw
                    .get("payment_url")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .ok_or_else(|| missing_field("payment_url"))?;
                Ok(CreatedPayment {
                    payment_id,
                    payment_url,
                    reference: scalar_field(&raw, "reference"),
                })
            }
            GatewayReply::Failure { message } => {
                error!("MBank payment creation failed: {:?}", message);
                Err(PaymentError::rejected(
                    message.unwrap_or_else(|| "Payment creation failed".to_string()),
                ))
            }
        }
    }

    #[instrument(skip(self))]
    async fn verify_payment(&self, payment_id: &str) -> PaymentResult<PaymentVerification> {
        if payment_id.trim().is_empty() {
            warn!("Rejected status check with empty payment_id");
            return Err(PaymentError::InvalidRequest("payment_id is empty".to_string()));
        }

        let request = self.build_status_request(payment_id, Utc::now().timestamp());

        match self.post_signed(STATUS_ENDPOINT, &request).await? {
            GatewayReply::Success { raw } => {
                let payment_status = raw
                    .get("payment_status")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .ok_or_else(|| missing_field("payment_status"))?;
                Ok(PaymentVerification::new(payment_status, raw))
            }
            GatewayReply::Failure { message } => {
                error!("MBank payment verification failed: {:?}", message);
                Err(PaymentError::rejected(
                    message.unwrap_or_else(|| "Payment verification failed".to_string()),
                ))
            }
        }
    }

    #[instrument(skip(self, payload), fields(len = payload.len()))]
    fn verify_callback(&self, payload: &[u8]) -> PaymentResult<CallbackEvent> {
        callback::verify_callback(
            payload,
            &self.config.secret_key,
            self.config.callback_tolerance_secs,
            Utc::now(),
        )
        .map_err(|e| {
            error!("MBank callback rejected: {}", e);
            e
        })
    }

    fn provider_name(&self) -> &'static str {
        "mbank"
    }
}

fn missing_field(field: &str) -> PaymentError {
    let err = PaymentError::MalformedResponse(format!("success reply without {}", field));
    error!("{}", err);
    err
}

// =============================================================================
// MBank API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CreatePaymentRequest {
    merchant_id: String,
    amount: Amount,
    currency: &'static str,
    description: String,
    order_id: String,
    timestamp: i64,
    return_url: String,
    callback_url: String,
}

#[derive(Debug, Serialize)]
struct StatusRequest {
    merchant_id: String,
    payment_id: String,
    timestamp: i64,
}

/// Reply envelope, decided by `status == "success"`
///
/// Only the envelope is checked here; each operation reads its own fields.
#[derive(Debug)]
enum GatewayReply {
    Success { raw: Value },
    Failure { message: Option<String> },
}

impl GatewayReply {
    fn parse(text: &str) -> PaymentResult<Self> {
        let raw: Value = serde_json::from_str(text).map_err(|e| {
            PaymentError::MalformedResponse(format!("Failed to parse MBank response: {}", e))
        })?;

        if !raw.is_object() {
            return Err(PaymentError::MalformedResponse(
                "MBank response is not a JSON object".to_string(),
            ));
        }

        if raw.get("status").and_then(Value::as_str) == Some("success") {
            Ok(GatewayReply::Success { raw })
        } else {
            let message = raw
                .get("message")
                .and_then(Value::as_str)
                .map(String::from);
            Ok(GatewayReply::Failure { message })
        }
    }
}

/// String field, or a number rendered as text (identifiers sometimes arrive as numbers)
fn scalar_field(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
