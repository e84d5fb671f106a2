//! # MBank Configuration
//!
//! Configuration for the MBank integration, injected into the client at
//! construction. Secrets are loaded from environment variables.

use pay_core::PaymentError;
use reqwest::Url;
use std::env;
use std::time::Duration;

/// Production gateway endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.mbank.kg/payment/v1";

/// Path the gateway posts status notifications to, relative to the callback base URL
pub const CALLBACK_PATH: &str = "/api/payments/mbank-callback/";

const DEFAULT_CALLBACK_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CALLBACK_TOLERANCE_SECS: i64 = 300;

/// MBank API configuration
#[derive(Debug, Clone)]
pub struct MBankConfig {
    /// Gateway-assigned merchant identifier
    pub merchant_id: String,

    /// Shared secret used to sign requests and callbacks
    pub secret_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Public URL of this backend; the callback URL is built from it
    pub callback_base_url: String,

    /// Upper bound on a single gateway request
    pub request_timeout: Duration,

    /// Maximum clock skew accepted on callback timestamps, in seconds
    pub callback_tolerance_secs: i64,
}

impl MBankConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `MBANK_MERCHANT_ID`
    /// - `MBANK_SECRET_KEY`
    ///
    /// Optional: `MBANK_API_URL`, `BACKEND_URL`, `MBANK_TIMEOUT_SECS`,
    /// `MBANK_CALLBACK_TOLERANCE_SECS`.
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PaymentError::Configuration(format!("{} not set", key)))
        };

        let merchant_id = required("MBANK_MERCHANT_ID")?;
        let secret_key = required("MBANK_SECRET_KEY")?;

        let mut config = Self::new(merchant_id, secret_key);

        if let Some(url) = lookup("MBANK_API_URL") {
            config.api_base_url = url;
        }
        if let Some(url) = lookup("BACKEND_URL") {
            config.callback_base_url = url;
        }
        if let Some(secs) = lookup("MBANK_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                PaymentError::Configuration(format!("MBANK_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = lookup("MBANK_CALLBACK_TOLERANCE_SECS") {
            config.callback_tolerance_secs = secs.parse().map_err(|_| {
                PaymentError::Configuration(format!(
                    "MBANK_CALLBACK_TOLERANCE_SECS is not a number: {}",
                    secs
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit credentials (for testing)
    pub fn new(merchant_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            secret_key: secret_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            callback_base_url: DEFAULT_CALLBACK_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            callback_tolerance_secs: DEFAULT_CALLBACK_TOLERANCE_SECS,
        }
    }

    /// Check that both URLs parse and credentials are present
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.merchant_id.trim().is_empty() {
            return Err(PaymentError::Configuration("merchant_id is empty".to_string()));
        }
        if self.secret_key.is_empty() {
            return Err(PaymentError::Configuration("secret_key is empty".to_string()));
        }
        Url::parse(&self.api_base_url).map_err(|e| {
            PaymentError::Configuration(format!("Invalid API base URL {}: {}", self.api_base_url, e))
        })?;
        Url::parse(&self.callback_base_url).map_err(|e| {
            PaymentError::Configuration(format!(
                "Invalid callback base URL {}: {}",
                self.callback_base_url, e
            ))
        })?;
        Ok(())
    }

    /// Full URL of a gateway endpoint, e.g. `endpoint("create")`
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), name)
    }

    /// Webhook URL handed to the gateway with every new payment
    pub fn callback_url(&self) -> String {
        format!(
            "{}{}",
            self.callback_base_url.trim_end_matches('/'),
            CALLBACK_PATH
        )
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set callback base URL
    pub fn with_callback_base_url(mut self, url: impl Into<String>) -> Self {
        self.callback_base_url = url.into();
        self
    }

    /// Builder: set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builder: set callback timestamp tolerance
    pub fn with_callback_tolerance_secs(mut self, secs: i64) -> Self {
        self.callback_tolerance_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = MBankConfig::from_lookup(lookup_from(&[
            ("MBANK_MERCHANT_ID", "merchant-1"),
            ("MBANK_SECRET_KEY", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.merchant_id, "merchant-1");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.callback_tolerance_secs, 300);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = MBankConfig::from_lookup(lookup_from(&[
            ("MBANK_MERCHANT_ID", "merchant-1"),
            ("MBANK_SECRET_KEY", "s3cret"),
            ("MBANK_API_URL", "https://sandbox.mbank.kg/payment/v1"),
            ("BACKEND_URL", "https://shop.kg"),
            ("MBANK_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint("create"), "https://sandbox.mbank.kg/payment/v1/create");
        assert_eq!(config.callback_url(), "https://shop.kg/api/payments/mbank-callback/");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_credentials() {
        let result = MBankConfig::from_lookup(lookup_from(&[("MBANK_SECRET_KEY", "s3cret")]));
        assert!(matches!(result, Err(PaymentError::Configuration(_))));

        let result = MBankConfig::from_lookup(lookup_from(&[
            ("MBANK_MERCHANT_ID", "  "),
            ("MBANK_SECRET_KEY", "s3cret"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values() {
        let result = MBankConfig::from_lookup(lookup_from(&[
            ("MBANK_MERCHANT_ID", "m"),
            ("MBANK_SECRET_KEY", "s"),
            ("MBANK_TIMEOUT_SECS", "soon"),
        ]));
        assert!(result.is_err());

        let result = MBankConfig::from_lookup(lookup_from(&[
            ("MBANK_MERCHANT_ID", "m"),
            ("MBANK_SECRET_KEY", "s"),
            ("BACKEND_URL", "not a url"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let config = MBankConfig::new("m", "s")
            .with_api_base_url("http://127.0.0.1:9000/")
            .with_callback_base_url("https://shop.kg/");

        assert_eq!(config.endpoint("status"), "http://127.0.0.1:9000/status");
        assert_eq!(config.callback_url(), "https://shop.kg/api/payments/mbank-callback/");
    }
}
