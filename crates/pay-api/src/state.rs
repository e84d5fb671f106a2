//! # Application State
//!
//! Shared state for the Axum application: the payment gateway, the callback
//! handler and service configuration.

use pay_core::BoxedPaymentGateway;
use pay_mbank::{CallbackHandler, LoggingCallbackHandler, MBankGateway};
use std::net::SocketAddr;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment gateway client
    pub gateway: BoxedPaymentGateway,
    /// Receives verified gateway callbacks
    pub callback_handler: Arc<dyn CallbackHandler>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state with the MBank gateway configured from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let gateway = MBankGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize MBank: {}", e))?;

        Ok(Self::new(Arc::new(gateway), config))
    }

    /// Create state around an existing gateway, logging callbacks by default
    pub fn new(gateway: BoxedPaymentGateway, config: AppConfig) -> Self {
        Self {
            gateway,
            callback_handler: Arc::new(LoggingCallbackHandler),
            config,
        }
    }

    /// Builder: replace the callback handler
    pub fn with_callback_handler(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.callback_handler = handler;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(!config.is_production());
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "test".to_string(),
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_bad_socket_addr() {
        let config = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
