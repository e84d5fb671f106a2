//! # pay-mbank
//!
//! MBank payment gateway client.
//!
//! Requests are signed with the gateway's canonical SHA-256 scheme (see
//! `pay_core::signature`) and sent as JSON:
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | `create_payment` | `POST {base_url}/create` |
//! | `verify_payment` | `POST {base_url}/status` |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_mbank::MBankGateway;
//! use pay_core::{Amount, NewPayment, PaymentGateway};
//!
//! // Create client from environment
//! let gateway = MBankGateway::from_env()?;
//!
//! let created = gateway
//!     .create_payment(&NewPayment::new(1042, Amount::from_major(1500.0), "https://shop.kg/orders/1042"))
//!     .await?;
//!
//! // Redirect the payer to created.payment_url
//! ```
//!
//! ## Callback Handling
//!
//! ```rust,ignore
//! use pay_mbank::{dispatch_callback, CallbackHandler};
//!
//! struct MarkOrderPaid;
//!
//! impl CallbackHandler for MarkOrderPaid {
//!     fn on_payment_paid(&self, event: &CallbackEvent) -> PaymentResult<()> {
//!         // Flip the order to paid
//!         Ok(())
//!     }
//! }
//!
//! let event = gateway.verify_callback(&body)?;
//! dispatch_callback(&MarkOrderPaid, &event)?;
//! ```

pub mod callback;
pub mod client;
pub mod config;

// Re-exports
pub use callback::{dispatch_callback, verify_callback, CallbackHandler, LoggingCallbackHandler};
pub use client::MBankGateway;
pub use config::{MBankConfig, CALLBACK_PATH, DEFAULT_API_BASE_URL};
