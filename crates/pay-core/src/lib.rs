//! # pay-core
//!
//! Core types and traits for the MBank payment client.
//!
//! This crate provides:
//! - `PaymentGateway` trait implemented by gateway clients
//! - `NewPayment`, `CreatedPayment` and `PaymentVerification` for the payment flow
//! - `CallbackEvent` for verified gateway notifications
//! - `signature` with the canonical SHA-256 request signing scheme
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{Amount, NewPayment, PaymentGateway};
//!
//! let payment = NewPayment::new(1042, Amount::from_major(1500.0), "https://shop.kg/orders/1042");
//!
//! match gateway.create_payment(&payment).await {
//!     Ok(created) => redirect(created.payment_url),
//!     Err(e) => show_error(e.to_string()),
//! }
//! ```

pub mod error;
pub mod gateway;
pub mod money;
pub mod payment;
pub mod signature;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use gateway::{BoxedPaymentGateway, PaymentGateway};
pub use money::{Amount, CURRENCY_KGS};
pub use payment::{CallbackEvent, CreatedPayment, NewPayment, PaymentStatus, PaymentVerification};
