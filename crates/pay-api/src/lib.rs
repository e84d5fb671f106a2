//! # pay-api
//!
//! HTTP API layer for the MBank payment client.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Payment create and status endpoints backed by a `PaymentGateway`
//! - The callback receiver that verifies and dispatches gateway notifications
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/payments/mbank/create/` | Create payment |
//! | POST | `/api/payments/mbank/status/` | Check payment status |
//! | POST | `/api/payments/mbank-callback/` | Gateway callback |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
