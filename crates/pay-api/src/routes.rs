//! # Routes
//!
//! Axum router configuration for the payment API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use pay_mbank::CALLBACK_PATH;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - POST /api/payments/mbank/create/ - Open a payment
/// - POST /api/payments/mbank/status/ - Check payment status
/// - POST /api/payments/mbank-callback/ - Gateway status notifications
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let payment_routes = Router::new()
        .route("/create/", post(handlers::create_payment))
        .route("/status/", post(handlers::check_payment_status));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/payments/mbank", payment_routes)
        // Callback path is what the gateway was told in callback_url
        .route(CALLBACK_PATH, post(handlers::payment_callback))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}
