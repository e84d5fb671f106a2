//! # mbank-pay
//!
//! Payment endpoints backed by the MBank gateway.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export MBANK_MERCHANT_ID=...
//! export MBANK_SECRET_KEY=...
//! export BACKEND_URL=https://shop.kg
//!
//! # Run the server
//! mbank-pay
//! ```

use pay_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::from_env()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.gateway.provider_name());

    let app = routes::create_router(state);

    info!("mbank-pay starting on http://{}", addr);

    if !is_prod {
        info!("Create: POST http://{}/api/payments/mbank/create/", addr);
        info!("Status: POST http://{}/api/payments/mbank/status/", addr);
        info!("Callback: POST http://{}{}", addr, pay_mbank::CALLBACK_PATH);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  mbank-pay
  ━━━━━━━━━━━━━━━━━━━━━━━
  MBank payment endpoints
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
