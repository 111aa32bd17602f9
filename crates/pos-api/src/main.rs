//! # deli-pos
//!
//! Point-of-sale register for a small deli.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export POS_API_BASE=https://script.example.com/macros/s/.../exec
//! export POS_CART_DIR=/var/lib/deli-pos
//!
//! # Run the server
//! deli-pos
//! ```

use pos_api::{routes, state::AppState};
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

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Backend: {}", state.service.backend_name());
    match &state.config.cart_dir {
        Some(dir) => info!("Cart slot: {}/{}.json", dir.display(), state.config.cart_slot),
        None => info!("Cart slot: in memory"),
    }
    {
        let cart = state.ledger.lock().await;
        if !cart.is_empty() {
            info!("Restored cart with {} item(s)", cart.item_count());
        }
    }

    let app = routes::create_router(state);

    info!("🧾 deli-pos starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🛒 Cart: http://{}/api/v1/cart", addr);
        info!("💵 Checkout: POST http://{}/api/v1/checkout", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("deli-pos stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

fn print_banner() {
    println!(
        r#"
  🧾 deli-pos 🧾
  ━━━━━━━━━━━━━━━━━━━━━━━
  Register for the counter
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
