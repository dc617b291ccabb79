//! # Sticker Shop
//!
//! Backend for a custom sticker storefront.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - In-memory store (optionally seeded)
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use sticker_shop::config::Settings;
use sticker_shop::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    sticker_shop::telemetry::init_tracing();

    info!("Starting Sticker Shop...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
