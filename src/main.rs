//! # AnonChat Server
//!
//! Entry point: initializes tracing, loads configuration, and runs the
//! chat server.

use anyhow::Result;
use tracing::info;

use anonchat_server::config::Settings;
use anonchat_server::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    anonchat_server::telemetry::init_tracing();

    info!("Starting AnonChat Server...");

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
