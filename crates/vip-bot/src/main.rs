//! Verification engine daemon entry point
//!
//! Run with:
//! ```bash
//! cargo run -p vip-bot
//! ```
//!
//! Configuration is loaded from environment variables (`.env` supported).

use tracing::{error, info};
use vip_common::{try_init_tracing, AppConfig};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Engine failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting verification engine...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        group_id = config.gateway.group_id,
        "Configuration loaded"
    );

    vip_bot::run(config).await?;

    Ok(())
}
