use anyhow::{Context, Result};
use eddi_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from defaults, eddi.toml and EDDI_* variables
    let config = ServerConfig::load().context("Failed to load configuration")?;

    eddi_server::init_logging(&config);

    eddi_server::run(config).await.context("Server error")?;

    Ok(())
}
