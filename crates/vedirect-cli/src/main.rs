//! VE.Direct monitor / emulator - Main Entry Point
//!
//! Usage: `vedirect [config-file]`. Settings come from the optional TOML file
//! (default `vedirect.toml`) overridden by `VEDIRECT_*` environment variables.

use tracing::info;
use vedirect_cli::{init_logging, run_emulator, run_monitor, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = AppConfig::load(config_path.as_deref())?;
    init_logging(&config)?;

    info!("=== VE.Direct v{} ===", env!("CARGO_PKG_VERSION"));

    match config.emulator() {
        Some(emulator) => run_emulator(&config, &emulator).await?,
        None => run_monitor(&config).await?,
    }

    Ok(())
}
