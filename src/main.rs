//! # OLED Status Application Entry Point
//!
//! Loads the screen configuration, opens the display and runs the rotation loop
//! until Ctrl-C or a fatal error. Without the `hardware` feature (or off Linux)
//! frames are printed to the terminal instead of an SSD1306 panel.
//!
//! Fatal errors exit non-zero so a process supervisor can restart the service.

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use oled_status_lib::{Config, DisplayDevice, DisplayManager, Providers};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Rotating system status screens for an SSD1306 OLED")]
struct Cli {
    /// Path to the TOML screen configuration
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

/// Open the SSD1306 panel configured under `[display]`
#[cfg(all(target_os = "linux", feature = "hardware"))]
fn open_device(config: &Config) -> anyhow::Result<Box<dyn DisplayDevice>> {
    let display = oled_status_lib::ssd1306_i2c::Ssd1306Display::open(&config.display)
        .with_context(|| format!("failed to initialize display on {}", config.display.i2c_bus))?;
    Ok(Box::new(display))
}

/// Development mode: print frames to the terminal
#[cfg(not(all(target_os = "linux", feature = "hardware")))]
fn open_device(_config: &Config) -> anyhow::Result<Box<dyn DisplayDevice>> {
    info!("hardware support not enabled, rendering to the terminal");
    Ok(Box::new(oled_status_lib::terminal::TerminalDisplay::stdout()))
}

/// Resolves on Ctrl-C; never resolves if the signal handler cannot be installed
async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("received Ctrl-C");
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = Config::load_from_path(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    info!(
        "loaded {} screens from {}",
        config.screens.len(),
        cli.config.display()
    );

    let providers = Providers::system(&config.sources);
    let device = open_device(&config)?;
    let mut manager =
        DisplayManager::new(config, providers, device).context("invalid configuration")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    let outcome = rt.block_on(async {
        tokio::select! {
            result = manager.run() => result,
            _ = wait_for_ctrl_c() => Ok(()),
        }
    });

    if let Err(e) = &outcome {
        error!("display loop failed: {}", e);
    }
    if let Err(e) = manager.shutdown() {
        warn!("display shutdown failed: {}", e);
    }

    outcome.context("display loop failed")
}
