//! # FCU Bridge
//!
//! Drive an Airbus-style FCU hardware panel from X-Plane autopilot state.
//!
//! The bridge mirrors autopilot values onto the panel's LCDs and LEDs and
//! feeds button presses back into the simulation.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with tracing subscriber
//!    - Load configuration (defaults if no file present)
//!    - Open the USB panel and resolve its capabilities
//!    - Wake the hardware: init frame, backlights, blanked displays
//!
//! 2. **Run**
//!    - Telemetry loop: subscribe datarefs, fetch value batches, publish
//!      each whole batch; reconnect on simulator timeouts
//!    - Hardware poll loop: projector pass over the latest batch, button
//!      poll, edge dispatch
//!
//! 3. **Graceful Shutdown**
//!    - Ctrl+C sets the shared shutdown flag
//!    - Both loops drain within one blocking timeout and the device handle
//!      is released

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::info;

use fcu_bridge::config::Config;
use fcu_bridge::session::{
    run_panel_loop, run_telemetry_loop, subscription_keys, PanelSession, TelemetryState,
};
use fcu_bridge::sim::xplane::XPlaneLink;
use fcu_bridge::transport::UsbPanel;

/// Config file location unless overridden via `FCU_BRIDGE_CONFIG`.
const DEFAULT_CONFIG_PATH: &str = "config/fcu-bridge.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("FCU Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path =
        std::env::var("FCU_BRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;

    let panel = UsbPanel::open().context("opening panel device")?;
    let caps = config
        .capability_override()
        .unwrap_or_else(|| panel.capabilities());
    info!(variant = panel.variant_name(), ?caps, "panel opened");

    let remote: SocketAddr = format!("{}:{}", config.simulator.host, config.simulator.port)
        .parse()
        .context("parsing simulator address")?;
    let link = XPlaneLink::connect(
        remote,
        Duration::from_millis(config.simulator.receive_timeout_ms),
    )
    .context("binding simulator socket")?;
    let sim = link.commands().context("cloning command socket")?;
    info!(%remote, "waiting for simulator");

    let mut panel_session = PanelSession::new(
        panel,
        caps,
        Duration::from_millis(config.panel.poll_timeout_ms),
    )?;
    panel_session.startup(&config.brightness)?;

    let subs = subscription_keys(&panel_session.bindings);
    let reconnect_interval = Duration::from_millis(config.simulator.reconnect_interval_ms);

    let (tx, rx) = watch::channel(TelemetryState::Disconnected);
    let shutdown = Arc::new(AtomicBool::new(false));

    let telemetry_shutdown = Arc::clone(&shutdown);
    let telemetry_task = tokio::task::spawn_blocking(move || {
        run_telemetry_loop(link, subs, tx, telemetry_shutdown, reconnect_interval)
    });

    let poll_shutdown = Arc::clone(&shutdown);
    let poll_task =
        tokio::task::spawn_blocking(move || run_panel_loop(panel_session, rx, sim, poll_shutdown));

    info!("Press Ctrl+C to exit");
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down...");
    shutdown.store(true, Ordering::Relaxed);

    let _ = telemetry_task.await;
    let _ = poll_task.await;
    info!("shutdown complete");

    Ok(())
}
