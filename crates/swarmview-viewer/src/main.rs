//! Headless viewer binary for the Swarmview playback engine.
//!
//! Wires together the playback engine, a scripted demo ingress feed, and a
//! tracing renderer, then runs the playback loop to completion. This is
//! the full data path of a real deployment with the transport and canvas
//! swapped for in-process stand-ins.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `swarmview-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the playback engine and its channels
//! 4. Spawn the demo simulation feeder
//! 5. Issue the start request through the control surface
//! 6. Run the playback loop
//! 7. Log the result

mod demo;
mod error;
mod render_log;

use std::path::Path;

use swarmview_core::{
    control_channel, log_viewer_end, run_viewer, PlaybackEngine, ViewerConfig,
};
use swarmview_types::SimulationRequest;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ViewerError;
use crate::render_log::TraceRenderer;

/// Environment variable overriding the config file path.
const CONFIG_ENV: &str = "SWARMVIEW_CONFIG";

/// Default config file path, relative to the working directory.
const CONFIG_PATH: &str = "swarmview-config.yaml";

/// Application entry point for the viewer.
///
/// # Errors
///
/// Returns an error if configuration loading or any startup step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(true)
        .init();

    info!(
        frame_interval_ms = config.playback.frame_interval_ms,
        scale = config.display.scale,
        "swarmview-viewer starting"
    );

    // 3. Create the engine and its channels.
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (ingress_tx, ingress_rx) = mpsc::unbounded_channel();
    let (control, commands_rx) = control_channel();
    let mut engine = PlaybackEngine::new(&config, request_tx).map_err(ViewerError::from)?;
    let mut renderer = TraceRenderer::new();

    // 4. Spawn the demo feeder standing in for the remote simulation.
    let feeder = tokio::spawn(demo::feed(ingress_tx, request_rx));

    // 5. Issue the start request through the control surface.
    control
        .start(SimulationRequest::default())
        .map_err(ViewerError::from)?;

    // Shut the loop down cleanly once the demo run is over.
    let shutdown = control.clone();
    tokio::spawn(async move {
        if feeder.await.is_err() {
            warn!("Demo feeder panicked");
        }
        let _ = shutdown.shutdown();
    });

    // 6. Run the playback loop.
    let result = run_viewer(&mut engine, &mut renderer, ingress_rx, commands_rx).await;

    // 7. Log the result.
    log_viewer_end(&result);
    info!(status = ?engine.status(), "Final viewer status");
    Ok(())
}

/// Load the viewer configuration.
///
/// The path comes from `SWARMVIEW_CONFIG` when set, falling back to
/// `swarmview-config.yaml` in the working directory. A missing file is not
/// an error; defaults apply.
fn load_config() -> Result<ViewerConfig, ViewerError> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_PATH.to_owned());
    let path = Path::new(&path);
    if path.exists() {
        Ok(ViewerConfig::from_file(path)?)
    } else {
        eprintln!("config file {} not found, using defaults", path.display());
        Ok(ViewerConfig::default())
    }
}
