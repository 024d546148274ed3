//! The playback loop.
//!
//! [`run_viewer`] is the top-level async function that drives a
//! [`PlaybackEngine`] from its two inputs -- the ingress event stream and
//! the control command stream -- plus the pacing timer. Everything runs on
//! one task: a `tokio::select!` multiplexes the three sources, so ingress
//! handling, command handling, and pacing ticks interleave cooperatively
//! and never touch engine state concurrently. Suspension between ticks is
//! implicit in `sleep_until`; pause and session end take effect at the next
//! loop iteration, never mid-tick.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::engine::PlaybackEngine;
use crate::ingress::{IngressEvent, ViewerCommand};
use crate::render::Renderer;

/// Reason why the playback loop exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEndReason {
    /// A shutdown command was received.
    ShutdownRequested,
    /// Every control handle was dropped.
    ControlClosed,
}

/// Result of a playback loop run.
#[derive(Debug)]
pub struct ViewerResult {
    /// Why the loop exited.
    pub end_reason: ViewerEndReason,
    /// Total frames rendered.
    pub frames_rendered: u64,
    /// Total sessions observed.
    pub sessions_observed: u64,
}

/// Run the playback loop until shutdown.
///
/// The loop exits cleanly when a [`ViewerCommand::Shutdown`] arrives or
/// every control handle is dropped. Ingress channel closure is an ingress
/// failure, not a shutdown: the engine drops to a safe idle state and the
/// loop keeps serving control commands.
pub async fn run_viewer(
    engine: &mut PlaybackEngine,
    renderer: &mut dyn Renderer,
    mut events: mpsc::UnboundedReceiver<IngressEvent>,
    mut commands: mpsc::UnboundedReceiver<ViewerCommand>,
) -> ViewerResult {
    info!("Playback loop starting");
    let mut ingress_open = true;

    let end_reason = loop {
        let armed = engine.wants_tick();
        let deadline = engine.next_deadline(Instant::now());

        tokio::select! {
            command = commands.recv() => match command {
                None => {
                    info!("All control handles dropped");
                    break ViewerEndReason::ControlClosed;
                }
                Some(ViewerCommand::Shutdown) => {
                    info!("Shutdown requested");
                    break ViewerEndReason::ShutdownRequested;
                }
                Some(command) => {
                    if let Err(error) = engine.handle_command(command) {
                        // User-visible rejection; the loop itself is fine.
                        warn!(%error, "Command rejected");
                    }
                }
            },
            event = events.recv(), if ingress_open => match event {
                Some(event) => engine.handle_ingress(event),
                None => {
                    ingress_open = false;
                    engine.force_idle();
                }
            },
            () = sleep_until(deadline), if armed => {
                let outcome = engine.tick(Instant::now(), renderer);
                debug!(?outcome, queue_depth = engine.queue_depth(), "Tick");
            },
        }
    };

    ViewerResult {
        end_reason,
        frames_rendered: engine.frames_rendered(),
        sessions_observed: engine.sessions_observed(),
    }
}

/// Log the playback end sequence.
pub fn log_viewer_end(result: &ViewerResult) {
    info!(
        reason = ?result.end_reason,
        frames_rendered = result.frames_rendered,
        sessions_observed = result.sessions_observed,
        "Playback loop ended"
    );
}
