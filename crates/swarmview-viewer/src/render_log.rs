//! Renderer that emits draw calls as structured tracing events.
//!
//! Useful for headless runs: pipe the log through `jq` (or just read it)
//! to watch the paced playback without a canvas. A real deployment swaps
//! this for a `WebSocket`-to-canvas bridge; the engine cannot tell the
//! difference.

use swarmview_core::{Renderer, RobotSprite};
use swarmview_types::DisplayCircle;
use tracing::{debug, info};

/// How often to log a frame summary at info level.
const SUMMARY_EVERY: u64 = 30;

/// Renderer logging every draw call via `tracing`.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    frames: u64,
    robots_this_frame: u32,
}

impl TraceRenderer {
    /// Create a fresh trace renderer.
    pub const fn new() -> Self {
        Self {
            frames: 0,
            robots_this_frame: 0,
        }
    }
}

impl Renderer for TraceRenderer {
    fn begin_frame(&mut self, time: f64) {
        self.robots_this_frame = 0;
        debug!(sim_time = time, "Frame begin");
    }

    fn draw_robot(&mut self, sprite: &RobotSprite) {
        self.robots_this_frame = self.robots_this_frame.saturating_add(1);
        debug!(
            robot = %sprite.id,
            x = sprite.position.x,
            y = sprite.position.y,
            color = %sprite.color,
            label = %sprite.label,
            status = sprite.status.as_deref(),
            "Draw robot"
        );
    }

    fn draw_overlay(&mut self, circle: &DisplayCircle) {
        info!(
            x = circle.center.x,
            y = circle.center.y,
            radius = circle.radius,
            "Draw enclosing-circle overlay"
        );
    }

    fn end_frame(&mut self) {
        self.frames = self.frames.saturating_add(1);
        if self.frames % SUMMARY_EVERY == 0 {
            info!(
                frames = self.frames,
                robots = self.robots_this_frame,
                "Playback progressing"
            );
        }
    }
}
