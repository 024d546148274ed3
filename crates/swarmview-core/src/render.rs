//! Renderer contract.
//!
//! The engine is renderer-agnostic: anything that can draw circles and text
//! (a canvas bridge, a terminal plotter, a tracing logger in headless runs)
//! implements [`Renderer`]. The engine calls it exactly once per rendered
//! tick: `begin_frame`, one `draw_robot` per robot in the store, then
//! `end_frame`. A fenced overlay produces one extra `draw_overlay` call
//! after playback stalls.
//!
//! Renderers receive per-tick read access only and must not retain sprite
//! references across ticks -- the underlying records are mutated in place
//! on the next cycle.

use swarmview_types::{DisplayCircle, DisplayPoint, RobotId};

use crate::store::DisplayColor;

/// Everything a renderer needs to draw one robot.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotSprite {
    /// The robot's id.
    pub id: RobotId,
    /// Position in display space.
    pub position: DisplayPoint,
    /// Fill/stroke color.
    pub color: DisplayColor,
    /// Radius in display pixels.
    pub radius: f64,
    /// Label text (lifecycle phase, with multiplicity when above one).
    pub label: String,
    /// Auxiliary fault/status text, when a fault is present.
    pub status: Option<String>,
}

/// Consumer of reconciled entity state, invoked once per rendered tick.
pub trait Renderer: Send {
    /// Start a frame at the given simulation time (clear the surface,
    /// update the time readout).
    fn begin_frame(&mut self, time: f64);

    /// Draw one robot.
    fn draw_robot(&mut self, sprite: &RobotSprite);

    /// Draw enclosing-circle overlay geometry. Called at most once per
    /// session, after playback stalls.
    fn draw_overlay(&mut self, circle: &DisplayCircle);

    /// Finish the current frame.
    fn end_frame(&mut self);
}

/// A renderer that draws nothing. Useful for headless runs and tests that
/// only exercise scheduling.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn begin_frame(&mut self, _time: f64) {}
    fn draw_robot(&mut self, _sprite: &RobotSprite) {}
    fn draw_overlay(&mut self, _circle: &DisplayCircle) {}
    fn end_frame(&mut self) {}
}
