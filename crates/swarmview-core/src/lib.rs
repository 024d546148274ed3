//! Snapshot buffering, session fencing, and frame-paced playback.
//!
//! This crate is the client-side engine that replays a stream of remotely
//! produced simulation snapshots as smooth, paced animation, decoupling
//! irregular network timing from a fixed visual frame rate. The remote
//! simulation's algorithms, the wire transport, and the pixel-level
//! renderer are all external collaborators behind narrow seams.
//!
//! # Modules
//!
//! - [`queue`] -- Unbounded FIFO snapshot buffer
//! - [`session`] -- Session fencing (admit/drop by session tag)
//! - [`store`] -- Per-robot display state, reconciled from snapshots
//! - [`transform`] -- Simulation-space/display-space coordinate transform
//! - [`engine`] -- The playback state machine owning all of the above
//! - [`runner`] -- The single-task playback loop
//! - [`ingress`] -- Ingress event and control command contracts
//! - [`render`] -- The renderer seam
//! - [`config`] -- Viewer configuration (`swarmview-config.yaml`)
//! - [`error`] -- User-visible control-surface errors

pub mod config;
pub mod engine;
pub mod error;
pub mod ingress;
pub mod queue;
pub mod render;
pub mod runner;
pub mod session;
pub mod store;
pub mod transform;

// Re-export primary types for convenience.
pub use config::{ConfigError, ViewerConfig};
pub use engine::{PlaybackEngine, PlaybackPhase, TickOutcome, ViewerStatus};
pub use error::{CommandError, ControlError, StartError};
pub use ingress::{control_channel, ControlHandle, IngressEvent, ViewerCommand, ViewerRequest};
pub use queue::SnapshotQueue;
pub use render::{NullRenderer, Renderer, RobotSprite};
pub use runner::{log_viewer_end, run_viewer, ViewerEndReason, ViewerResult};
pub use session::SessionFence;
pub use store::{DisplayColor, RobotRecord, RobotStore, ROBOT_RADIUS};
pub use transform::CoordinateTransform;
