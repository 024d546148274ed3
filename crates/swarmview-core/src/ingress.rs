//! Ingress and control channel contracts.
//!
//! The wire transport itself is out of scope: the engine consumes an
//! arbitrary duplex event channel, realized here as tokio mpsc pairs. An
//! adapter (`WebSocket` bridge, server-sent-events reader, in-process demo
//! feeder) translates its transport into [`IngressEvent`]s and forwards
//! [`ViewerRequest`]s back to the simulator.
//!
//! The control surface is the narrow command interface between any
//! presentation layer and the engine: presentation code holds a
//! [`ControlHandle`] and never touches engine internals.

use swarmview_types::{
    DisplayPoint, EnclosingCircle, SessionId, SimulationRequest, Snapshot,
};
use tokio::sync::mpsc;

use crate::error::ControlError;

/// One event delivered by the ingress adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum IngressEvent {
    /// A new simulation run begins; all previous buffered data is stale.
    SessionStart(SessionId),
    /// One snapshot produced by the tagged run.
    Snapshot {
        /// The run that produced this snapshot.
        session: SessionId,
        /// The snapshot payload.
        snapshot: Snapshot,
    },
    /// Derived overlay geometry for the tagged run, delivered on the side
    /// channel when the remote algorithm computes an enclosing circle.
    Overlay {
        /// The run that produced this geometry.
        session: SessionId,
        /// Enclosing-circle geometry in simulation space.
        circle: EnclosingCircle,
    },
    /// The active run has ended; buffered-but-undisplayed snapshots are
    /// discarded.
    SessionEnd,
}

/// The engine's only outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerRequest {
    /// Ask the remote side to start a simulation with these parameters.
    StartSimulation(SimulationRequest),
}

/// One command from the control surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    /// Validate and forward a start request.
    Start(SimulationRequest),
    /// Suspend pacing; buffering continues.
    Pause,
    /// Resume pacing from where it left off.
    Resume,
    /// Clear queue, store, session, and placed points; return to idle.
    Reset,
    /// Place one initial position (display-space canvas click). Valid only
    /// in user-defined placement mode.
    InjectPoint(DisplayPoint),
    /// Stop the playback loop cleanly.
    Shutdown,
}

/// Cloneable handle that presentation code uses to drive the engine.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: mpsc::UnboundedSender<ViewerCommand>,
}

impl ControlHandle {
    /// Send a start request.
    pub fn start(&self, request: SimulationRequest) -> Result<(), ControlError> {
        self.send(ViewerCommand::Start(request))
    }

    /// Pause playback.
    pub fn pause(&self) -> Result<(), ControlError> {
        self.send(ViewerCommand::Pause)
    }

    /// Resume playback.
    pub fn resume(&self) -> Result<(), ControlError> {
        self.send(ViewerCommand::Resume)
    }

    /// Reset the engine to idle, discarding all buffered state.
    pub fn reset(&self) -> Result<(), ControlError> {
        self.send(ViewerCommand::Reset)
    }

    /// Place one initial position from a canvas click.
    pub fn inject_point(&self, point: DisplayPoint) -> Result<(), ControlError> {
        self.send(ViewerCommand::InjectPoint(point))
    }

    /// Stop the playback loop cleanly.
    pub fn shutdown(&self) -> Result<(), ControlError> {
        self.send(ViewerCommand::Shutdown)
    }

    fn send(&self, command: ViewerCommand) -> Result<(), ControlError> {
        self.tx
            .send(command)
            .map_err(|_| ControlError::Disconnected)
    }
}

/// Create the control channel: a handle for presentation code and the
/// receiver the playback loop drains.
pub fn control_channel() -> (ControlHandle, mpsc::UnboundedReceiver<ViewerCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ControlHandle { tx }, rx)
}
