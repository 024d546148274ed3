//! User-visible error types for the control surface.

/// Reasons a start request is rejected locally, before anything is sent to
/// the simulator.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StartError {
    /// User-defined placement was selected but no initial position has been
    /// placed yet.
    #[error("user-defined placement requires at least one placed position")]
    NoPlacedPositions,

    /// The outbound simulation channel is gone; the request cannot be sent.
    #[error("simulation channel is closed")]
    ChannelClosed,
}

/// Reasons a control command is rejected. These are surfaced to the user;
/// they never terminate the playback loop.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    /// A start request failed local validation or emission.
    #[error("start rejected: {source}")]
    Start {
        /// The underlying start failure.
        #[from]
        source: StartError,
    },

    /// A point was injected outside user-defined placement mode.
    #[error("point placement requires user-defined placement mode")]
    PlacementDisabled,
}

/// Failure to reach the playback loop from a control handle.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ControlError {
    /// The playback loop has exited and no longer accepts commands.
    #[error("viewer loop is no longer running")]
    Disconnected,
}
