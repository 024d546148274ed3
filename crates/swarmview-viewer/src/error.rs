//! Error types for the viewer binary.

use swarmview_core::{ConfigError, ControlError};

/// Errors that can occur while starting or driving the viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The playback loop went away while we still had commands for it.
    #[error("control error: {source}")]
    Control {
        /// The underlying control error.
        #[from]
        source: ControlError,
    },
}
