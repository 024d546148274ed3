//! Viewer configuration.
//!
//! The canonical configuration lives in `swarmview-config.yaml` at the
//! project root. This module defines strongly-typed structs mirroring the
//! YAML structure and a loader that reads and validates the file. Every
//! field has a default, so an empty file (or no file) yields a working
//! viewer.

use std::path::Path;

use serde::Deserialize;
use swarmview_types::InitMethod;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The display scale must be finite and strictly positive.
    #[error("display.scale must be positive, got {scale}")]
    NonPositiveScale {
        /// The rejected value.
        scale: f64,
    },

    /// The frame interval must be at least one millisecond.
    #[error("playback.frame_interval_ms must be at least 1")]
    ZeroFrameInterval,
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ViewerConfig {
    /// Frame pacing settings.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Display scaling settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Initial-position placement settings.
    #[serde(default)]
    pub placement: PlacementConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ViewerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error for out-of-range values.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error for out-of-range values.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveScale`] or
    /// [`ConfigError::ZeroFrameInterval`] for out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.display.scale.is_finite() && self.display.scale > 0.0) {
            return Err(ConfigError::NonPositiveScale {
                scale: self.display.scale,
            });
        }
        if self.playback.frame_interval_ms == 0 {
            return Err(ConfigError::ZeroFrameInterval);
        }
        Ok(())
    }
}

/// Frame pacing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    /// Minimum wall-clock milliseconds between consecutive rendered frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// Display scaling configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DisplayConfig {
    /// Display pixels per simulation unit.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
        }
    }
}

/// Initial-position placement configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlacementConfig {
    /// Default placement mode before any start request is made.
    #[serde(default)]
    pub method: InitMethod,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            method: InitMethod::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_frame_interval_ms() -> u64 {
    17
}

const fn default_scale() -> f64 {
    10.0
}

fn default_log_level() -> String {
    "info".to_owned()
}
