//! Geometry primitives for the two coordinate spaces.
//!
//! The remote simulation uses a mathematical convention (y grows upward,
//! unscaled units); the display uses a raster convention (y grows downward,
//! pixel units). [`SimPoint`] and [`DisplayPoint`] are distinct types so the
//! two spaces cannot be mixed by accident -- conversion goes through the
//! coordinate transform and nowhere else.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A point in simulation space (y grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimPoint {
    /// Horizontal coordinate in simulation units.
    pub x: f64,
    /// Vertical coordinate in simulation units (positive = up).
    pub y: f64,
}

impl SimPoint {
    /// Create a point from simulation-space coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in display space (y grows downward, pixel units, origin at the
/// canvas center).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DisplayPoint {
    /// Horizontal coordinate in pixels.
    pub x: f64,
    /// Vertical coordinate in pixels (positive = down).
    pub y: f64,
}

impl DisplayPoint {
    /// Create a point from display-space coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Enclosing-circle geometry in simulation space, delivered on the ingress
/// side channel when the remote run computes one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnclosingCircle {
    /// Circle center in simulation space.
    pub center: SimPoint,
    /// Circle radius in simulation units.
    pub radius: f64,
}

/// Enclosing-circle geometry after conversion to display space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DisplayCircle {
    /// Circle center in display space.
    pub center: DisplayPoint,
    /// Circle radius in pixels.
    pub radius: f64,
}
