//! Coordinate transform between simulation space and display space.
//!
//! The simulation uses a mathematical convention (y grows upward, unscaled
//! units); the canvas uses a raster convention (y grows downward, pixels,
//! origin at the center). The transform is a pure scale-and-flip in both
//! directions, with the round-trip law `to_simulation(to_display(p)) == p`
//! within floating tolerance.

use swarmview_types::{DisplayCircle, DisplayPoint, EnclosingCircle, SimPoint};

/// Bidirectional mapping between simulation space and display space,
/// parameterized by a positive pixel-per-unit scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    scale: f64,
}

impl CoordinateTransform {
    /// Create a transform with the given pixels-per-simulation-unit scale.
    ///
    /// Returns `None` unless `scale` is finite and strictly positive.
    pub fn new(scale: f64) -> Option<Self> {
        if scale.is_finite() && scale > 0.0 {
            Some(Self { scale })
        } else {
            None
        }
    }

    /// The pixels-per-simulation-unit scale.
    pub const fn scale(self) -> f64 {
        self.scale
    }

    /// Map a simulation-space point to display space.
    pub fn to_display(self, p: SimPoint) -> DisplayPoint {
        DisplayPoint::new(p.x * self.scale, -p.y * self.scale)
    }

    /// Map a display-space point back to simulation space.
    pub fn to_simulation(self, p: DisplayPoint) -> SimPoint {
        SimPoint::new(p.x / self.scale, -p.y / self.scale)
    }

    /// Map enclosing-circle geometry to display space. Lengths scale by the
    /// same factor as coordinates.
    pub fn circle_to_display(self, circle: &EnclosingCircle) -> DisplayCircle {
        DisplayCircle {
            center: self.to_display(circle.center),
            radius: circle.radius * self.scale,
        }
    }
}
