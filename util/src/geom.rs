//! # Geometry primitives
//!
//! Poses are expressed on the field plane with positions in inches. Headings
//! are in degrees, measured counter-clockwise from the +Y axis, so that a
//! vehicle at the origin facing +Y has a heading of 0 and one facing -X has a
//! heading of 90. A positive change in heading is therefore a left turn.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::maths::{angle_diff_deg, wrap_360};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position and heading on the field plane.
///
/// The heading is always held in the range [0, 360).
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseFields")]
pub struct Pose {
    x: f64,
    y: f64,
    heading_deg: f64,
}

/// Unvalidated pose fields, used so deserialised poses pass through
/// [`Pose::new`].
#[derive(Deserialize)]
struct PoseFields {
    x: f64,
    y: f64,
    heading_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Create a new pose, wrapping the heading into [0, 360).
    pub fn new(x: f64, y: f64, heading_deg: f64) -> Self {
        Self {
            x,
            y,
            heading_deg: wrap_360(heading_deg),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Heading in degrees, [0, 360).
    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    /// Position as a vector.
    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Return a copy of this pose at the same position with a new heading.
    pub fn with_heading(&self, heading_deg: f64) -> Self {
        Self::new(self.x, self.y, heading_deg)
    }

    /// Get the heading (degrees, [0, 360)) of the line from this pose's
    /// position to `other`'s position.
    ///
    /// If both poses share a position the heading is 0.
    pub fn heading_to(&self, other: &Pose) -> f64 {
        let delta = other.position() - self.position();

        wrap_360((-delta[0]).atan2(delta[1]).to_degrees())
    }

    /// Euclidean distance between the positions of the two poses.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        (other.position() - self.position()).norm()
    }

    /// Signed turn in degrees, (-180, 180], from this pose's heading to the
    /// line towards `other`.
    pub fn turn_to(&self, other: &Pose) -> f64 {
        angle_diff_deg(self.heading_deg, self.heading_to(other))
    }
}

impl From<PoseFields> for Pose {
    fn from(f: PoseFields) -> Self {
        Pose::new(f.x, f.y, f.heading_deg)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the direction of travel for a vehicle with the given heading.
///
/// When reversing the vehicle travels along its heading plus 180 degrees.
pub fn forwardsify(heading_deg: f64, is_forwards: bool) -> f64 {
    if is_forwards {
        wrap_360(heading_deg)
    }
    else {
        wrap_360(heading_deg + 180.0)
    }
}
