//! # Turret Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Misalignment between the turret and the target as seen by the vision sensor.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetAngles {
    /// Units: degrees
    pub horizontal_deg: f64,

    /// Units: degrees
    pub vertical_deg: f64,
}

/// Normalised outputs of the yaw and pitch axes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurretDems {
    pub yaw: f64,
    pub pitch: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A two-axis (yaw, pitch) turret with an optional vision sensor.
pub trait Turret {
    /// Yaw axis position.
    ///
    /// Units: encoder ticks
    fn yaw_position_ticks(&self) -> f64;

    /// Pitch axis position.
    ///
    /// Units: encoder ticks
    fn pitch_position_ticks(&self) -> f64;

    /// Set the normalised outputs of both axes, between -1 and +1.
    fn set_percent_output(&mut self, dems: TurretDems);

    /// The angles to the target reported by the vision sensor, or `None` if
    /// there is no sensor or no target is in view.
    fn target_angles(&self) -> Option<TargetAngles>;
}
