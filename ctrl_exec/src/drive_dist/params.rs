//! Distance drive parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::ctrl::PidGains;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for driving a distance, loaded from `drive_dist.toml`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    /// Gains of the distance loop, acting on error in motor rotations.
    pub distance_gains: PidGains,

    /// Gains of the heading loop, acting on error in degrees.
    pub heading_gains: PidGains,

    /// Scale of the heading loop output.
    pub heading_inhibitor: f64,

    /// Distance error below which the drive is complete.
    ///
    /// Units: rotations
    pub allowable_error_rot: f64,

    /// Distance driven by a target built from these parameters.
    ///
    /// Units: inches
    pub test_distance_in: f64,

    /// Output limit of a target built from these parameters.
    pub test_power: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            distance_gains: PidGains::pid(0.03, 0.0, 0.0),
            heading_gains: PidGains::pid(0.05, 0.0, 0.0),
            heading_inhibitor: 0.3,
            allowable_error_rot: 0.25,
            test_distance_in: 0.0,
            test_power: 0.0,
        }
    }
}
