//! Aim hold parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::ctrl::PidGains;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for holding the turret on a target, loaded from
/// `aim_hold.toml`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    /// Gains of the yaw loop, acting on error in ticks.
    pub yaw_gains: PidGains,

    /// Gains of the pitch loop, acting on error in ticks.
    pub pitch_gains: PidGains,

    /// Limit on the magnitude of the yaw output.
    pub yaw_high_output: f64,

    /// Limit on the magnitude of the pitch output.
    pub pitch_high_output: f64,

    /// Units: ticks
    pub yaw_allowable_error_ticks: f64,

    /// Units: ticks
    pub pitch_allowable_error_ticks: f64,

    /// Vision angles below which the turret counts as aligned when the hold
    /// is cancelable.
    ///
    /// Units: degrees
    pub soft_align_deg: f64,

    /// Yaw ticks per inch of sideways offset of the vehicle from its nominal
    /// starting position.
    pub yaw_ticks_per_inch: f64,

    /// Yaw target with no starting offset.
    ///
    /// Units: ticks
    pub init_yaw_target_ticks: f64,

    /// Sideways offset of the vehicle from its nominal starting position.
    ///
    /// Units: inches
    pub start_offset_in: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            yaw_gains: PidGains {
                k_p: 0.009,
                k_i: 0.001,
                k_d: 0.0,
                k_f: 0.0,
                i_zone: 100_000.0,
            },
            pitch_gains: PidGains {
                k_p: 5.0,
                k_i: 0.0,
                k_d: 0.0,
                k_f: 0.0,
                i_zone: 75.0,
            },
            yaw_high_output: 1.0,
            pitch_high_output: 1.0,
            yaw_allowable_error_ticks: 20.0,
            pitch_allowable_error_ticks: 3.0,
            soft_align_deg: 3.0,
            yaw_ticks_per_inch: 60.0,
            init_yaw_target_ticks: 0.0,
            start_offset_in: 0.0,
        }
    }
}
