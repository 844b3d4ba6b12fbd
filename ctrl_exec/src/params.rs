//! # Control Executable Parameters
//!
//! Parameters shared by every controller, describing the drivetrain, and the
//! parameters of the executable itself.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Physical description of the drivetrain, loaded from `drivetrain.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainParams {
    /// Motor rotations needed to drive one inch.
    ///
    /// Units: rotations/inch
    pub rotations_per_inch: f64,

    /// Distance between the left and right wheels.
    ///
    /// Units: inches
    pub wheel_base_width_in: f64,

    /// Weight of the vehicle.
    ///
    /// Units: pound-force
    pub robot_weight_lbf: f64,

    /// Speed of the vehicle at full open-loop output, used by the simulated
    /// drivetrain.
    ///
    /// Units: inches/second
    pub max_free_speed_ips: f64,
}

/// Parameters of the executable, loaded from `ctrl_exec.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CtrlExecParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Maximum number of cycles to run a controller for before cancelling
    /// it. Zero means no limit.
    pub max_cycles: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DrivetrainParams {
    fn default() -> Self {
        Self {
            rotations_per_inch: 0.4193,
            wheel_base_width_in: 24.0,
            robot_weight_lbf: 125.0,
            max_free_speed_ips: 150.0,
        }
    }
}

impl DrivetrainParams {
    /// Convert a linear speed to motor RPM.
    pub fn ips_to_rpm(&self, ips: f64) -> f64 {
        ips * self.rotations_per_inch * 60.0
    }

    /// Convert motor RPM to a linear speed.
    pub fn rpm_to_ips(&self, rpm: f64) -> f64 {
        rpm / 60.0 / self.rotations_per_inch
    }
}

impl Default for CtrlExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            max_cycles: 0,
        }
    }
}
