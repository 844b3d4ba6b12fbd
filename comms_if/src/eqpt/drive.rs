//! # Drivetrain Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::geom::Pose;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Configuration of the closed-loop velocity controllers running on the drive motor controllers.
///
/// The gains act on velocity error in RPM and produce a normalised output.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityLoopCfg {
    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,
    pub k_f: f64,

    /// Error magnitude (RPM) above which the integral term is cleared.
    pub i_zone: f64,

    /// Lowest normalised output of the loop.
    pub out_min: f64,

    /// Highest normalised output of the loop.
    pub out_max: f64,

    /// Time taken to ramp the output from zero to full.
    ///
    /// Units: seconds
    pub ramp_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A demand issued to both sides of the drivetrain.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriveDems {
    /// Closed-loop velocity setpoints for the left and right sides.
    ///
    /// Units: RPM of the drive motors
    Velocity { left_rpm: f64, right_rpm: f64 },

    /// Open-loop normalised output, between -1 and +1.
    PercentOutput { left: f64, right: f64 },
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A differential drivetrain with a heading sensor and pose estimate.
pub trait Drivetrain {
    /// Cumulative position of the left side drive motors.
    ///
    /// Units: rotations
    fn left_position_rot(&self) -> f64;

    /// Cumulative position of the right side drive motors.
    ///
    /// Units: rotations
    fn right_position_rot(&self) -> f64;

    /// The current estimate of the vehicle pose.
    fn pose(&self) -> Pose;

    /// The heading reported by the heading sensor, in degrees [0, 360).
    ///
    /// If the sensor is disconnected this is the last good value.
    fn heading_deg(&self) -> f64 {
        self.pose().heading_deg()
    }

    /// Returns true if the heading sensor is connected.
    fn heading_connected(&self) -> bool;

    /// Set closed-loop velocity setpoints on both sides.
    fn set_velocity_rpm(&mut self, left_rpm: f64, right_rpm: f64);

    /// Set open-loop normalised output on both sides.
    fn set_percent_output(&mut self, left: f64, right: f64);

    /// Configure the closed-loop velocity controllers.
    fn configure_velocity_loop(&mut self, cfg: &VelocityLoopCfg);

    /// Set both sides to a demand.
    fn set_dems(&mut self, dems: DriveDems) {
        match dems {
            DriveDems::Velocity { left_rpm, right_rpm } => {
                self.set_velocity_rpm(left_rpm, right_rpm)
            }
            DriveDems::PercentOutput { left, right } => self.set_percent_output(left, right),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveDems {
    /// Demand which stops both sides.
    pub fn stop() -> Self {
        DriveDems::PercentOutput {
            left: 0.0,
            right: 0.0,
        }
    }

    /// Returns true if the demand leaves both sides at zero output.
    pub fn is_stop(&self) -> bool {
        match *self {
            DriveDems::Velocity { left_rpm, right_rpm } => left_rpm == 0.0 && right_rpm == 0.0,
            DriveDems::PercentOutput { left, right } => left == 0.0 && right == 0.0,
        }
    }
}

impl Default for DriveDems {
    fn default() -> Self {
        Self::stop()
    }
}
