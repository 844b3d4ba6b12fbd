//! # Simulated Hardware
//!
//! Simple kinematic models of the drivetrain and turret which stand in for
//! the hardware drivers. They are used by the executable when running off
//! the vehicle and by the controller tests.
//!
//! The models assume the motor controllers track their setpoints perfectly:
//!
//! - Velocity setpoints are converted straight to wheel speed.
//! - Percent output is scaled by the free speed of the drivetrain.
//!
//! The simulation only advances when `step` is called, so tests can hold the
//! vehicle still between cycles.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;
use nalgebra::Vector2;

use crate::params::DrivetrainParams;
use comms_if::eqpt::{
    drive::{DriveDems, Drivetrain, VelocityLoopCfg},
    turret::{TargetAngles, Turret, TurretDems},
};
use util::{geom::Pose, maths::clamp};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A simulated differential drivetrain.
pub struct SimDrivetrain {
    params: DrivetrainParams,

    dt_s: f64,

    /// True pose of the vehicle
    pose: Pose,

    /// Heading reported by the sensor, frozen while it is disconnected
    sensed_heading_deg: f64,

    heading_connected: bool,

    left_position_rot: f64,
    right_position_rot: f64,

    dems: DriveDems,

    num_dems: u64,

    velocity_loop_cfg: Option<VelocityLoopCfg>,
}

/// A simulated turret.
pub struct SimTurret {
    dt_s: f64,

    /// Yaw speed at full output
    ///
    /// Units: ticks/second
    yaw_rate_tps: f64,

    /// Pitch speed at full output
    ///
    /// Units: ticks/second
    pitch_rate_tps: f64,

    yaw_ticks: f64,
    pitch_ticks: f64,

    dems: TurretDems,

    target_angles: Option<TargetAngles>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimDrivetrain {
    pub fn new(params: DrivetrainParams, dt_s: f64) -> Self {
        Self {
            params,
            dt_s,
            pose: Pose::default(),
            sensed_heading_deg: 0.0,
            heading_connected: true,
            left_position_rot: 0.0,
            right_position_rot: 0.0,
            dems: DriveDems::stop(),
            num_dems: 0,
            velocity_loop_cfg: None,
        }
    }

    /// Place the vehicle at the given pose.
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self.sensed_heading_deg = pose.heading_deg();
        self
    }

    /// Connect or disconnect the heading sensor.
    pub fn set_heading_connected(&mut self, connected: bool) {
        self.heading_connected = connected;
    }

    /// The last demand issued to the drivetrain.
    pub fn last_dems(&self) -> DriveDems {
        self.dems
    }

    /// Number of demands issued since creation.
    pub fn num_dems(&self) -> u64 {
        self.num_dems
    }

    pub fn velocity_loop_cfg(&self) -> Option<&VelocityLoopCfg> {
        self.velocity_loop_cfg.as_ref()
    }

    /// The true pose, regardless of the state of the heading sensor.
    pub fn true_pose(&self) -> Pose {
        self.pose
    }

    /// Current left and right speeds.
    ///
    /// Units: inches/second
    pub fn wheel_speeds_ips(&self) -> (f64, f64) {
        match self.dems {
            DriveDems::Velocity {
                left_rpm,
                right_rpm,
            } => (
                self.params.rpm_to_ips(left_rpm),
                self.params.rpm_to_ips(right_rpm),
            ),
            DriveDems::PercentOutput { left, right } => {
                let max = self.params.max_free_speed_ips;
                (
                    clamp(&left, &-1.0, &1.0) * max,
                    clamp(&right, &-1.0, &1.0) * max,
                )
            }
        }
    }

    /// Advance the simulation by one period.
    pub fn step(&mut self) {
        let (left_ips, right_ips) = self.wheel_speeds_ips();

        let speed_ips = (left_ips + right_ips) / 2.0;
        let turn_rate_rads = (right_ips - left_ips) / self.params.wheel_base_width_in;

        // Integrate along the mean heading of the step
        let heading_rad = self.pose.heading_deg().to_radians();
        let mid_heading_rad = heading_rad + 0.5 * turn_rate_rads * self.dt_s;
        let dist_in = speed_ips * self.dt_s;

        let direction = Vector2::new(-mid_heading_rad.sin(), mid_heading_rad.cos());
        let position = self.pose.position() + direction * dist_in;

        self.pose = Pose::new(
            position[0],
            position[1],
            (heading_rad + turn_rate_rads * self.dt_s).to_degrees(),
        );

        if self.heading_connected {
            self.sensed_heading_deg = self.pose.heading_deg();
        }

        self.left_position_rot += left_ips * self.dt_s * self.params.rotations_per_inch;
        self.right_position_rot += right_ips * self.dt_s * self.params.rotations_per_inch;
    }
}

impl Drivetrain for SimDrivetrain {
    fn left_position_rot(&self) -> f64 {
        self.left_position_rot
    }

    fn right_position_rot(&self) -> f64 {
        self.right_position_rot
    }

    fn pose(&self) -> Pose {
        self.pose.with_heading(self.sensed_heading_deg)
    }

    fn heading_connected(&self) -> bool {
        self.heading_connected
    }

    fn set_velocity_rpm(&mut self, left_rpm: f64, right_rpm: f64) {
        if self.velocity_loop_cfg.is_none() {
            warn!("Velocity setpoint issued before the velocity loop was configured");
        }

        self.dems = DriveDems::Velocity {
            left_rpm,
            right_rpm,
        };
        self.num_dems += 1;
    }

    fn set_percent_output(&mut self, left: f64, right: f64) {
        self.dems = DriveDems::PercentOutput { left, right };
        self.num_dems += 1;
    }

    fn configure_velocity_loop(&mut self, cfg: &VelocityLoopCfg) {
        self.velocity_loop_cfg = Some(*cfg);
    }
}

impl SimTurret {
    pub fn new(dt_s: f64, yaw_rate_tps: f64, pitch_rate_tps: f64) -> Self {
        Self {
            dt_s,
            yaw_rate_tps,
            pitch_rate_tps,
            yaw_ticks: 0.0,
            pitch_ticks: 0.0,
            dems: TurretDems::default(),
            target_angles: None,
        }
    }

    /// Set what the vision sensor reports.
    pub fn set_target_angles(&mut self, angles: Option<TargetAngles>) {
        self.target_angles = angles;
    }

    pub fn last_dems(&self) -> TurretDems {
        self.dems
    }

    /// Advance the simulation by one period.
    pub fn step(&mut self) {
        self.yaw_ticks += clamp(&self.dems.yaw, &-1.0, &1.0) * self.yaw_rate_tps * self.dt_s;
        self.pitch_ticks += clamp(&self.dems.pitch, &-1.0, &1.0) * self.pitch_rate_tps * self.dt_s;
    }
}

impl Turret for SimTurret {
    fn yaw_position_ticks(&self) -> f64 {
        self.yaw_ticks
    }

    fn pitch_position_ticks(&self) -> f64 {
        self.pitch_ticks
    }

    fn set_percent_output(&mut self, dems: TurretDems) {
        self.dems = dems;
    }

    fn target_angles(&self) -> Option<TargetAngles> {
        self.target_angles
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-6;

    fn sim() -> SimDrivetrain {
        SimDrivetrain::new(DrivetrainParams::default(), 0.02)
    }

    #[test]
    fn test_straight() {
        let mut dt = sim();
        dt.set_percent_output(0.5, 0.5);

        for _ in 0..50 {
            dt.step();
        }

        // 0.5 * 150 in/s for 1 s along +Y
        let pose = dt.pose();
        assert!(pose.x().abs() < EPS);
        assert!((pose.y() - 75.0).abs() < EPS);
        assert_eq!(pose.heading_deg(), 0.0);

        let rot = 75.0 * dt.params.rotations_per_inch;
        assert!((dt.left_position_rot() - rot).abs() < EPS);
        assert!((dt.right_position_rot() - rot).abs() < EPS);
    }

    #[test]
    fn test_turn_in_place() {
        let mut dt = sim();

        // Right side forwards turns left, towards -X
        dt.set_percent_output(-0.1, 0.1);
        dt.step();

        let heading = dt.pose().heading_deg();
        assert!(heading > 0.0 && heading < 90.0);
        assert!(dt.pose().x().abs() < EPS);

        dt.set_percent_output(0.0, 0.0);
        dt.step();
        assert!((dt.pose().heading_deg() - heading).abs() < EPS);
    }

    #[test]
    fn test_velocity_dems() {
        let mut dt = sim();
        let rpm = dt.params.ips_to_rpm(50.0);

        dt.configure_velocity_loop(&VelocityLoopCfg {
            k_p: 0.0004,
            k_i: 0.0,
            k_d: 0.0,
            k_f: 0.0,
            i_zone: 0.0,
            out_min: -1.0,
            out_max: 1.0,
            ramp_s: 0.5,
        });
        dt.set_velocity_rpm(-rpm, -rpm);
        dt.step();

        assert!((dt.pose().y() + 1.0).abs() < EPS);
        assert_eq!(dt.num_dems(), 1);
        assert!(dt.velocity_loop_cfg().is_some());
    }

    #[test]
    fn test_heading_sensor_disconnect() {
        let mut dt = sim();
        dt.set_heading_connected(false);
        dt.set_percent_output(-0.1, 0.1);
        dt.step();

        assert!(!dt.heading_connected());
        assert_eq!(dt.pose().heading_deg(), 0.0);
        assert!(dt.true_pose().heading_deg() > 0.0);
    }

    #[test]
    fn test_turret() {
        let mut t = SimTurret::new(0.02, 1000.0, 100.0);
        t.set_percent_output(TurretDems { yaw: 0.5, pitch: -2.0 });
        t.step();

        assert!((t.yaw_position_ticks() - 10.0).abs() < EPS);
        assert!((t.pitch_position_ticks() + 2.0).abs() < EPS);
        assert!(t.target_angles().is_none());
    }
}
