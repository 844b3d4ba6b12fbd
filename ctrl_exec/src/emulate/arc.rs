//! # Arc fitting and wheel kinematics
//!
//! Each cycle the next few path points are approximated by a single arc of
//! constant curvature. The arc's length and total turn set the ratio of the
//! wheel speeds, and its radius sets how fast the vehicle can take the corner
//! without slipping.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::Params;
use crate::params::DrivetrainParams;
use crate::path::polyline_length;
use util::{
    geom::Pose,
    maths::{angle_diff_deg, clamp, inches_to_meters, lbf_to_newtons, meters_to_inches, weight_lbf_to_mass_kg},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An arc approximating the immediate path.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct FittedArc {
    /// Units: inches
    pub length_in: f64,

    /// Total signed turn along the arc, positive to the left.
    ///
    /// Units: degrees
    pub turn_deg: f64,
}

/// Speeds of both sides of the drivetrain.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct WheelSpeeds {
    /// Units: inches/second
    pub left_ips: f64,

    /// Units: inches/second
    pub right_ips: f64,

    /// Tangential speed of the vehicle centre.
    ///
    /// Units: inches/second
    pub base_ips: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the immediate path: the current position, facing the direction of
/// travel, followed by up to `size` points starting at `start`.
pub fn immediate_path(
    points: &[Pose],
    pose: &Pose,
    travel_heading_deg: f64,
    start: usize,
    size: usize,
) -> Vec<Pose> {
    let mut immediate = Vec::with_capacity(size + 1);
    immediate.push(pose.with_heading(travel_heading_deg));

    if start < points.len() {
        immediate.extend(points[start..].iter().take(size).copied());
    }

    immediate
}

/// Fit an arc to the immediate path.
///
/// The turn is the sum of the heading changes between consecutive segments,
/// starting from the first pose's heading.
pub fn fit_arc(immediate: &[Pose]) -> FittedArc {
    let mut turn_deg = 0.0;

    if let Some(first) = immediate.first() {
        let mut last_heading = first.heading_deg();

        for w in immediate.windows(2) {
            let heading = w[0].heading_to(&w[1]);
            turn_deg += angle_diff_deg(last_heading, heading);
            last_heading = heading;
        }
    }

    FittedArc {
        length_in: polyline_length(immediate),
        turn_deg,
    }
}

/// Change in recorded heading between the first and last path points of the
/// immediate path, 0 if there are no path points.
pub fn heading_change_deg(immediate: &[Pose]) -> f64 {
    match (immediate.get(1), immediate.last()) {
        (Some(first), Some(last)) if immediate.len() >= 2 => {
            angle_diff_deg(first.heading_deg(), last.heading_deg())
        }
        _ => 0.0,
    }
}

/// Fastest speed at which an arc of the given radius can be driven before
/// the tyres slip, limited to the configured speed range.
///
/// A NaN radius gives the maximum speed.
pub fn best_tangential_speed(radius_in: f64, params: &Params, drivetrain: &DrivetrainParams) -> f64 {
    if radius_in.is_nan() {
        return params.max_speed_ips;
    }

    let normal_force_n = lbf_to_newtons(drivetrain.robot_weight_lbf);
    let mass_kg = weight_lbf_to_mass_kg(drivetrain.robot_weight_lbf);

    let speed_ms = (inches_to_meters(radius_in).abs() * params.coeff_friction * normal_force_n
        / mass_kg)
        .sqrt();

    clamp(
        &meters_to_inches(speed_ms),
        &params.min_speed_ips,
        &params.max_speed_ips,
    )
}

/// Get the wheel speeds which drive along the arc.
///
/// A zero turn or a degenerate arc drives straight at the maximum speed. If
/// `should_zero_turn` is set the vehicle drives straight at the speed the
/// arc allows.
pub fn wheel_speeds(
    arc_length_in: f64,
    turn_rad: f64,
    is_forwards: bool,
    should_zero_turn: bool,
    params: &Params,
    drivetrain: &DrivetrainParams,
) -> WheelSpeeds {
    let sign = if is_forwards { 1.0 } else { -1.0 };

    if turn_rad == 0.0 || !turn_rad.is_finite() || !(arc_length_in > 0.0 && arc_length_in.is_finite())
    {
        return WheelSpeeds {
            left_ips: sign * params.max_speed_ips,
            right_ips: sign * params.max_speed_ips,
            base_ips: params.max_speed_ips,
        };
    }

    let radius_in = arc_length_in / turn_rad;
    let base_ips = best_tangential_speed(radius_in, params, drivetrain);

    if should_zero_turn {
        return WheelSpeeds {
            left_ips: sign * base_ips,
            right_ips: sign * base_ips,
            base_ips,
        };
    }

    let half_width_in = drivetrain.wheel_base_width_in / 2.0;

    // Distance travelled by each side along the arc
    let (left_in, right_in) = if is_forwards {
        (
            turn_rad * (radius_in - half_width_in),
            turn_rad * (radius_in + half_width_in),
        )
    }
    else {
        (
            -turn_rad * (radius_in + half_width_in),
            -turn_rad * (radius_in - half_width_in),
        )
    };

    let time_s = arc_length_in / base_ips;

    WheelSpeeds {
        left_ips: left_in / time_s,
        right_ips: right_in / time_s,
        base_ips,
    }
}

/// Apply the output curve to a velocity setpoint.
///
/// Forward setpoints above the threshold are boosted to compensate for the
/// velocity loops falling short at high speed. Reverse setpoints are passed
/// through unchanged.
pub fn curve_rpm(rpm: f64, params: &Params) -> f64 {
    if rpm > params.curve_threshold_rpm {
        rpm + (rpm - params.curve_offset_rpm) * params.curve_gain
    }
    else {
        rpm
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-9;

    fn straight_points() -> Vec<Pose> {
        (0..10).map(|i| Pose::new(0.0, 10.0 * i as f64, 0.0)).collect()
    }

    #[test]
    fn test_immediate_path() {
        let points = straight_points();
        let pose = Pose::new(1.0, 2.0, 10.0);

        let imm = immediate_path(&points, &pose, 190.0, 3, 5);
        assert_eq!(imm.len(), 6);
        assert_eq!(imm[0], Pose::new(1.0, 2.0, 190.0));
        assert_eq!(imm[1], points[3]);
        assert_eq!(imm[5], points[7]);

        // Truncated at the end of the path
        let imm = immediate_path(&points, &pose, 10.0, 8, 5);
        assert_eq!(imm.len(), 3);

        // Start beyond the end
        let imm = immediate_path(&points, &pose, 10.0, 12, 5);
        assert_eq!(imm.len(), 1);
        assert_eq!(heading_change_deg(&imm), 0.0);
    }

    #[test]
    fn test_fit_arc_straight() {
        let points = straight_points();
        let imm = immediate_path(&points, &Pose::new(0.0, 0.0, 0.0), 0.0, 1, 5);

        let arc = fit_arc(&imm);
        assert!((arc.length_in - 50.0).abs() < EPS);
        assert!(arc.turn_deg.abs() < EPS);
    }

    #[test]
    fn test_fit_arc_left_turn() {
        // Facing +Y, path bends towards -X
        let imm = vec![
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(0.0, 10.0, 0.0),
            Pose::new(-10.0, 20.0, 45.0),
            Pose::new(-20.0, 20.0, 90.0),
        ];

        let arc = fit_arc(&imm);
        assert!((arc.turn_deg - 90.0).abs() < EPS);
        assert!((heading_change_deg(&imm) - 90.0).abs() < EPS);
    }

    #[test]
    fn test_best_tangential_speed() {
        let params = Params::default();
        let dt = DrivetrainParams::default();

        assert_eq!(best_tangential_speed(std::f64::NAN, &params, &dt), params.max_speed_ips);
        assert_eq!(best_tangential_speed(1000.0, &params, &dt), params.max_speed_ips);
        assert_eq!(best_tangential_speed(-1000.0, &params, &dt), params.max_speed_ips);
        assert_eq!(best_tangential_speed(0.5, &params, &dt), params.min_speed_ips);

        // v^2 = r * mu * g
        let radius_in = 12.0;
        let expected =
            meters_to_inches((inches_to_meters(radius_in) * 9.80665).sqrt());
        let speed = best_tangential_speed(radius_in, &params, &dt);
        assert!(expected > params.min_speed_ips && expected < params.max_speed_ips);
        assert!((speed - expected).abs() < 1e-6);
    }

    #[test]
    fn test_best_tangential_speed_non_decreasing() {
        let params = Params::default();
        let dt = DrivetrainParams::default();

        let mut last = 0.0;
        let mut radius_in = 0.1;
        while radius_in < 5000.0 {
            let speed = best_tangential_speed(radius_in, &params, &dt);

            assert!(speed >= params.min_speed_ips && speed <= params.max_speed_ips);
            assert!(speed >= last, "{} in -> {} < {}", radius_in, speed, last);

            // Turning left or right gives the same speed
            assert_eq!(speed, best_tangential_speed(-radius_in, &params, &dt));

            last = speed;
            radius_in *= 1.1;
        }

        // Both limits are reached
        assert_eq!(best_tangential_speed(0.1, &params, &dt), params.min_speed_ips);
        assert_eq!(last, params.max_speed_ips);
    }

    #[test]
    fn test_wheel_speeds_straight() {
        let params = Params::default();
        let dt = DrivetrainParams::default();

        let fwd = wheel_speeds(50.0, 0.0, true, false, &params, &dt);
        assert_eq!(fwd.left_ips, params.max_speed_ips);
        assert_eq!(fwd.right_ips, params.max_speed_ips);

        let bwd = wheel_speeds(50.0, 0.0, false, true, &params, &dt);
        assert_eq!(bwd.left_ips, -params.max_speed_ips);
        assert_eq!(bwd.right_ips, -params.max_speed_ips);

        // Degenerate arcs drive straight
        let zero_len = wheel_speeds(0.0, 0.5, true, false, &params, &dt);
        assert_eq!(zero_len.left_ips, zero_len.right_ips);
        let inf_len = wheel_speeds(std::f64::INFINITY, 0.5, true, false, &params, &dt);
        assert_eq!(inf_len.left_ips, inf_len.right_ips);
    }

    #[test]
    fn test_wheel_speeds_turning() {
        let params = Params::default();
        let dt = DrivetrainParams::default();

        // Left turn forwards, right side faster
        let s = wheel_speeds(60.0, 0.5, true, false, &params, &dt);
        assert!(s.right_ips > s.left_ips);
        assert!(s.left_ips > 0.0);
        assert!(((s.left_ips + s.right_ips) / 2.0 - s.base_ips).abs() < 1e-9);

        // Difference set by the wheel base
        let time_s = 60.0 / s.base_ips;
        assert!(((s.right_ips - s.left_ips) * time_s - 0.5 * dt.wheel_base_width_in).abs() < 1e-9);

        // Backwards, both negative
        let s = wheel_speeds(60.0, 0.5, false, false, &params, &dt);
        assert!(s.left_ips < 0.0 && s.right_ips < 0.0);
        assert!(s.left_ips < s.right_ips);

        // Zero turn pivot holds direction at base speed
        let s = wheel_speeds(60.0, 0.5, true, true, &params, &dt);
        assert_eq!(s.left_ips, s.base_ips);
        assert_eq!(s.right_ips, s.base_ips);
    }

    #[test]
    fn test_curve_rpm() {
        let params = Params::default();

        assert_eq!(curve_rpm(1000.0, &params), 1000.0);
        assert_eq!(curve_rpm(1132.0, &params), 1132.0);
        assert!((curve_rpm(2040.0, &params) - 2840.0).abs() < EPS);

        // Reverse setpoints are not curved
        assert_eq!(curve_rpm(-2040.0, &params), -2040.0);
        assert_eq!(curve_rpm(-1000.0, &params), -1000.0);
    }
}
