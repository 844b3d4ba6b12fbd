//! Path emulation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Internal
use comms_if::eqpt::drive::VelocityLoopCfg;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for path emulation, loaded from `emulate.toml`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    /// Path to emulate when none is given explicitly. Relative paths are
    /// relative to the software root.
    pub path_file: PathBuf,

    /// File the driven trajectory is recorded to. Relative paths are
    /// relative to the software root.
    pub results_file: PathBuf,

    // ---- VELOCITY LOOP ----
    /// Velocity loop proportional gain
    pub vel_k_p: f64,

    /// Velocity loop integral gain
    pub vel_k_i: f64,

    /// Velocity loop derivative gain
    pub vel_k_d: f64,

    /// Velocity loop feed-forward gain
    pub vel_k_f: f64,

    /// Velocity loop integral zone, zero to disable
    pub vel_i_zone: f64,

    /// Lowest normalised output of the velocity loop
    pub vel_out_min: f64,

    /// Highest normalised output of the velocity loop
    pub vel_out_max: f64,

    /// Closed-loop ramp time from zero to full output
    ///
    /// Units: seconds
    pub vel_ramp_s: f64,

    // ---- LOOKAHEAD ----
    /// Points at or beyond this angle from the direction of travel are
    /// considered passed.
    ///
    /// Units: degrees
    pub lookahead_threshold_deg: f64,

    /// Maximum number of points which can be passed in a single cycle.
    pub point_skip_limit: usize,

    /// Maximum number of path points in the immediate path.
    pub immediate_path_size: usize,

    /// Number of points after the current point which are left out of the
    /// immediate path.
    pub points_to_skip: usize,

    // ---- ARC ----
    /// If the fitted turn differs from the heading change of the immediate
    /// path by more than this the vehicle holds its direction instead of
    /// turning.
    ///
    /// Units: degrees
    pub max_heading_to_turn_diff_deg: f64,

    /// Distance to the point two ahead beyond which a correction towards it
    /// is added to the turn.
    ///
    /// Units: inches
    pub positional_correction_distance_in: f64,

    /// Scale of the positional correction.
    pub positional_correction_inhibitor: f64,

    /// Scale applied to every fitted turn.
    pub overturn: f64,

    /// Additional turn scale when driving backwards.
    ///
    /// Empirically tuned, should be recalibrated for a new drivetrain.
    pub backwards_turn_gain: f64,

    // ---- SPEED ----
    /// Units: inches/second
    pub max_speed_ips: f64,

    /// Units: inches/second
    pub min_speed_ips: f64,

    /// Coefficient of friction between the wheels and the ground.
    pub coeff_friction: f64,

    // ---- OUTPUT CURVE ----
    /// Setpoints above this have the output curve applied.
    ///
    /// Units: RPM
    pub curve_threshold_rpm: f64,

    /// Units: RPM
    pub curve_offset_rpm: f64,

    /// Gain of the output curve. Empirically tuned along with the offset and
    /// threshold.
    pub curve_gain: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            path_file: PathBuf::from("data/path.txt"),
            results_file: PathBuf::from("data/emulate_results.txt"),

            vel_k_p: 0.0004,
            vel_k_i: 0.0,
            vel_k_d: 0.0,
            vel_k_f: 0.0,
            vel_i_zone: 0.0,
            vel_out_min: -1.0,
            vel_out_max: 1.0,
            vel_ramp_s: 0.5,

            lookahead_threshold_deg: 75.0,
            point_skip_limit: 10,
            immediate_path_size: 5,
            points_to_skip: 2,

            max_heading_to_turn_diff_deg: 90.0,
            positional_correction_distance_in: 24.0,
            positional_correction_inhibitor: 1.0,
            overturn: 1.2,
            backwards_turn_gain: 2.0,

            max_speed_ips: 90.0,
            min_speed_ips: 50.0,
            coeff_friction: 1.0,

            curve_threshold_rpm: 1132.0,
            curve_offset_rpm: 40.0,
            curve_gain: 0.4,
        }
    }
}

impl Params {
    /// Configuration for the drivetrain's velocity loops.
    pub fn velocity_loop_cfg(&self) -> VelocityLoopCfg {
        VelocityLoopCfg {
            k_p: self.vel_k_p,
            k_i: self.vel_k_i,
            k_d: self.vel_k_d,
            k_f: self.vel_k_f,
            i_zone: self.vel_i_zone,
            out_min: self.vel_out_min,
            out_max: self.vel_out_max,
            ramp_s: self.vel_ramp_s,
        }
    }
}
