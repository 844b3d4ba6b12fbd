//! Path emulation state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, trace, warn};
use serde::Serialize;
use std::path::{Path as FsPath, PathBuf};

// Internal
use super::{arc, Params};
use crate::{
    ctrl::CtrlError,
    params::DrivetrainParams,
    path::{Path, PathRecorder},
    viz::PathSink,
};
use comms_if::eqpt::drive::{DriveDems, Drivetrain};
use util::{
    geom::{forwardsify, Pose},
    maths::angle_diff_deg,
    module::{Controller, Resource},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name the intended path is published under.
pub const DESIRED_PATH_NAME: &str = "Desired Path";

/// Name the recorded trajectory is published under.
pub const DRIVEN_PATH_NAME: &str = "Driven Path";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follows a recorded path.
pub struct EmulatePath {
    params: Params,

    drivetrain: DrivetrainParams,

    source: PathSource,

    results_file: PathBuf,

    viz: Box<dyn PathSink>,

    /// State of the current run, `None` when not running
    run: Option<RunState>,
}

struct RunState {
    path: Path,

    /// Index of the point the vehicle is heading for
    point_index: usize,

    is_forwards: bool,

    recorder: PathRecorder,
}

/// The status report containing monitoring quantities of one cycle.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    pub point_index: usize,

    pub is_forwards: bool,

    /// Units: inches
    pub immediate_length_in: f64,

    /// Fitted turn before positional correction.
    ///
    /// Units: degrees
    pub immediate_turn_deg: f64,

    /// Heading change along the immediate path.
    ///
    /// Units: degrees
    pub heading_change_deg: f64,

    /// Correction added to the turn to steer back towards the path.
    ///
    /// Units: degrees
    pub positional_correction_deg: f64,

    pub should_zero_turn: bool,

    /// Units: inches/second
    pub base_speed_ips: f64,

    pub left_rpm: f64,

    pub right_rpm: f64,

    /// If true the heading sensor was disconnected this cycle
    pub heading_sensor_fault: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Where the path to follow comes from.
pub enum PathSource {
    /// Loaded from a waypoint file when the run starts
    File(PathBuf),

    /// Already in memory
    Loaded(Path),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EmulatePath {
    /// Create a new path emulator which follows the path file and writes to
    /// the results file named in the parameters.
    pub fn new(params: Params, drivetrain: DrivetrainParams, viz: Box<dyn PathSink>) -> Self {
        let source = PathSource::File(params.path_file.clone());
        let results_file = params.results_file.clone();

        Self {
            params,
            drivetrain,
            source,
            results_file,
            viz,
            run: None,
        }
    }

    /// Follow a different path.
    pub fn with_source(mut self, source: PathSource) -> Self {
        self.source = source;
        self
    }

    /// Record the driven trajectory to a different file.
    pub fn with_results_file<P: AsRef<FsPath>>(mut self, results_file: P) -> Self {
        self.results_file = results_file.as_ref().to_path_buf();
        self
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Index of the point being driven towards, if running.
    pub fn point_index(&self) -> Option<usize> {
        self.run.as_ref().map(|r| r.point_index)
    }

    /// Direction of travel, if running.
    pub fn is_forwards(&self) -> Option<bool> {
        self.run.as_ref().map(|r| r.is_forwards)
    }

    fn load_path(&self) -> Path {
        match self.source {
            PathSource::File(ref f) => Path::load(f),
            PathSource::Loaded(ref p) => p.clone(),
        }
    }
}

impl Controller for EmulatePath {
    type Hardware = dyn Drivetrain;
    type StatusReport = StatusReport;
    type StartError = CtrlError;

    fn name(&self) -> &'static str {
        "EmulatePath"
    }

    fn resources(&self) -> &'static [Resource] {
        &[Resource::Drivetrain]
    }

    fn start(&mut self, hw: &mut Self::Hardware) -> Result<(), CtrlError> {
        self.run = None;

        let path = self.load_path();

        let (point_index, is_forwards) = match path.points() {
            Some(points) => {
                // Paths are recorded from the origin, so the heading from it
                // to the second point sets the starting direction
                let is_forwards = Pose::default().heading_to(&points[1]) < 90.0;

                (1.min(points.len() - 2), is_forwards)
            }
            None => {
                error!("Cannot emulate an invalid path");
                return Err(CtrlError::InvalidPath);
            }
        };

        hw.configure_velocity_loop(&self.params.velocity_loop_cfg());

        let mut recorder = PathRecorder::new(&self.results_file);
        if let Err(e) = recorder.open() {
            warn!("Driven path will not be recorded: {}", e);
        }

        info!(
            "Emulating path of {} points ({:.1} in), starting {}",
            path.len(),
            path.length_in(),
            if is_forwards { "forwards" } else { "backwards" }
        );

        self.run = Some(RunState {
            path,
            point_index,
            is_forwards,
            recorder,
        });

        Ok(())
    }

    fn tick(&mut self, hw: &mut Self::Hardware) -> StatusReport {
        let mut report = StatusReport::default();

        let run = match self.run.as_mut() {
            Some(r) => r,
            None => {
                warn!("EmulatePath ticked while not running");
                return report;
            }
        };
        let points = match run.path.points() {
            Some(p) => p,
            None => return report,
        };
        let params = &self.params;
        let len = points.len();

        let pose = hw.pose();
        run.recorder.record(pose);

        if !hw.heading_connected() {
            error!("Heading sensor disconnected, emulating with the last known heading");
            report.heading_sensor_fault = true;
        }

        // Skip over points which are already beside or behind the vehicle
        if run.point_index < len - 1 {
            let travel_heading = forwardsify(pose.heading_deg(), run.is_forwards);

            for _ in 0..params.point_skip_limit {
                let angle_to_point =
                    angle_diff_deg(travel_heading, pose.heading_to(&points[run.point_index]));

                if run.point_index < len - 1 && angle_to_point.abs() >= params.lookahead_threshold_deg {
                    run.point_index += 1;
                }
                else {
                    break;
                }
            }
        }
        run.point_index = run.point_index.min(len - 2);

        // Drive backwards if the next point is behind
        run.is_forwards = pose.turn_to(&points[run.point_index + 1]).abs() < 90.0;
        let travel_heading = forwardsify(pose.heading_deg(), run.is_forwards);

        let immediate = arc::immediate_path(
            points,
            &pose,
            travel_heading,
            run.point_index + params.points_to_skip,
            params.immediate_path_size,
        );
        let fitted = arc::fit_arc(&immediate);
        let heading_change = arc::heading_change_deg(&immediate);

        let should_zero_turn = angle_diff_deg(heading_change, fitted.turn_deg).abs()
            > params.max_heading_to_turn_diff_deg;

        // Steer back towards the path if it has drifted away
        let mut turn_deg = fitted.turn_deg;
        let target = points[(run.point_index + 2).min(len - 1)];
        let target_dist_in = pose.distance_to(&target);
        if target_dist_in > params.positional_correction_distance_in {
            let correction = angle_diff_deg(travel_heading, pose.heading_to(&target))
                * target_dist_in
                * params.positional_correction_inhibitor;

            turn_deg += correction;
            report.positional_correction_deg = correction;
        }

        turn_deg *= params.overturn;
        if !run.is_forwards {
            turn_deg *= params.backwards_turn_gain;
        }

        let speeds = arc::wheel_speeds(
            fitted.length_in,
            turn_deg.to_radians(),
            run.is_forwards,
            should_zero_turn,
            params,
            &self.drivetrain,
        );

        let left_rpm = arc::curve_rpm(self.drivetrain.ips_to_rpm(speeds.left_ips), params);
        let right_rpm = arc::curve_rpm(self.drivetrain.ips_to_rpm(speeds.right_ips), params);

        hw.set_velocity_rpm(left_rpm, right_rpm);

        report.point_index = run.point_index;
        report.is_forwards = run.is_forwards;
        report.immediate_length_in = fitted.length_in;
        report.immediate_turn_deg = fitted.turn_deg;
        report.heading_change_deg = heading_change;
        report.should_zero_turn = should_zero_turn;
        report.base_speed_ips = speeds.base_ips;
        report.left_rpm = left_rpm;
        report.right_rpm = right_rpm;

        trace!("EmulatePath: {:?}", report);

        report
    }

    fn is_finished(&mut self, _hw: &Self::Hardware) -> bool {
        match self.run {
            Some(ref r) => r.point_index + self.params.points_to_skip + 2 >= r.path.len(),
            None => true,
        }
    }

    fn end(&mut self, hw: &mut Self::Hardware, interrupted: bool) {
        hw.set_dems(DriveDems::stop());

        let mut run = match self.run.take() {
            Some(r) => r,
            None => return,
        };

        run.recorder.record(hw.pose());

        match run.recorder.close() {
            Ok(n) => info!(
                "Recorded {} poses to {:?}",
                n,
                run.recorder.file_path()
            ),
            Err(e) => error!("Could not save the driven path: {}", e),
        }

        if interrupted {
            warn!("Emulation interrupted at point {}", run.point_index);
        }

        self.viz.send_path(&run.path, DESIRED_PATH_NAME);
        self.viz
            .send_path(&Path::load(run.recorder.file_path()), DRIVEN_PATH_NAME);
    }
}
