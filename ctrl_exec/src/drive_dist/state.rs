//! Distance drive state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::Params;
use crate::{
    ctrl::PidController,
    params::DrivetrainParams,
};
use comms_if::eqpt::drive::{DriveDems, Drivetrain};
use util::{
    maths::{angle_diff_deg, clamp},
    module::{Controller, Resource},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// What a distance drive should achieve.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DriveDistTarget {
    /// Units: inches, negative to drive backwards
    pub distance_in: f64,

    /// Maximum magnitude of the distance loop output, between 0 and 1.
    pub power: f64,

    /// Heading to hold, or `None` to hold the heading at the start of the
    /// drive.
    ///
    /// Units: degrees
    pub heading_deg: Option<f64>,

    /// Scale of the heading correction.
    pub max_heading_correction: f64,
}

/// Drives a fixed distance while holding a heading.
pub struct DriveDist {
    params: Params,

    drivetrain: DrivetrainParams,

    target: DriveDistTarget,

    /// Distance loop, acting on rotations travelled
    distance_ctrl: PidController,

    /// Heading loop, acting on heading error
    heading_ctrl: PidController,

    run: Option<RunState>,
}

struct RunState {
    /// Units: rotations
    distance_traveled_rot: f64,

    last_left_rot: f64,
    last_right_rot: f64,
}

/// The status report containing monitoring quantities of one cycle.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Units: rotations
    pub distance_traveled_rot: f64,

    /// Units: rotations
    pub distance_error_rot: f64,

    /// Units: degrees
    pub heading_deg: f64,

    /// Units: degrees
    pub heading_error_deg: f64,

    pub translation_output: f64,

    pub heading_output: f64,

    pub left: f64,

    pub right: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveDistTarget {
    /// Drive a distance while holding an explicit heading.
    pub fn with_heading(
        distance_in: f64,
        power: f64,
        heading_deg: f64,
        max_heading_correction: f64,
    ) -> Self {
        Self {
            distance_in,
            power,
            heading_deg: Some(heading_deg),
            max_heading_correction,
        }
    }

    /// Drive a distance while holding the heading at the start of the drive.
    pub fn new(distance_in: f64, power: f64) -> Self {
        Self {
            distance_in,
            power,
            heading_deg: None,
            max_heading_correction: 1.0,
        }
    }

    /// Drive the test distance and power given in the parameters.
    pub fn from_params(params: &Params) -> Self {
        Self::new(params.test_distance_in, params.test_power)
    }
}

impl DriveDist {
    /// Create a new distance drive, running every `dt_s` seconds.
    pub fn new(
        params: Params,
        drivetrain: DrivetrainParams,
        target: DriveDistTarget,
        dt_s: f64,
    ) -> Self {
        let power = target.power.abs();

        let distance_ctrl =
            PidController::new(params.distance_gains, dt_s).with_output_limits(-power, power);
        let heading_ctrl = PidController::new(params.heading_gains, dt_s);

        Self {
            params,
            drivetrain,
            target,
            distance_ctrl,
            heading_ctrl,
            run: None,
        }
    }

    pub fn target(&self) -> &DriveDistTarget {
        &self.target
    }

    /// Target distance in motor rotations.
    pub fn target_rot(&self) -> f64 {
        self.target.distance_in * self.drivetrain.rotations_per_inch
    }

    /// Distance travelled in the current run.
    ///
    /// Units: rotations
    pub fn distance_traveled_rot(&self) -> Option<f64> {
        self.run.as_ref().map(|r| r.distance_traveled_rot)
    }

    /// Heading being held, once started.
    pub fn heading_setpoint_deg(&self) -> Option<f64> {
        self.run.as_ref().map(|_| self.heading_ctrl.setpoint())
    }
}

impl Controller for DriveDist {
    type Hardware = dyn Drivetrain;
    type StatusReport = StatusReport;
    type StartError = std::convert::Infallible;

    fn name(&self) -> &'static str {
        "DriveDist"
    }

    fn resources(&self) -> &'static [Resource] {
        &[Resource::Drivetrain]
    }

    fn start(&mut self, hw: &mut Self::Hardware) -> Result<(), Self::StartError> {
        let heading_setpoint = self
            .target
            .heading_deg
            .unwrap_or_else(|| hw.heading_deg());

        self.distance_ctrl.reset();
        self.distance_ctrl.set_setpoint(self.target_rot());

        self.heading_ctrl.reset();
        self.heading_ctrl.set_setpoint(heading_setpoint);

        self.run = Some(RunState {
            distance_traveled_rot: 0.0,
            last_left_rot: hw.left_position_rot(),
            last_right_rot: hw.right_position_rot(),
        });

        info!(
            "Driving {:.1} in ({:.2} rot) at power {:.2}, holding heading {:.1} deg",
            self.target.distance_in,
            self.target_rot(),
            self.target.power,
            heading_setpoint
        );

        Ok(())
    }

    fn tick(&mut self, hw: &mut Self::Hardware) -> StatusReport {
        let mut report = StatusReport::default();

        let run = match self.run.as_mut() {
            Some(r) => r,
            None => {
                warn!("DriveDist ticked while not running");
                return report;
            }
        };

        // Accumulate the mean of both sides
        let left_rot = hw.left_position_rot();
        let right_rot = hw.right_position_rot();
        run.distance_traveled_rot +=
            ((left_rot - run.last_left_rot) + (right_rot - run.last_right_rot)) / 2.0;
        run.last_left_rot = left_rot;
        run.last_right_rot = right_rot;

        let power = self.target.power.abs();
        let translation = clamp(
            &self.distance_ctrl.calculate(run.distance_traveled_rot),
            &-power,
            &power,
        );

        let heading_deg = hw.heading_deg();
        let heading_error = angle_diff_deg(heading_deg, self.heading_ctrl.setpoint());
        let heading_out = self.heading_ctrl.get(heading_error)
            * self.params.heading_inhibitor
            * self.target.max_heading_correction;

        let left = translation - heading_out;
        let right = translation + heading_out;

        hw.set_percent_output(left, right);

        report.distance_traveled_rot = run.distance_traveled_rot;
        report.distance_error_rot = self.distance_ctrl.setpoint() - run.distance_traveled_rot;
        report.heading_deg = heading_deg;
        report.heading_error_deg = heading_error;
        report.translation_output = translation;
        report.heading_output = heading_out;
        report.left = left;
        report.right = right;

        debug!("DriveDist: {:?}", report);

        report
    }

    fn is_finished(&mut self, _hw: &Self::Hardware) -> bool {
        match self.run {
            Some(ref r) => {
                (self.target_rot() - r.distance_traveled_rot).abs() < self.params.allowable_error_rot
            }
            None => true,
        }
    }

    fn end(&mut self, hw: &mut Self::Hardware, interrupted: bool) {
        hw.set_dems(DriveDems::stop());

        if let Some(run) = self.run.take() {
            info!(
                "DriveDist {} after {:.2} of {:.2} rot",
                if interrupted { "interrupted" } else { "complete" },
                run.distance_traveled_rot,
                self.target_rot()
            );
        }
    }
}
