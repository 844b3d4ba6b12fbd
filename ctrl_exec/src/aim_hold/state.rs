//! Aim hold state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::Params;
use crate::ctrl::{FinishPredicate, PidController};
use comms_if::eqpt::turret::{TargetAngles, Turret, TurretDems};
use util::module::{Controller, Resource};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Holds the turret at a yaw and pitch position.
pub struct AimHold {
    yaw_target_ticks: i32,
    pitch_target_ticks: i32,

    cancelable: bool,

    yaw_ctrl: PidController,
    pitch_ctrl: PidController,

    finish: FinishPredicate<AimState>,

    running: bool,
}

/// Inputs to the finish predicate.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct AimState {
    /// Units: ticks
    pub yaw_error_ticks: f64,

    /// Units: ticks
    pub pitch_error_ticks: f64,

    /// Angles to the target reported by the vision sensor
    pub target_angles: Option<TargetAngles>,
}

/// The status report containing monitoring quantities of one cycle.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    pub state: AimState,

    pub yaw_output: f64,

    pub pitch_output: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AimHold {
    /// Hold the turret at the targets until both axes are within tolerance.
    pub fn new(params: &Params, yaw_target_ticks: i32, pitch_target_ticks: i32, dt_s: f64) -> Self {
        Self::build(params, yaw_target_ticks, pitch_target_ticks, dt_s, false)
    }

    /// As [`AimHold::new`], but also finish once the vision sensor reports
    /// the turret is aligned with the target.
    pub fn cancelable(
        params: &Params,
        yaw_target_ticks: i32,
        pitch_target_ticks: i32,
        dt_s: f64,
    ) -> Self {
        Self::build(params, yaw_target_ticks, pitch_target_ticks, dt_s, true)
    }

    fn build(
        params: &Params,
        yaw_target_ticks: i32,
        pitch_target_ticks: i32,
        dt_s: f64,
        cancelable: bool,
    ) -> Self {
        let yaw_ctrl = PidController::new(params.yaw_gains, dt_s)
            .with_output_limits(-params.yaw_high_output, params.yaw_high_output);
        let pitch_ctrl = PidController::new(params.pitch_gains, dt_s)
            .with_output_limits(-params.pitch_high_output, params.pitch_high_output);

        let yaw_tol = params.yaw_allowable_error_ticks;
        let pitch_tol = params.pitch_allowable_error_ticks;
        let mut finish = FinishPredicate::converged("turret on target", move |s: &AimState| {
            s.yaw_error_ticks.abs() <= yaw_tol && s.pitch_error_ticks.abs() <= pitch_tol
        });

        if cancelable {
            let soft_align_deg = params.soft_align_deg;
            finish = finish.or_override("vision alignment", move |s: &AimState| {
                match s.target_angles {
                    Some(a) => {
                        a.horizontal_deg.abs() < soft_align_deg
                            && a.vertical_deg.abs() < soft_align_deg
                    }
                    None => false,
                }
            });
        }

        Self {
            yaw_target_ticks,
            pitch_target_ticks,
            cancelable,
            yaw_ctrl,
            pitch_ctrl,
            finish,
            running: false,
        }
    }

    fn state(&self, hw: &dyn Turret) -> AimState {
        AimState {
            yaw_error_ticks: self.yaw_target_ticks as f64 - hw.yaw_position_ticks(),
            pitch_error_ticks: self.pitch_target_ticks as f64 - hw.pitch_position_ticks(),
            target_angles: hw.target_angles(),
        }
    }
}

impl Controller for AimHold {
    type Hardware = dyn Turret;
    type StatusReport = StatusReport;
    type StartError = std::convert::Infallible;

    fn name(&self) -> &'static str {
        "AimHold"
    }

    fn resources(&self) -> &'static [Resource] {
        &[Resource::Turret]
    }

    fn start(&mut self, _hw: &mut Self::Hardware) -> Result<(), Self::StartError> {
        self.yaw_ctrl.reset();
        self.yaw_ctrl.set_setpoint(self.yaw_target_ticks as f64);
        self.pitch_ctrl.reset();
        self.pitch_ctrl.set_setpoint(self.pitch_target_ticks as f64);

        self.running = true;

        info!(
            "Aiming at yaw {} ticks, pitch {} ticks{}",
            self.yaw_target_ticks,
            self.pitch_target_ticks,
            if self.cancelable { " (cancelable)" } else { "" }
        );

        Ok(())
    }

    fn tick(&mut self, hw: &mut Self::Hardware) -> StatusReport {
        if !self.running {
            warn!("AimHold ticked while not running");
            return StatusReport::default();
        }

        let state = self.state(hw);

        let dems = TurretDems {
            yaw: self.yaw_ctrl.get(state.yaw_error_ticks),
            pitch: self.pitch_ctrl.get(state.pitch_error_ticks),
        };
        hw.set_percent_output(dems);

        let report = StatusReport {
            state,
            yaw_output: dems.yaw,
            pitch_output: dems.pitch,
        };

        trace!("AimHold: {:?}", report);

        report
    }

    fn is_finished(&mut self, hw: &Self::Hardware) -> bool {
        if !self.running {
            return true;
        }

        self.finish.evaluate(&self.state(hw)).is_some()
    }

    fn end(&mut self, hw: &mut Self::Hardware, interrupted: bool) {
        hw.set_percent_output(TurretDems::default());

        if self.running && interrupted {
            info!("AimHold interrupted");
        }

        self.running = false;
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Yaw target for a vehicle starting `offset_in` inches sideways from its
/// nominal starting position.
pub fn yaw_ticks_to_target(offset_in: f64, params: &Params) -> i32 {
    (-(offset_in * params.yaw_ticks_per_inch + params.init_yaw_target_ticks)) as i32
}
