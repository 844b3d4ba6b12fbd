//! Controller interfaces
//!
//! Every closed-loop controller in `ctrl_exec` shall implement [`Controller`].
//! The lifecycle is driven by an external sequencer:
//!
//! 1. `start` is called once when the controller is scheduled,
//! 2. `tick` is called every cycle followed by `is_finished`,
//! 3. `end` is called exactly once, either because `is_finished` returned
//!    true or because the run was interrupted.
//!
//! `end` must leave every actuator the controller owns at zero output.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Hardware resources which a controller can claim exclusive use of.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Resource {
    /// Both sides of the differential drivetrain.
    Drivetrain,

    /// The yaw and pitch axes of the turret.
    Turret,
}

// ---------------------------------------------------------------------------
// CONTROLLER
// ---------------------------------------------------------------------------

/// A periodic closed-loop controller.
pub trait Controller {
    /// The hardware interface the controller reads from and actuates.
    type Hardware: ?Sized;

    /// A report on the status of one tick.
    type StatusReport;

    /// An error which prevents the run from starting.
    type StartError: std::fmt::Display;

    /// Name of the controller, used in logs.
    fn name(&self) -> &'static str;

    /// The resources this controller owns while running.
    fn resources(&self) -> &'static [Resource];

    /// Begin a new run.
    ///
    /// # Outputs
    /// - On success `Ok(())`, the controller is now running.
    /// - On error the run must not be continued, no actuator shall have been
    ///   moved.
    fn start(&mut self, hw: &mut Self::Hardware) -> Result<(), Self::StartError>;

    /// Main cyclic processing function.
    fn tick(&mut self, hw: &mut Self::Hardware) -> Self::StatusReport;

    /// Returns true once the run is complete.
    fn is_finished(&mut self, hw: &Self::Hardware) -> bool;

    /// End the run, zeroing all outputs.
    ///
    /// `interrupted` is true if the run was cancelled rather than finishing
    /// normally.
    fn end(&mut self, hw: &mut Self::Hardware, interrupted: bool);
}
