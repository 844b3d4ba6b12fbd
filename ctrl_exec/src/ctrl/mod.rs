//! # Controller execution
//!
//! Controllers implement [`util::module::Controller`]. The [`CtrlRunner`]
//! drives one controller through its lifecycle, owning the mode state
//! machine:
//!
//! ```text
//! Idle --start--> Running --is_finished--> Finished
//!   |                |
//!   +--start error---+--cancel-----------> Aborted
//! ```
//!
//! Whenever a run leaves `Running` the controller's `end` is called, so
//! outputs are always zeroed.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod finish;
pub mod pid;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, warn};
use serde::Serialize;

// Internal
pub use finish::*;
pub use pid::*;
use util::module::{Controller, Resource};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Runs a controller's lifecycle.
pub struct CtrlRunner<C: Controller> {
    ctrl: C,

    mode: CtrlMode,

    /// Number of ticks in the current (or last) run
    num_ticks: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum CtrlMode {
    Idle,
    Running,
    Finished,
    Aborted,
}

/// Errors which stop a controller from starting.
#[derive(Debug, thiserror::Error)]
pub enum CtrlError {
    #[error("The path to follow is invalid")]
    InvalidPath,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C: Controller> CtrlRunner<C> {
    pub fn new(ctrl: C) -> Self {
        Self {
            ctrl,
            mode: CtrlMode::Idle,
            num_ticks: 0,
        }
    }

    pub fn mode(&self) -> CtrlMode {
        self.mode
    }

    pub fn num_ticks(&self) -> u64 {
        self.num_ticks
    }

    pub fn controller(&self) -> &C {
        &self.ctrl
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.ctrl
    }

    pub fn into_inner(self) -> C {
        self.ctrl
    }

    /// Returns true once the run has finished or been aborted.
    pub fn is_done(&self) -> bool {
        matches!(self.mode, CtrlMode::Finished | CtrlMode::Aborted)
    }

    /// Start a new run.
    ///
    /// If the controller refuses to start the runner moves straight to
    /// `Aborted`. Starting while already running is ignored.
    pub fn start(&mut self, hw: &mut C::Hardware) -> CtrlMode {
        if self.mode == CtrlMode::Running {
            warn!("{} is already running, ignoring start", self.ctrl.name());
            return self.mode;
        }

        self.num_ticks = 0;

        match self.ctrl.start(hw) {
            Ok(()) => {
                info!(
                    "{} started, claiming {:?}",
                    self.ctrl.name(),
                    self.ctrl.resources()
                );
                self.mode = CtrlMode::Running;
            }
            Err(e) => {
                error!("{} could not start: {}", self.ctrl.name(), e);
                self.mode = CtrlMode::Aborted;
            }
        }

        self.mode
    }

    /// Run one cycle of the controller.
    ///
    /// Returns the tick's status report, or `None` if the controller isn't
    /// running.
    pub fn step(&mut self, hw: &mut C::Hardware) -> Option<C::StatusReport> {
        if self.mode != CtrlMode::Running {
            return None;
        }

        let report = self.ctrl.tick(hw);
        self.num_ticks += 1;

        if self.ctrl.is_finished(hw) {
            self.ctrl.end(hw, false);
            self.mode = CtrlMode::Finished;
            info!(
                "{} finished after {} ticks",
                self.ctrl.name(),
                self.num_ticks
            );
        }

        Some(report)
    }

    /// Interrupt the run, zeroing all outputs.
    pub fn cancel(&mut self, hw: &mut C::Hardware) {
        if self.mode != CtrlMode::Running {
            debug!("{} is not running, nothing to cancel", self.ctrl.name());
            return;
        }

        self.ctrl.end(hw, true);
        self.mode = CtrlMode::Aborted;
        info!(
            "{} cancelled after {} ticks",
            self.ctrl.name(),
            self.num_ticks
        );
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Returns true if a controller claiming `claimed` must cancel the holder of
/// `held` before starting.
pub fn claim_conflicts(held: &[Resource], claimed: &[Resource]) -> bool {
    claimed.iter().any(|r| held.contains(r))
}
