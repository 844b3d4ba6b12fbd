//! # PID controller
//!
//! A discrete PIDF controller run at a fixed sample period. Using a fixed
//! period rather than measuring the time between calls keeps controller
//! outputs reproducible in tests and in simulation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of a PIDF loop as stored in parameter files.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Feed-forward gain, applied to the setpoint
    pub k_f: f64,

    /// Error magnitude at or above which the integral is cleared. Zero
    /// disables the zone.
    pub i_zone: f64,
}

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    gains: PidGains,

    /// Lower output limit
    out_min: f64,

    /// Upper output limit
    out_max: f64,

    /// Sample period in seconds
    dt_s: f64,

    setpoint: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PidGains {
    fn default() -> Self {
        Self {
            k_p: 0.0,
            k_i: 0.0,
            k_d: 0.0,
            k_f: 0.0,
            i_zone: 0.0,
        }
    }
}

impl PidGains {
    pub fn pid(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            ..Self::default()
        }
    }
}

impl PidController {
    /// Create a new controller with the given gains, running every `dt_s`
    /// seconds with unlimited output.
    pub fn new(gains: PidGains, dt_s: f64) -> Self {
        Self {
            gains,
            out_min: std::f64::NEG_INFINITY,
            out_max: std::f64::INFINITY,
            dt_s,
            setpoint: 0.0,
            prev_error: None,
            integral: 0.0,
        }
    }

    /// Limit the output to `[out_min, out_max]`.
    pub fn with_output_limits(mut self, out_min: f64, out_max: f64) -> Self {
        self.out_min = out_min;
        self.out_max = out_max;
        self
    }

    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    /// Clear the integral and derivative history.
    pub fn reset(&mut self) {
        self.prev_error = None;
        self.integral = 0.0;
    }

    /// Get the output for the given measurement of the controlled quantity.
    pub fn calculate(&mut self, measurement: f64) -> f64 {
        self.get(self.setpoint - measurement)
    }

    /// Get the output for an externally computed error.
    ///
    /// Use this when the error is not a plain difference, for example when
    /// angles must be wrapped.
    pub fn get(&mut self, error: f64) -> f64 {
        // Accumulate the integral, clearing it outside the integral zone
        if self.gains.i_zone > 0.0 && error.abs() >= self.gains.i_zone {
            self.integral = 0.0;
        }
        else {
            self.integral += error * self.dt_s;
        }

        let deriv = match self.prev_error {
            Some(e) if self.dt_s > 0.0 => (error - e) / self.dt_s,
            _ => 0.0,
        };

        self.prev_error = Some(error);

        let out = self.gains.k_p * error
            + self.gains.k_i * self.integral
            + self.gains.k_d * deriv
            + self.gains.k_f * self.setpoint;

        clamp(&out, &self.out_min, &self.out_max)
    }

    /// Returns true if the last error was within `tolerance` of zero.
    pub fn at_setpoint(&self, tolerance: f64) -> bool {
        match self.prev_error {
            Some(e) => e.abs() <= tolerance,
            None => false,
        }
    }
}
