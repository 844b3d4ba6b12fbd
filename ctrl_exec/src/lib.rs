//! # Motion control library.
//!
//! This library allows other crates in the workspace to access items defined inside the control
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Aim hold - holds the turret at a yaw and pitch target
pub mod aim_hold;

/// Controller execution - lifecycle runner, PID loops and finish predicates
pub mod ctrl;

/// Distance drive - drives a fixed distance while holding a heading
pub mod drive_dist;

/// Path emulation - follows a recorded path
pub mod emulate;

/// Parameters shared between controllers and the executable
pub mod params;

/// Paths and the path recorder
pub mod path;

/// Simulated drivetrain and turret
pub mod sim;

/// Path visualisation sinks
pub mod viz;
