//! # Communications interface crate.
//!
//! Provides the interfaces between the controllers and the equipment they
//! drive. Hardware drivers implement the traits defined here, the controllers
//! only ever see these traits.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Sensor and demand definitions for equipment (drivetrain, turret)
pub mod eqpt;
