//! # Aim hold module
//!
//! Holds the turret at a yaw and pitch position using an independent PID
//! loop on each axis. The hold finishes once both axes are within tolerance
//! of their targets. A cancelable hold can also be finished early by the
//! vision sensor reporting that the turret is already aligned with the
//! target, which is logged as an override.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use state::*;
