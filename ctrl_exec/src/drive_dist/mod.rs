//! # Distance drive module
//!
//! Drives the vehicle a fixed distance in a straight line. Two loops run
//! together:
//!
//! - the distance loop acts on the mean rotations of both sides since the
//!   start of the drive, giving a common output limited to the target power,
//! - the heading loop acts on the error to the held heading, and its output
//!   is added to the right side and subtracted from the left.

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
