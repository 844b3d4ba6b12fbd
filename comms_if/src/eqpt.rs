//! # Equipment Interface
//!
//! This module defines the interfaces to the equipment owned by the
//! controllers. Sensor values are read-only from the controllers' point of
//! view and are refreshed by the equipment driver between cycles.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod drive;
pub mod turret;
