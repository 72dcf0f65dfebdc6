//! # Coverage mission library
//!
//! This library implements the core of the ground-coverage mission software:
//!
//! - [`geo`] - conversions between GPS coordinates and the local planar
//!   meter frame.
//! - [`grid`] - the coverage grid built over a GPS bounding box, and the
//!   traversal algorithms which produce waypoint sequences over it.
//! - [`loc`] - the localisation boundary, providing pose estimates either
//!   from an external estimator or from a simulated noisy source.
//! - [`motion_ctrl`] - the robot's kinematic state and the closed-loop
//!   waypoint tracking controller.
//! - [`mission`] - the mission phase state machine tying the above
//!   together.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod geo;
pub mod grid;
pub mod loc;
pub mod mission;
pub mod motion_ctrl;
