//! # Motion control module
//!
//! Motion control owns the robot's kinematic state and the closed-loop
//! waypoint tracking logic. Each control step measures the instantaneous
//! position error to the current target, passes each axis through its own
//! PID controller to obtain a global-frame velocity demand, converts that
//! demand into a unicycle (linear, angular) velocity pair by feedback
//! linearization, limits the pair against the robot's physical capability,
//! and finally integrates the commanded motion over the control timestep.
//!
//! A secondary bounded-exploration controller provides non-systematic
//! coverage by bouncing off the grid's physical extent until a time budget
//! is exhausted.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod kinematics;
mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use kinematics::*;
pub use params::Params;
pub use pid::PidController;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during motion control.
#[derive(Debug, thiserror::Error)]
pub enum MotionCtrlError {
    #[error("Could not get a pose from the localisation module")]
    PoseUnavailable,
}
