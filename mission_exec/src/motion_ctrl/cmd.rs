//! Velocity command type and the actuation boundary.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A unicycle velocity command pair.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct VelCmd {
    /// Forward linear velocity in meters/second
    pub lin_ms: f64,

    /// Angular velocity in radians/second, positive anticlockwise
    pub ang_rads: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The actuation boundary in field operation.
///
/// The real-robot driver implements this and translates each command into
/// wheel/motor demands. Simulation does not use a sink: commanded motion is
/// integrated into the truth-pose history instead.
pub trait VelocitySink {
    fn send(&mut self, cmd: &VelCmd);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelCmd {
    /// The all-stop command.
    pub fn stop() -> Self {
        Self {
            lin_ms: 0.0,
            ang_rads: 0.0,
        }
    }
}
