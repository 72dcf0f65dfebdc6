//! Motion control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for motion control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Distance from the robot's centre to the virtual control point used
    /// by the feedback linearization. Smaller values give a tighter turning
    /// response.
    pub epsilon_m: f64,

    /// Maximum forward velocity of the robot
    pub max_v_ms: f64,

    /// Radius of the robot, which bounds its turning capability
    pub radius_m: f64,

    /// Position controller proportional gain
    pub position_k_p: f64,

    /// Position controller integral gain
    pub position_k_i: f64,

    /// Position controller derivative gain
    pub position_k_d: f64,

    /// Standard deviation of the simulated localisation noise, meters per
    /// axis
    pub position_noise_m: f64,

    /// Seed for the simulated localisation noise. Zero draws entropy from
    /// the OS.
    pub noise_seed: u64,

    /// The amount of time that passes between control loop cycles
    pub time_step_s: f64,

    /// Number of consecutive control steps without improvement of the best
    /// distance to the current waypoint before the waypoint is abandoned
    pub non_conv_step_limit: usize,

    /// Distance driven per step of the bounded-exploration controller
    pub explore_move_dist_m: f64,

    /// Angle turned after each boundary bounce of the bounded-exploration
    /// controller
    pub explore_turn_rad: f64,
}
