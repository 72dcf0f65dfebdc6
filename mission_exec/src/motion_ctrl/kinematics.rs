//! Unicycle kinematics: feedback linearization, command limiting and
//! odometry integration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use crate::loc::Pose;
use util::maths::{round_dp, wrap_2pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of decimal places the integrated state is rounded to.
///
/// Rounding bounds the accumulation of floating-point drift in the
/// simulated truth history; millimeter resolution is far below every
/// tolerance in the system.
const STATE_DECIMALS: i32 = 3;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a global-frame velocity demand into a unicycle command.
///
/// The demand is expressed at a virtual control point a distance `epsilon`
/// ahead of the robot's centre, which removes the nonlinear singularity at
/// zero forward velocity. Smaller `epsilon` gives a tighter turning
/// response at the cost of control aggressiveness.
pub fn feedback_lin(pose: &Pose, x_vel_ms: f64, y_vel_ms: f64, epsilon_m: f64) -> (f64, f64) {
    let (sin_h, cos_h) = pose.heading_rad.sin_cos();

    let lin_ms = cos_h * x_vel_ms + sin_h * y_vel_ms;
    let ang_rads = (-sin_h * x_vel_ms + cos_h * y_vel_ms) / epsilon_m;

    (lin_ms, ang_rads)
}

/// Limit a unicycle command against the robot's physical capability.
///
/// The linear velocity is clamped to `[-max_v, max_v]`. If the turning rate
/// would exceed what the robot can sustain given its `radius`, the angular
/// velocity alone is scaled down, preserving forward progress.
pub fn limit_cmds(lin_ms: f64, ang_rads: f64, max_v_ms: f64, radius_m: f64) -> (f64, f64) {
    let lin_limited_ms = lin_ms.clamp(-max_v_ms, max_v_ms);

    let max_ang_rads = max_v_ms / radius_m;
    let ang_limited_rads = if ang_rads.abs() > max_ang_rads {
        ang_rads * (max_ang_rads / ang_rads.abs())
    } else {
        ang_rads
    };

    (lin_limited_ms, ang_limited_rads)
}

/// Advance a pose by a linear and angular displacement.
///
/// Unicycle integration: the heading is updated first and the translation
/// applied along the new heading. The resulting state is rounded to
/// [`STATE_DECIMALS`] decimal places.
pub fn integrate_odom(pose: &Pose, dist_m: f64, dtheta_rad: f64) -> Pose {
    let heading_rad = wrap_2pi(pose.heading_rad + dtheta_rad);

    Pose {
        position_m: Vector2::new(
            round_dp(pose.position_m[0] + dist_m * heading_rad.cos(), STATE_DECIMALS),
            round_dp(pose.position_m[1] + dist_m * heading_rad.sin(), STATE_DECIMALS),
        ),
        heading_rad: round_dp(heading_rad, STATE_DECIMALS),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_feedback_lin_aligned() {
        // Heading east, demand east: pure forward motion
        let pose = Pose::new(0.0, 0.0, 0.0);
        let (lin, ang) = feedback_lin(&pose, 1.0, 0.0, 0.2);
        assert!((lin - 1.0).abs() < 1e-12);
        assert!(ang.abs() < 1e-12);
    }

    #[test]
    fn test_feedback_lin_perpendicular() {
        // Heading east, demand north: pure rotation, scaled by 1/epsilon
        let pose = Pose::new(0.0, 0.0, 0.0);
        let (lin, ang) = feedback_lin(&pose, 0.0, 1.0, 0.2);
        assert!(lin.abs() < 1e-12);
        assert!((ang - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_limit_cmds_clamps_linear() {
        let (lin, _) = limit_cmds(3.0, 0.0, 0.5, 0.2);
        assert_eq!(lin, 0.5);
        let (lin, _) = limit_cmds(-3.0, 0.0, 0.5, 0.2);
        assert_eq!(lin, -0.5);
    }

    #[test]
    fn test_limit_cmds_scales_angular_alone() {
        // max_w = 0.5 / 0.2 = 2.5
        let (lin, ang) = limit_cmds(0.3, 10.0, 0.5, 0.2);
        assert_eq!(lin, 0.3);
        assert!((ang - 2.5).abs() < 1e-12);

        let (_, ang) = limit_cmds(0.3, -10.0, 0.5, 0.2);
        assert!((ang + 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_limit_cmds_passes_feasible() {
        let (lin, ang) = limit_cmds(0.2, 1.0, 0.5, 0.2);
        assert_eq!((lin, ang), (0.2, 1.0));
    }

    #[test]
    fn test_integrate_odom_heading_first() {
        // Quarter turn then a unit translation: ends up north of the start
        let pose = Pose::new(0.0, 0.0, 0.0);
        let next = integrate_odom(&pose, 1.0, FRAC_PI_2);

        assert_eq!(next.position_m[0], 0.0);
        assert_eq!(next.position_m[1], 1.0);
        assert!((next.heading_rad - round_dp(FRAC_PI_2, 3)).abs() < 1e-12);
    }

    #[test]
    fn test_integrate_odom_wraps_heading() {
        let pose = Pose::new(0.0, 0.0, 1.5 * PI);
        let next = integrate_odom(&pose, 0.0, PI);

        assert!((next.heading_rad - round_dp(0.5 * PI, 3)).abs() < 1e-12);
    }

    #[test]
    fn test_integrate_odom_rounds_state() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        let next = integrate_odom(&pose, 0.123456, 0.0);

        assert_eq!(next.position_m[0], 0.123);
    }
}
