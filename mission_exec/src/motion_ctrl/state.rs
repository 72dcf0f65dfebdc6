//! Implementations for the Robot state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use nalgebra::Vector2;
use serde::Serialize;
use std::collections::VecDeque;

// Internal
use super::{feedback_lin, integrate_odom, limit_cmds};
use super::{MotionCtrlError, Params, PidController, VelCmd, VelocitySink};
use crate::grid::Node;
use crate::loc::{LocMgr, Pose};
use util::maths::{round_dp, wrap_2pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The robot's kinematic state and waypoint tracking controllers.
pub struct Robot {
    params: Params,

    /// The current pose. In simulation this is the truth state; in field
    /// operation it mirrors the latest localisation estimate.
    pose: Pose,

    /// Truth-pose history, retained only in simulation mode
    truthpose: Option<Vec<Pose>>,

    /// Per-axis position controllers
    pid_x: PidController,
    pid_y: PidController,

    /// Localisation source
    loc_mgr: LocMgr,

    /// Actuation sink, present only in field operation
    sink: Option<Box<dyn VelocitySink>>,
}

/// Summary of one waypoint-tracking run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraverseReport {
    /// Number of waypoints reached within tolerance
    pub reached: usize,

    /// Grid positions of waypoints abandoned by the non-convergence guard
    pub aborted: Vec<(usize, usize)>,

    /// True if any waypoint was abandoned
    pub degraded: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// State of a single waypoint-tracking cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum WaypointState {
    /// Closing in on the target
    Approaching,

    /// Within the allowed distance error of the target
    Reached,
}

/// How a single waypoint-tracking cycle ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaypointOutcome {
    /// The target was reached within tolerance
    Reached,

    /// The non-convergence guard abandoned the target: the best distance
    /// stopped improving
    Aborted,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Robot {
    /// Create a simulated robot at the given initial pose.
    ///
    /// Commanded motion is integrated into an owned truth-pose history, and
    /// position estimates are the truth corrupted by the configured
    /// Gaussian noise.
    pub fn sim(params: Params, initial_pose: Pose) -> Self {
        let loc_mgr = LocMgr::sim(params.position_noise_m, params.noise_seed);

        Self::build(params, initial_pose, loc_mgr, None, true)
    }

    /// Create a field robot driving the given actuation sink.
    ///
    /// Position estimates must be supplied by the external localisation
    /// source through [`Robot::set_pose`].
    pub fn field(params: Params, initial_pose: Pose, sink: Box<dyn VelocitySink>) -> Self {
        Self::build(params, initial_pose, LocMgr::external(), Some(sink), false)
    }

    fn build(
        params: Params,
        initial_pose: Pose,
        loc_mgr: LocMgr,
        sink: Option<Box<dyn VelocitySink>>,
        is_sim: bool,
    ) -> Self {
        let pid_x = PidController::new(
            params.position_k_p,
            params.position_k_i,
            params.position_k_d,
            params.time_step_s,
        );
        let pid_y = pid_x.clone();

        Self {
            params,
            pose: initial_pose,
            truthpose: if is_sim { Some(vec![initial_pose]) } else { None },
            pid_x,
            pid_y,
            loc_mgr,
            sink,
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// The truth-pose history, present only in simulation mode.
    pub fn truthpose(&self) -> Option<&[Pose]> {
        self.truthpose.as_deref()
    }

    pub fn is_sim(&self) -> bool {
        self.truthpose.is_some()
    }

    /// Supply the latest external pose estimate (field operation).
    pub fn set_pose(&mut self, pose: Pose) {
        self.loc_mgr.set_pose(pose);
    }

    /// Clear the position controllers, ready for a new traversal.
    pub fn reset_controllers(&mut self) {
        self.pid_x.reset();
        self.pid_y.reset();
    }

    /// The current position estimate.
    ///
    /// In field operation the robot's own pose is synchronised to the
    /// estimate, since the external localisation source is the only truth
    /// available.
    pub fn estimate_position(&mut self) -> Result<Pose, MotionCtrlError> {
        let estimate = match self.loc_mgr.estimate(&self.pose) {
            Some(p) => p,
            None => return Err(MotionCtrlError::PoseUnavailable),
        };

        if !self.is_sim() {
            self.pose = estimate;
        }

        Ok(estimate)
    }

    // ------------------------ MOTION PRIMITIVES -----------------------------

    /// Move the robot with both a linear and an angular displacement.
    pub fn travel(&mut self, dist_m: f64, dtheta_rad: f64) {
        self.pose = integrate_odom(&self.pose, dist_m, dtheta_rad);
        self.append_truthpose();
    }

    /// Move the robot forward (or backward, for negative distances) along
    /// its heading.
    pub fn move_forward(&mut self, dist_m: f64) {
        let (sin_h, cos_h) = self.pose.heading_rad.sin_cos();
        self.pose.position_m = Vector2::new(
            round_dp(self.pose.position_m[0] + dist_m * cos_h, 3),
            round_dp(self.pose.position_m[1] + dist_m * sin_h, 3),
        );
        self.append_truthpose();
    }

    /// Turn the robot in place by the given angle in radians.
    pub fn turn(&mut self, dtheta_rad: f64) {
        self.pose.heading_rad = round_dp(wrap_2pi(self.pose.heading_rad + dtheta_rad), 3);
        self.append_truthpose();
    }

    fn append_truthpose(&mut self) {
        if let Some(ref mut history) = self.truthpose {
            history.push(self.pose);
        }
    }

    /// Execute one limited velocity command over the control timestep.
    ///
    /// Simulation integrates the command into the truth state; field
    /// operation forwards it to the actuation sink.
    fn apply_cmd(&mut self, cmd: &VelCmd) {
        if self.is_sim() {
            self.travel(
                cmd.lin_ms * self.params.time_step_s,
                cmd.ang_rads * self.params.time_step_s,
            );
        } else if let Some(ref mut sink) = self.sink {
            sink.send(cmd);
        }
    }

    // ------------------------ WAYPOINT TRACKING -----------------------------

    /// Track the given waypoint queue until it is exhausted.
    ///
    /// Waypoints are popped from the front of the queue as they are reached
    /// within `allowed_dist_error_m`. A waypoint whose best distance stops
    /// improving is abandoned (popped and recorded in the report) so that a
    /// single unreachable target cannot stall the whole traversal. The
    /// queue always holds exactly the remaining waypoints, so an
    /// interrupted traversal can be resumed with the same queue.
    pub fn track_waypoints(
        &mut self,
        queue: &mut VecDeque<Node>,
        allowed_dist_error_m: f64,
    ) -> Result<TraverseReport, MotionCtrlError> {
        let mut report = TraverseReport::default();

        while let Some(target) = queue.front() {
            let target_m = target.local_m();
            let target_pos = target.position();

            match self.approach_waypoint(target_m, allowed_dist_error_m)? {
                WaypointOutcome::Reached => {
                    debug!("Waypoint {:?} reached", target_pos);
                    report.reached += 1;
                }
                WaypointOutcome::Aborted => {
                    warn!(
                        "Waypoint {:?} abandoned after {} steps without progress",
                        target_pos, self.params.non_conv_step_limit
                    );
                    report.aborted.push(target_pos);
                    report.degraded = true;
                }
            }

            queue.pop_front();
        }

        // Come to a stop once the queue is exhausted
        if !self.is_sim() {
            self.apply_cmd(&VelCmd::stop());
        }

        Ok(report)
    }

    /// Run the closed control loop against a single target.
    ///
    /// Each step estimates the position, feeds the per-axis errors through
    /// the PID controllers, converts the resulting velocity demand with the
    /// feedback linearization, limits it, and applies it over one timestep.
    /// Terminates when the estimate is within tolerance of the target, or
    /// when the non-convergence guard trips.
    pub fn approach_waypoint(
        &mut self,
        target_m: Vector2<f64>,
        allowed_dist_error_m: f64,
    ) -> Result<WaypointOutcome, MotionCtrlError> {
        self.reset_controllers();

        let mut state = WaypointState::Approaching;
        let mut best_dist_m = f64::INFINITY;
        let mut stalled_steps = 0usize;

        loop {
            match state {
                WaypointState::Approaching => {
                    let estimate = self.estimate_position()?;
                    let dist_m = (target_m - estimate.position_m).norm();

                    if dist_m <= allowed_dist_error_m {
                        state = WaypointState::Reached;
                        continue;
                    }

                    // Non-convergence guard: abandon the target if the best
                    // distance has stopped improving
                    if dist_m < best_dist_m {
                        best_dist_m = dist_m;
                        stalled_steps = 0;
                    } else {
                        stalled_steps += 1;
                        if stalled_steps >= self.params.non_conv_step_limit {
                            return Ok(WaypointOutcome::Aborted);
                        }
                    }

                    let x_vel_ms = self.pid_x.update(target_m[0] - estimate.position_m[0]);
                    let y_vel_ms = self.pid_y.update(target_m[1] - estimate.position_m[1]);

                    let (lin_ms, ang_rads) =
                        feedback_lin(&estimate, x_vel_ms, y_vel_ms, self.params.epsilon_m);
                    let (lin_ms, ang_rads) =
                        limit_cmds(lin_ms, ang_rads, self.params.max_v_ms, self.params.radius_m);

                    self.apply_cmd(&VelCmd { lin_ms, ang_rads });
                }
                WaypointState::Reached => return Ok(WaypointOutcome::Reached),
            }
        }
    }

    // ----------------------- BOUNDED EXPLORATION ----------------------------

    /// Non-systematic coverage by boundary bouncing.
    ///
    /// Drives straight until the robot leaves the grid's physical extent,
    /// then backs off and turns by a fixed angle. Runs until the elapsed
    /// time budget is exhausted; the accumulator advances by the fixed
    /// control timestep every iteration, so termination is guaranteed.
    pub fn bounded_explore(&mut self, extent_m: Vector2<f64>, time_budget_s: f64) {
        let move_dist_m = self.params.explore_move_dist_m;
        let mut elapsed_s = 0.0;

        while elapsed_s <= time_budget_s {
            let position = self.pose.position_m;
            let out_of_bounds = position[0] < 0.0
                || position[0] > extent_m[0]
                || position[1] < 0.0
                || position[1] > extent_m[1];

            if out_of_bounds {
                self.move_forward(-move_dist_m);
                self.turn(self.params.explore_turn_rad);
            } else {
                self.move_forward(move_dist_m);
            }

            elapsed_s += self.params.time_step_s;
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
