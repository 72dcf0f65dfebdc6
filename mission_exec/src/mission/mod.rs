//! # Mission module
//!
//! This module implements the mission phase state machine, which sequences
//! the coverage behaviours:
//!
//! - `Setup` - prepare the robot for traversal.
//! - `Traverse` - run the motion controller against the waypoint queue (or
//!   the bounded-exploration controller, depending on the control mode).
//! - `AvoidObstacle` - reactive avoidance, delegated to an external
//!   collaborator.
//! - `Return` / `Docking` - return to the base station and dock, delegated
//!   to external collaborators.
//! - `Complete` - the mission finished.
//! - `Fault` - terminal state reachable from every phase on unrecoverable
//!   error.
//!
//! The mission only guarantees that the phase transitions compose
//! correctly; the internals of the reactive phases are out of scope.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, warn};
use nalgebra::Vector2;
use serde::Serialize;
use std::collections::VecDeque;

// Internal
use crate::geo::{self, GeoError, GeoPoint};
use crate::grid::{ControlMode, Grid, GridError, Node};
use crate::loc::Pose;
use crate::motion_ctrl::{MotionCtrlError, Robot};
pub use params::{BaseStationParams, MissionParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A coverage mission.
///
/// Owns the robot, the coverage grid, the waypoint queue and the
/// mission-level tolerances, and drives the per-phase control loop until
/// completion.
pub struct Mission {
    params: MissionParams,

    robot: Robot,

    grid: Grid,

    /// The full ordered waypoint list produced at construction
    all_waypoints: Vec<Node>,

    /// The live queue of waypoints not yet visited
    waypoints_to_visit: VecDeque<Node>,

    /// The base station in the grid's local frame, if configured
    base_station: Option<BaseStation>,

    phase: Phase,

    report: MissionReport,
}

/// The base station converted into the grid's local frame.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct BaseStation {
    pub position_m: Vector2<f64>,
    pub heading_rad: f64,
}

/// Summary of a mission run.
#[derive(Debug, Clone, Serialize)]
pub struct MissionReport {
    /// The phase the mission ended in
    pub final_phase: Phase,

    /// Total number of waypoints in the traversal plan
    pub waypoints_total: usize,

    /// Number of waypoints reached within tolerance
    pub waypoints_reached: usize,

    /// Grid positions of waypoints abandoned by the non-convergence guard
    pub waypoints_aborted: Vec<(usize, usize)>,

    /// True if any waypoint had to be abandoned
    pub degraded: bool,

    /// Description of the fault that ended the mission, if any
    pub fault: Option<String>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The phases of a mission.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Phase {
    Setup,
    Traverse,
    AvoidObstacle,
    Return,
    Docking,
    Complete,
    Fault,
}

/// Possible errors that can occur during a mission.
#[derive(Debug, thiserror::Error)]
pub enum MissionError {
    #[error("Failed to build the coverage grid: {0}")]
    GridError(#[from] GridError),

    #[error("Invalid base station location: {0}")]
    InvalidBaseStation(#[from] GeoError),

    #[error("Motion control failed: {0}")]
    MotionCtrlError(#[from] MotionCtrlError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Phase {
    /// Whether the transition from this phase to `to` is legal.
    ///
    /// The transition table is closed: adding an edge here is the only way
    /// to widen the machine, and `Fault` is reachable from every phase.
    pub fn can_transition(self, to: Phase) -> bool {
        use Phase::*;

        matches!(
            (self, to),
            (Setup, Traverse)
                | (Traverse, AvoidObstacle)
                | (Traverse, Return)
                | (Traverse, Complete)
                | (AvoidObstacle, Traverse)
                | (Return, Docking)
                | (Docking, Complete)
                | (_, Fault)
        )
    }

    /// True for the two terminal phases.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Complete | Phase::Fault)
    }
}

impl Mission {
    /// Create a new simulated mission from the given parameters.
    ///
    /// Builds the coverage grid over the configured bounding box, activates
    /// the full rectangle (carving a traversable sub-region out of it is an
    /// external planner's job), derives the waypoint plan for the
    /// configured control mode and places a simulated robot at the
    /// configured starting pose.
    pub fn new(params: MissionParams) -> Result<Self, MissionError> {
        let robot = Robot::sim(
            params.motion_ctrl.clone(),
            Pose::new(params.init_x_m, params.init_y_m, params.init_heading_rad),
        );

        Self::with_robot(params, robot)
    }

    /// Create a new mission around an externally constructed robot.
    ///
    /// This is the entry point for field operation, where the robot is
    /// built with the real actuation sink and localisation source.
    pub fn with_robot(params: MissionParams, robot: Robot) -> Result<Self, MissionError> {
        let mut grid = Grid::new(
            params.lat_min,
            params.lat_max,
            params.long_min,
            params.long_max,
        )?;

        grid.activate_range(0, 0, grid.num_rows(), grid.num_cols())?;
        let leftmost = grid.border_analysis().leftmost_pos;
        info!(
            "Coverage grid built: {} x {} nodes, leftmost border node {:?}",
            grid.num_rows(),
            grid.num_cols(),
            leftmost
        );

        let all_waypoints = grid.waypoints(params.control_mode);
        if all_waypoints.is_empty() {
            // Not an error: modes without a plan just have nothing to visit
            info!("Control mode {:?} has no waypoint plan", params.control_mode);
        }

        let base_station = match params.base_station {
            Some(ref bs) => {
                let gps = GeoPoint::new(bs.lat_deg, bs.long_deg)?;
                Some(BaseStation {
                    position_m: geo::geo_to_local(grid.origin(), &gps),
                    heading_rad: bs.heading_rad,
                })
            }
            None => None,
        };

        let waypoints_to_visit = all_waypoints.iter().cloned().collect();

        let report = MissionReport {
            final_phase: Phase::Setup,
            waypoints_total: all_waypoints.len(),
            waypoints_reached: 0,
            waypoints_aborted: Vec::new(),
            degraded: false,
            fault: None,
        };

        Ok(Self {
            params,
            robot,
            grid,
            all_waypoints,
            waypoints_to_visit,
            base_station,
            phase: Phase::Setup,
            report,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    /// The full waypoint plan derived at construction.
    pub fn all_waypoints(&self) -> &[Node] {
        &self.all_waypoints
    }

    /// Number of waypoints not yet visited.
    pub fn waypoints_remaining(&self) -> usize {
        self.waypoints_to_visit.len()
    }

    pub fn base_station(&self) -> Option<&BaseStation> {
        self.base_station.as_ref()
    }

    /// Request a phase change from an external collaborator, for example an
    /// obstacle detector demanding `AvoidObstacle`.
    ///
    /// Illegal requests fault the mission rather than being silently
    /// accepted.
    pub fn request_phase(&mut self, to: Phase) {
        self.transition(to);
    }

    /// Run the mission to a terminal phase and return the report.
    pub fn run(&mut self) -> MissionReport {
        while !self.phase.is_terminal() {
            self.step();
        }

        self.report.final_phase = self.phase;
        self.report.clone()
    }

    /// Execute the handler for the current phase and apply its transition.
    ///
    /// Returns the phase the mission is in afterwards. Handler errors fault
    /// the mission.
    pub fn step(&mut self) -> Phase {
        if self.phase.is_terminal() {
            return self.phase;
        }

        let next = match self.phase {
            Phase::Setup => self.execute_setup(),
            Phase::Traverse => self.execute_traverse(),
            Phase::AvoidObstacle => self.execute_avoid_obstacle(),
            Phase::Return => self.execute_return(),
            Phase::Docking => self.execute_docking(),
            // Terminal phases are rejected above
            Phase::Complete | Phase::Fault => unreachable!(),
        };

        match next {
            Ok(phase) => self.transition(phase),
            Err(e) => {
                error!("Phase {:?} failed: {}", self.phase, e);
                self.report.fault = Some(e.to_string());
                self.phase = Phase::Fault;
            }
        }

        self.report.final_phase = self.phase;
        self.phase
    }

    fn transition(&mut self, to: Phase) {
        if self.phase == to {
            return;
        }

        if self.phase.can_transition(to) {
            info!("Mission phase change: {:?} -> {:?}", self.phase, to);
            self.phase = to;
        } else {
            error!(
                "Illegal mission phase transition {:?} -> {:?}",
                self.phase, to
            );
            self.report.fault = Some(format!(
                "illegal phase transition {:?} -> {:?}",
                self.phase, to
            ));
            self.phase = Phase::Fault;
        }
    }

    // --------------------------- PHASE HANDLERS -----------------------------

    /// Prepare the robot for the traversal.
    fn execute_setup(&mut self) -> Result<Phase, MissionError> {
        self.robot.reset_controllers();

        Ok(Phase::Traverse)
    }

    /// Run the configured coverage behaviour until its work is exhausted.
    ///
    /// The waypoint queue holds exactly the unvisited remainder at all
    /// times, so a traversal interrupted by `AvoidObstacle` resumes where
    /// it left off when this phase is re-entered.
    fn execute_traverse(&mut self) -> Result<Phase, MissionError> {
        match self.params.control_mode {
            ControlMode::LawnmowerFull | ControlMode::LawnmowerBorders | ControlMode::Spiral => {
                let traverse = self
                    .robot
                    .track_waypoints(&mut self.waypoints_to_visit, self.params.allowed_dist_error_m)?;

                self.report.waypoints_reached += traverse.reached;
                self.report.waypoints_aborted.extend(&traverse.aborted);
                if traverse.degraded {
                    warn!(
                        "Traversal degraded: {} waypoint(s) abandoned",
                        traverse.aborted.len()
                    );
                    self.report.degraded = true;
                }
            }
            ControlMode::Roomba => {
                self.robot
                    .bounded_explore(self.grid.size_m(), self.params.explore_time_budget_s);
            }
            ControlMode::Manual => {
                info!("Manual control mode: nothing to traverse");
            }
        }

        match self.base_station {
            Some(_) => Ok(Phase::Return),
            None => Ok(Phase::Complete),
        }
    }

    /// Reactive obstacle avoidance, handed off to the external avoidance
    /// collaborator. Out of scope here: the traversal resumes afterwards.
    fn execute_avoid_obstacle(&mut self) -> Result<Phase, MissionError> {
        info!("Obstacle avoidance delegated to the avoidance collaborator");

        Ok(Phase::Traverse)
    }

    /// Return to the base station, handed off to the external navigation
    /// collaborator.
    fn execute_return(&mut self) -> Result<Phase, MissionError> {
        // Safe to unwrap, this phase is only entered when a base station is
        // configured
        let base = self.base_station.unwrap();
        info!(
            "Return to base at {:?} (heading {:.3} rad) delegated, docking \
             tolerance {} m",
            base.position_m, base.heading_rad, self.params.allowed_docking_pos_error_m
        );

        Ok(Phase::Docking)
    }

    /// Dock at the base station, handed off to the external docking
    /// collaborator.
    fn execute_docking(&mut self) -> Result<Phase, MissionError> {
        info!("Docking delegated to the docking collaborator");

        Ok(Phase::Complete)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion_ctrl;
    use std::f64::consts::FRAC_PI_2;

    fn test_params(control_mode: ControlMode) -> MissionParams {
        MissionParams {
            lat_min: 42.444250,
            lat_max: 42.444599,
            long_min: -76.483682,
            long_max: -76.483276,
            control_mode,
            allowed_dist_error_m: 0.5,
            allowed_heading_error_rad: 0.1,
            allowed_docking_pos_error_m: 0.1,
            base_station: None,
            explore_time_budget_s: 2.0,
            init_x_m: 0.0,
            init_y_m: 0.0,
            init_heading_rad: FRAC_PI_2,
            motion_ctrl: motion_ctrl::Params {
                epsilon_m: 0.2,
                max_v_ms: 0.5,
                radius_m: 0.2,
                position_k_p: 10.0,
                position_k_i: 0.0,
                position_k_d: 0.0,
                position_noise_m: 0.0,
                noise_seed: 42,
                time_step_s: 0.1,
                non_conv_step_limit: 200,
                explore_move_dist_m: 3.0,
                explore_turn_rad: 0.5233,
            },
        }
    }

    #[test]
    fn test_transition_table() {
        use Phase::*;

        assert!(Setup.can_transition(Traverse));
        assert!(Traverse.can_transition(AvoidObstacle));
        assert!(Traverse.can_transition(Return));
        assert!(AvoidObstacle.can_transition(Traverse));
        assert!(Return.can_transition(Docking));
        assert!(Docking.can_transition(Complete));

        // Fault is reachable from every phase
        for phase in [Setup, Traverse, AvoidObstacle, Return, Docking, Complete].iter() {
            assert!(phase.can_transition(Fault));
        }

        // No shortcuts
        assert!(!Setup.can_transition(Docking));
        assert!(!Return.can_transition(Traverse));
        assert!(!Complete.can_transition(Setup));
    }

    #[test]
    fn test_border_mission_completes() {
        let mut mission = Mission::new(test_params(ControlMode::LawnmowerBorders)).unwrap();
        let expected_waypoints = 2 * mission.grid().num_cols();

        let report = mission.run();

        assert_eq!(report.final_phase, Phase::Complete);
        assert_eq!(report.waypoints_total, expected_waypoints);
        assert_eq!(report.waypoints_reached, expected_waypoints);
        assert!(!report.degraded);
        assert_eq!(mission.waypoints_remaining(), 0);
    }

    #[test]
    fn test_mission_with_base_station_returns_and_docks() {
        let mut params = test_params(ControlMode::Manual);
        params.base_station = Some(BaseStationParams {
            lat_deg: 42.444250,
            long_deg: -76.483682,
            heading_rad: FRAC_PI_2,
        });

        let mut mission = Mission::new(params).unwrap();
        assert!(mission.base_station().is_some());

        // Setup -> Traverse
        assert_eq!(mission.step(), Phase::Traverse);
        // Traverse (nothing to do) -> Return -> Docking -> Complete
        assert_eq!(mission.step(), Phase::Return);
        assert_eq!(mission.step(), Phase::Docking);
        assert_eq!(mission.step(), Phase::Complete);
    }

    #[test]
    fn test_avoid_obstacle_interrupts_and_resumes() {
        let mut mission = Mission::new(test_params(ControlMode::LawnmowerBorders)).unwrap();

        assert_eq!(mission.step(), Phase::Traverse);

        // An external collaborator demands avoidance before the traversal
        // starts
        mission.request_phase(Phase::AvoidObstacle);
        assert_eq!(mission.phase(), Phase::AvoidObstacle);

        // The avoidance stub hands control back to the traversal, which
        // then runs to completion
        assert_eq!(mission.step(), Phase::Traverse);
        let report = mission.run();
        assert_eq!(report.final_phase, Phase::Complete);
        assert_eq!(report.waypoints_reached, report.waypoints_total);
    }

    #[test]
    fn test_illegal_request_faults() {
        let mut mission = Mission::new(test_params(ControlMode::Manual)).unwrap();

        mission.request_phase(Phase::Docking);

        assert_eq!(mission.phase(), Phase::Fault);
        let report = mission.run();
        assert_eq!(report.final_phase, Phase::Fault);
        assert!(report.fault.is_some());
    }

    #[test]
    fn test_roomba_mission_completes() {
        let mut mission = Mission::new(test_params(ControlMode::Roomba)).unwrap();

        let report = mission.run();

        assert_eq!(report.final_phase, Phase::Complete);
        assert_eq!(report.waypoints_total, 0);
        // The exploration moved the robot
        assert!(mission.robot().truthpose().unwrap().len() > 1);
    }

    #[test]
    fn test_manual_mode_has_empty_plan() {
        let mission = Mission::new(test_params(ControlMode::Manual)).unwrap();

        // Empty queue means "nothing to do", not an error
        assert_eq!(mission.waypoints_remaining(), 0);
        assert!(mission.all_waypoints().is_empty());
    }

    #[test]
    fn test_degenerate_box_rejected() {
        let mut params = test_params(ControlMode::LawnmowerFull);
        params.lat_max = params.lat_min;

        assert!(matches!(
            Mission::new(params),
            Err(MissionError::GridError(GridError::DegenerateBounds { .. }))
        ));
    }
}
