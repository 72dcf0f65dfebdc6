//! Mission parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::grid::ControlMode;
use crate::motion_ctrl;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for a coverage mission.
///
/// Loaded once at construction time; there is no dynamic reconfiguration.
#[derive(Deserialize, Debug, Clone)]
pub struct MissionParams {
    /// Minimum latitude of the coverage bounding box in degrees
    pub lat_min: f64,

    /// Maximum latitude of the coverage bounding box in degrees
    pub lat_max: f64,

    /// Minimum longitude of the coverage bounding box in degrees
    pub long_min: f64,

    /// Maximum longitude of the coverage bounding box in degrees
    pub long_max: f64,

    /// The traversal control mode for the mission
    pub control_mode: ControlMode,

    /// Maximum distance in meters the robot can be from a waypoint for the
    /// waypoint to count as visited
    pub allowed_dist_error_m: f64,

    /// Maximum heading error in radians while turning in place
    pub allowed_heading_error_rad: f64,

    /// Maximum distance in meters from the ready-to-dock position before
    /// docking can start
    pub allowed_docking_pos_error_m: f64,

    /// The base station, if the mission should return and dock after the
    /// traversal
    pub base_station: Option<BaseStationParams>,

    /// Time budget for the bounded-exploration control mode
    pub explore_time_budget_s: f64,

    /// Robot starting position (east) in the grid local frame
    pub init_x_m: f64,

    /// Robot starting position (north) in the grid local frame
    pub init_y_m: f64,

    /// Robot starting heading in radians, 0 along +x
    pub init_heading_rad: f64,

    /// Motion control parameters
    pub motion_ctrl: motion_ctrl::Params,
}

/// Location and orientation of the base station.
#[derive(Deserialize, Debug, Clone)]
pub struct BaseStationParams {
    /// Latitude of the base station in degrees
    pub lat_deg: f64,

    /// Longitude of the base station in degrees
    pub long_deg: f64,

    /// Direction the base station faces in radians, 0 along +x
    pub heading_rad: f64,
}
