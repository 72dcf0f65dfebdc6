//! Main mission executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session and logging
//!     - Load the mission parameters
//!     - Build the mission (grid, waypoint plan, simulated robot)
//!     - Run the mission phase loop to a terminal phase
//!     - Archive the truth-pose history and the mission report

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::env;

// Internal
use mission_lib::mission::{Mission, MissionParams};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parameter file used when no path is given on the command line.
const DEFAULT_PARAMS_PATH: &str = "params/mission.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session =
        Session::new("mission_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Coverage Mission Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let args: Vec<String> = env::args().collect();
    let params_path = match args.len() {
        2 => args[1].clone(),
        _ => String::from(DEFAULT_PARAMS_PATH),
    };

    let params: MissionParams = util::params::load(&params_path)
        .wrap_err_with(|| format!("Could not load mission params from {:?}", params_path))?;

    info!("Mission parameters loaded from {:?}", params_path);

    // ---- MISSION EXECUTION ----

    let mut mission = Mission::new(params).wrap_err("Failed to initialise the mission")?;

    info!(
        "Mission initialised with {} waypoint(s)",
        mission.all_waypoints().len()
    );

    let report = mission.run();

    info!("Mission finished in phase {:?}", report.final_phase);
    info!(
        "    Waypoints reached: {}/{}",
        report.waypoints_reached, report.waypoints_total
    );
    if report.degraded {
        warn!(
            "Mission degraded: {} waypoint(s) abandoned",
            report.waypoints_aborted.len()
        );
    }

    // ---- ARCHIVING ----

    if let Some(truthpose) = mission.robot().truthpose() {
        session
            .save("truthpose.json", &truthpose)
            .wrap_err("Failed to save the truth-pose history")?;
    }

    session
        .save("mission_report.json", &report)
        .wrap_err("Failed to save the mission report")?;

    Ok(())
}
