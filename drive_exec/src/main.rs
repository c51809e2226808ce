//! Drivetrain executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Construct all hardware handles, then wire them into DriveCtrl
//!     - Main loop, once per fixed period cycle:
//!         - Get the command for this cycle from the drive script
//!         - DriveCtrl processing
//!         - Archiving
//!         - Advance the simulated drivetrain
//!
//! # Modules
//!
//! All cyclic modules (e.g. `drive_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod script;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use drive_lib::{
    data_store::{DataStore, SafeModeCause},
    drive_ctrl::{self, DriveCtrl},
    sim::SimDrivetrain,
    telemetry::LogTelemetry,
};
use params::ExecParams;
use script::{PendingCmd, ScriptRunner};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new("drive_exec", "sessions").wrap_err("Failed to create the session")?;

    // Load the exec parameters first as they set the log level
    let exec_params: ExecParams =
        util::params::load("drive_exec.toml").wrap_err("Could not load exec params")?;

    let log_level = LevelFilter::from_str(&exec_params.log_level)
        .map_err(|_| eyre!("Invalid log level \"{}\"", exec_params.log_level))?;

    // Initialise logger
    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Drivetrain Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    if !(exec_params.cycle_period_s > 0.0) {
        return Err(eyre!(
            "Cycle period must be positive, found {}",
            exec_params.cycle_period_s
        ));
    }

    // ---- LOAD PARAMETERS ----

    let drive_ctrl_params: drive_ctrl::Params =
        util::params::load("drive_ctrl.toml").wrap_err("Could not load DriveCtrl params")?;

    info!("Parameters loaded");

    // ---- INITIALISE HARDWARE ----

    // All hardware handles are created here, before anything uses them
    let sim = SimDrivetrain::new(exec_params.sim);
    let actuator = sim.actuator();
    let (left_encoder, right_encoder) = sim.encoders();

    info!("Simulated drivetrain initialised");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    let mut dc = DriveCtrl::new(
        drive_ctrl_params,
        actuator,
        left_encoder,
        right_encoder,
        Box::new(LogTelemetry),
    )
    .wrap_err("Failed to create DriveCtrl")?;
    State::init(&mut dc, (), &session).wrap_err("Failed to initialise DriveCtrl")?;
    ds.install_drive_ctrl(dc);

    info!("DriveCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let mut script = ScriptRunner::new(&exec_params.script, exec_params.cycle_period_s);

    info!(
        "Begining main loop, script lasts {:.02} s and contains {} steps\n",
        script.remaining_duration_s(),
        exec_params.script.len()
    );

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(exec_params.cycle_period_s);

        // ---- SCRIPT PROCESSING ----

        match script.next_cmd() {
            PendingCmd::Cmd(cmd) => ds.drive_ctrl_input.cmd = cmd,
            PendingCmd::EndOfScript => {
                info!("End of drive script reached, stopping");
                ds.make_safe(SafeModeCause::EndOfScript);
                break;
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        let input = ds.drive_ctrl_input;
        let proc_result = ds.drive_ctrl_mut()?.proc(&input);

        match proc_result {
            Ok((o, r)) => {
                ds.drive_ctrl_output = o;
                ds.drive_ctrl_status_rpt = r;
                ds.make_unsafe(SafeModeCause::DriveCtrlError);
            }
            Err(e) => {
                warn!("Error during DriveCtrl processing: {}", e);
                ds.make_safe(SafeModeCause::DriveCtrlError);
            }
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.drive_ctrl_mut()?.write() {
            warn!("Could not write DriveCtrl archives: {}", e);
        }

        // ---- SIMULATION ----

        sim.step(exec_params.cycle_period_s);

        // ---- CYCLE MANAGEMENT ----

        if !exec_params.free_run {
            let cycle_dur = Instant::now() - cycle_start_instant;

            // Get sleep duration
            match Duration::from_secs_f64(exec_params.cycle_period_s).checked_sub(cycle_dur) {
                Some(d) => {
                    ds.num_consec_cycle_overruns = 0;
                    thread::sleep(d);
                }
                None => {
                    warn!(
                        "Cycle overran by {:.06} s",
                        cycle_dur.as_secs_f64() - exec_params.cycle_period_s
                    );
                    ds.num_consec_cycle_overruns += 1;
                }
            }
        }

        debug!(
            "Cycle {}: dist {:.2} in, status {:?}",
            ds.num_cycles, ds.drive_ctrl_output.average_dist_in, ds.drive_ctrl_status_rpt
        );

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    let dc = ds.drive_ctrl()?;
    info!(
        "Ran {} cycles ({:.2} s), final distance {:.2} in, at target: {}",
        ds.num_cycles,
        ds.run_time_s,
        dc.average_dist(),
        dc.is_at_target()
    );

    info!("End of execution");

    Ok(())
}
