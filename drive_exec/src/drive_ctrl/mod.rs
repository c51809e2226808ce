//! Drivetrain control module
//!
//! Coordinates the motion shaper, encoder feedback and distance controller
//! into the two ways of driving the robot:
//!
//! - Open loop: operator drive and turn demands are passed through the
//!   acceleration curves and sent to the motors.
//! - Distance hold: a PID controller on the averaged encoder distance drives
//!   the robot a requested distance, with the turn demand held at zero.
//!
//! Which mode runs is decided purely by which entry point is called on a
//! cycle. The modes are not arbitrated against each other, but switching
//! between them without stopping is logged and flagged in the status report.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name given to the distance controller in diagnostics.
pub const DRIVE_PID_NAME: &str = "DrivePID";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("The drivetrain has not been initialised")]
    NotInitialised,

    #[error("Invalid DriveCtrl parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("Could not create the DriveCtrl archives: {0}")]
    ArchiveInit(String),
}
