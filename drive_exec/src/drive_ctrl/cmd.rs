//! Commands passed into DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Operator or autonomous driving intent.
///
/// Values are nominally in `[-1, 1]` but are not clamped on input, the
/// motion shaper limits them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct DriveCommand {
    /// Forwards/backwards demand, forwards positive.
    pub drive: f64,

    /// Turn demand.
    pub turn: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The entry point DriveCtrl shall run on a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriveCmd {
    /// Open loop drive through the acceleration curves.
    Accel(DriveCommand),

    /// Set a new distance target relative to where the robot is now, and
    /// start driving to it.
    DriveDistance {
        /// Units: inches
        distance_in: f64,
    },

    /// Keep driving to the current distance target.
    HoldDistance,

    /// Zero the encoders and the distance controller.
    ResetEncoders,

    /// Command zero power to both sides.
    Stop,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCommand {
    pub fn new(drive: f64, turn: f64) -> Self {
        Self { drive, turn }
    }
}

impl DriveCmd {
    /// The command to issue on the cycles after this one was first issued,
    /// for a command that is held for several cycles.
    ///
    /// A distance request becomes a hold on the new target, and an encoder
    /// reset is only done once.
    pub fn continuation(&self) -> Option<DriveCmd> {
        match self {
            DriveCmd::DriveDistance { .. } => Some(DriveCmd::HoldDistance),
            DriveCmd::ResetEncoders => None,
            c => Some(*c),
        }
    }
}
