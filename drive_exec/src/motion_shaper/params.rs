//! Parameters structure for the MotionShaper

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Rate and magnitude limits for the drive and turn channels.
///
/// All values are in normalised actuator demand units, where 1.0 is full
/// power.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShaperParams {
    /// Maximum change of the drive demand in one tick.
    pub drive_accel: f64,

    /// Maximum change of the turn demand in one tick.
    pub turn_accel: f64,

    /// Maximum magnitude of the drive demand.
    pub drive_max: f64,

    /// Maximum magnitude of the turn demand.
    pub turn_max: f64,
}

impl Default for ShaperParams {
    fn default() -> Self {
        Self {
            drive_accel: 0.05,
            turn_accel: 0.06,
            drive_max: 1.0,
            turn_max: 0.5,
        }
    }
}
