//! # Drive Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use drive_lib::{drive_ctrl::DriveCmd, sim::SimParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct ExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Minimum level of messages to log, one of `info`, `debug` or `trace`.
    pub log_level: String,

    /// If true cycles run back to back instead of waiting out the cycle
    /// period.
    pub free_run: bool,

    /// Simulated drivetrain the executable drives.
    pub sim: SimParams,

    /// Commands to run, in order.
    pub script: Vec<ScriptStep>,
}

/// A command held for a number of cycles.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct ScriptStep {
    /// Units: seconds
    pub duration_s: f64,

    pub cmd: DriveCmd,
}

impl Default for ExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            log_level: String::from("info"),
            free_run: false,
            sim: SimParams::default(),
            script: Vec::new(),
        }
    }
}

impl ScriptStep {
    /// Number of cycles this step lasts for, at least one.
    pub fn num_cycles(&self, cycle_period_s: f64) -> u64 {
        ((self.duration_s / cycle_period_s).round() as u64).max(1)
    }
}
