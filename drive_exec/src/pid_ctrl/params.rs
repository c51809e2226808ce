//! Parameters structure for a PID controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Configuration of a single PID controller.
///
/// Only the gains are required in a parameter file, everything else falls
/// back to the values given by `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PidParams {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// If true the error is `measurement - target` rather than
    /// `target - measurement`.
    pub reversed: bool,

    /// If true the input wraps around between `input_min` and `input_max`
    /// (e.g. a heading in degrees) and the error is taken the short way
    /// round.
    pub continuous: bool,

    /// Lower bound of the wrapping input range, only used when `continuous`.
    pub input_min: f64,

    /// Upper bound of the wrapping input range, only used when `continuous`.
    pub input_max: f64,

    /// Minimum output value
    pub out_min: f64,

    /// Maximum output value
    pub out_max: f64,

    /// Outputs with a magnitude below this value are replaced by zero.
    pub min_magnitude: f64,

    /// Integration time step.
    ///
    /// The integral accumulates `error * dt_s` and the derivative is
    /// `(error - last_error) / dt_s`. The default of `1.0` measures both
    /// terms per control tick, so gains are tuned in tick units.
    ///
    /// Units: seconds (or ticks when left at 1.0)
    pub dt_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidParams {
    /// Build parameters from gains alone, leaving the output unbounded.
    pub fn from_gains(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            ..Self::default()
        }
    }
}

impl Default for PidParams {
    fn default() -> Self {
        Self {
            k_p: 0.0,
            k_i: 0.0,
            k_d: 0.0,
            reversed: false,
            continuous: false,
            input_min: -180.0,
            input_max: 180.0,
            out_min: std::f64::NEG_INFINITY,
            out_max: std::f64::INFINITY,
            min_magnitude: 0.0,
            dt_s: 1.0,
        }
    }
}
