//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use crate::motion_shaper::ShaperParams;
use crate::pid_ctrl::PidParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drivetrain control.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Params {
    // ---- OPEN LOOP ----
    /// Ramp limits used by `accel_drive`.
    pub shaper: ShaperParams,

    // ---- CLOSED LOOP ----
    /// Distance hold controller.
    pub drive_pid: PidParams,

    /// Distance from the target within which the robot counts as having
    /// arrived.
    ///
    /// Units: inches
    pub at_target_tolerance_in: f64,

    // ---- SENSING ----
    /// Scale from raw encoder counts to distance, shared by both encoders.
    ///
    /// Units: inches/count
    pub conversion_factor: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("{0} must be a positive finite number, found {1}")]
    NotPositive(&'static str, f64),

    #[error("Drive PID output limits are inverted: [{0}, {1}]")]
    InvertedOutputLimits(f64, f64),

    #[error("Drive PID continuous input range is empty: [{0}, {1}]")]
    EmptyInputRange(f64, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            shaper: ShaperParams::default(),
            drive_pid: PidParams {
                out_min: -0.4,
                out_max: 0.4,
                ..PidParams::default()
            },
            at_target_tolerance_in: 2.0,
            conversion_factor: 2.02,
        }
    }
}

impl Params {
    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        let positive = [
            ("shaper.drive_accel", self.shaper.drive_accel),
            ("shaper.turn_accel", self.shaper.turn_accel),
            ("shaper.drive_max", self.shaper.drive_max),
            ("shaper.turn_max", self.shaper.turn_max),
            ("drive_pid.dt_s", self.drive_pid.dt_s),
            ("conversion_factor", self.conversion_factor.abs()),
        ];

        for (name, value) in positive.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(ParamsError::NotPositive(*name, *value));
            }
        }

        if !(self.at_target_tolerance_in >= 0.0) {
            return Err(ParamsError::NotPositive(
                "at_target_tolerance_in",
                self.at_target_tolerance_in,
            ));
        }

        if self.drive_pid.out_min > self.drive_pid.out_max {
            return Err(ParamsError::InvertedOutputLimits(
                self.drive_pid.out_min,
                self.drive_pid.out_max,
            ));
        }

        if self.drive_pid.continuous && !(self.drive_pid.input_max > self.drive_pid.input_min) {
            return Err(ParamsError::EmptyInputRange(
                self.drive_pid.input_min,
                self.drive_pid.input_max,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let p = Params::default();
        assert!(p.are_valid().is_ok());
        assert_eq!(p.shaper.drive_accel, 0.05);
        assert_eq!(p.shaper.turn_max, 0.5);
        assert_eq!(p.drive_pid.out_max, 0.4);
        assert_eq!(p.conversion_factor, 2.02);
    }

    #[test]
    fn test_parse_partial() {
        let p: Params = util::params::from_str(
            r#"
            conversion_factor = 1.5

            [drive_pid]
            k_p = 0.08
            out_min = -0.6
            out_max = 0.6
            "#,
        )
        .unwrap();

        assert!(p.are_valid().is_ok());
        assert_eq!(p.conversion_factor, 1.5);
        assert_eq!(p.drive_pid.k_p, 0.08);
        assert_eq!(p.drive_pid.k_i, 0.0);
        assert_eq!(p.drive_pid.out_min, -0.6);
        assert_eq!(p.shaper, ShaperParams::default());
        assert_eq!(p.at_target_tolerance_in, 2.0);
    }

    #[test]
    fn test_invalid() {
        let mut p = Params::default();
        p.conversion_factor = 0.0;
        assert!(matches!(
            p.are_valid(),
            Err(ParamsError::NotPositive("conversion_factor", _))
        ));

        let mut p = Params::default();
        p.shaper.turn_accel = -0.1;
        assert!(matches!(p.are_valid(), Err(ParamsError::NotPositive(_, _))));

        let mut p = Params::default();
        p.drive_pid.out_min = 0.5;
        assert!(matches!(
            p.are_valid(),
            Err(ParamsError::InvertedOutputLimits(_, _))
        ));

        let mut p = Params::default();
        p.drive_pid.continuous = true;
        p.drive_pid.input_min = 10.0;
        p.drive_pid.input_max = 10.0;
        assert!(matches!(p.are_valid(), Err(ParamsError::EmptyInputRange(_, _))));
    }
}
