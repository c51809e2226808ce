//! # Actuator interface module
//!
//! Defines the interface through which drive demands reach the motors. The
//! drivetrain only ever talks to its motors through [`DifferentialActuator`],
//! which the hardware (or simulation) adapter implements once.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A differential (tank style) drivetrain.
///
/// All demands are normalised to `[-1, 1]`. Implementors must clamp demands
/// outside this range rather than reject them.
pub trait DifferentialActuator {
    /// Drive with a forward demand and a turn demand. A positive turn turns
    /// to the right (left side faster).
    fn arcade_drive(&mut self, drive: f64, turn: f64) {
        let (left, right) = arcade_to_tank(drive, turn);
        self.tank_drive(left, right);
    }

    /// Drive each side independently.
    fn tank_drive(&mut self, left: f64, right: f64);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The last command issued to the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ActuatorDemand {
    Arcade { drive: f64, turn: f64 },
    Tank { left: f64, right: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ActuatorDemand {
    fn default() -> Self {
        ActuatorDemand::Tank {
            left: 0.0,
            right: 0.0,
        }
    }
}

impl ActuatorDemand {
    /// Resolve the demand into per-side demands.
    pub fn to_tank(&self) -> (f64, f64) {
        match *self {
            ActuatorDemand::Arcade { drive, turn } => arcade_to_tank(drive, turn),
            ActuatorDemand::Tank { left, right } => (maths::clamp_abs(left, 1.0), maths::clamp_abs(right, 1.0)),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Mix a drive and turn demand into left and right side demands.
///
/// Both inputs are clamped to `[-1, 1]`. If the mixed demand on either side
/// exceeds full power both sides are scaled down together, so the ratio
/// between them (and hence the curvature) is kept.
pub fn arcade_to_tank(drive: f64, turn: f64) -> (f64, f64) {
    let drive = maths::clamp_abs(drive, 1.0);
    let turn = maths::clamp_abs(turn, 1.0);

    let left = drive + turn;
    let right = drive - turn;

    let max = left.abs().max(right.abs());
    if max > 1.0 {
        (left / max, right / max)
    } else {
        (left, right)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_arcade_to_tank() {
        assert_eq!(arcade_to_tank(0.5, 0.0), (0.5, 0.5));
        assert_eq!(arcade_to_tank(0.0, 0.5), (0.5, -0.5));
        assert_eq!(arcade_to_tank(-0.25, 0.25), (0.0, -0.5));

        // Saturated mixes keep their ratio
        assert_eq!(arcade_to_tank(1.0, 1.0), (1.0, 0.0));
        assert_eq!(arcade_to_tank(0.75, 0.25), (1.0, 0.5));

        // Inputs beyond full power are clamped first
        assert_eq!(arcade_to_tank(3.0, 0.0), (1.0, 1.0));
        assert_eq!(arcade_to_tank(0.0, -7.0), (-1.0, 1.0));
    }

    #[test]
    fn test_demand_to_tank() {
        let d = ActuatorDemand::Tank { left: 2.0, right: -0.5 };
        assert_eq!(d.to_tank(), (1.0, -0.5));

        let d = ActuatorDemand::Arcade { drive: 0.4, turn: -0.1 };
        assert_eq!(d.to_tank(), arcade_to_tank(0.4, -0.1));
    }
}
