//! # Simulated drivetrain
//!
//! A simple first order model of a differential drivetrain, used in place of
//! the motor controllers and encoders when running off the robot and in
//! tests.
//!
//! The right side encoder counts backwards when the robot drives forwards,
//! the same way the mirrored encoder on the real robot does.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;

// Internal
use crate::actuator::{ActuatorDemand, DifferentialActuator};
use crate::enc_fdbk::{EncoderHardware, Side};
use util::maths;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulated drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Encoder rate reached by a side at full demand.
    ///
    /// Units: counts/second
    pub max_rate_counts_s: f64,

    /// Time constant of the motor response.
    ///
    /// Units: seconds
    pub time_constant_s: f64,
}

/// Handle on the simulated drivetrain.
///
/// The actuator and encoder handles created from it all share the same
/// plant.
#[derive(Clone)]
pub struct SimDrivetrain {
    plant: Rc<RefCell<SimPlant>>,
}

/// Simulated motors, as seen by the drivetrain.
pub struct SimActuator {
    plant: Rc<RefCell<SimPlant>>,
}

/// One simulated encoder channel.
pub struct SimEncoder {
    plant: Rc<RefCell<SimPlant>>,
    side: Side,
}

#[derive(Debug, Default)]
struct SimPlant {
    params: SimParams,

    /// Latest commanded demand
    demand: ActuatorDemand,

    /// Wheel rates, forwards positive.
    ///
    /// Units: counts/second
    left_rate: f64,
    right_rate: f64,

    /// Raw encoder counts, as the encoders report them
    left_counts: f64,
    right_counts: f64,

    /// Number of demands received since creation
    num_demands: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            max_rate_counts_s: 40.0,
            time_constant_s: 0.15,
        }
    }
}

impl SimDrivetrain {
    /// Create a new drivetrain at rest.
    pub fn new(params: SimParams) -> Self {
        Self {
            plant: Rc::new(RefCell::new(SimPlant {
                params,
                ..SimPlant::default()
            })),
        }
    }

    /// Get an actuator driving this drivetrain.
    pub fn actuator(&self) -> SimActuator {
        SimActuator {
            plant: self.plant.clone(),
        }
    }

    /// Get the (left, right) encoders of this drivetrain.
    pub fn encoders(&self) -> (SimEncoder, SimEncoder) {
        (
            SimEncoder {
                plant: self.plant.clone(),
                side: Side::Left,
            },
            SimEncoder {
                plant: self.plant.clone(),
                side: Side::Right,
            },
        )
    }

    /// Advance the simulation by `dt_s` seconds using the latest demand.
    pub fn step(&self, dt_s: f64) {
        self.plant.borrow_mut().step(dt_s)
    }

    /// Latest demand sent to the motors.
    pub fn last_demand(&self) -> ActuatorDemand {
        self.plant.borrow().demand
    }

    /// Number of demands the motors have received.
    pub fn num_demands(&self) -> u64 {
        self.plant.borrow().num_demands
    }

    /// Force the raw counts of both encoders, for setting up scenarios.
    pub fn set_counts(&self, left: f64, right: f64) {
        let mut plant = self.plant.borrow_mut();
        plant.left_counts = left;
        plant.right_counts = right;
    }
}

impl SimPlant {
    fn step(&mut self, dt_s: f64) {
        let (left_dem, right_dem) = self.demand.to_tank();
        let max_rate = self.params.max_rate_counts_s;

        // First order lag towards the demanded rate
        let alpha = if self.params.time_constant_s > 0.0 {
            maths::clamp(dt_s / self.params.time_constant_s, 0.0, 1.0)
        } else {
            1.0
        };

        self.left_rate += (left_dem * max_rate - self.left_rate) * alpha;
        self.right_rate += (right_dem * max_rate - self.right_rate) * alpha;

        self.left_counts += self.left_rate * dt_s;
        self.right_counts -= self.right_rate * dt_s;

        trace!(
            "Sim: rates ({:.2}, {:.2}) counts/s, counts ({:.2}, {:.2})",
            self.left_rate,
            self.right_rate,
            self.left_counts,
            self.right_counts
        );
    }
}

impl DifferentialActuator for SimActuator {
    fn arcade_drive(&mut self, drive: f64, turn: f64) {
        let mut plant = self.plant.borrow_mut();
        plant.demand = ActuatorDemand::Arcade {
            drive: maths::clamp_abs(drive, 1.0),
            turn: maths::clamp_abs(turn, 1.0),
        };
        plant.num_demands += 1;
    }

    fn tank_drive(&mut self, left: f64, right: f64) {
        let mut plant = self.plant.borrow_mut();
        plant.demand = ActuatorDemand::Tank {
            left: maths::clamp_abs(left, 1.0),
            right: maths::clamp_abs(right, 1.0),
        };
        plant.num_demands += 1;
    }
}

impl EncoderHardware for SimEncoder {
    fn raw_position(&self) -> f64 {
        let plant = self.plant.borrow();
        match self.side {
            Side::Left => plant.left_counts,
            Side::Right => plant.right_counts,
        }
    }

    fn raw_velocity(&self) -> f64 {
        let plant = self.plant.borrow();
        match self.side {
            Side::Left => plant.left_rate,
            Side::Right => -plant.right_rate,
        }
    }

    fn zero_position(&mut self) {
        let mut plant = self.plant.borrow_mut();
        match self.side {
            Side::Left => plant.left_counts = 0.0,
            Side::Right => plant.right_counts = 0.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_forward_mirrors_right_encoder() {
        let sim = SimDrivetrain::new(SimParams {
            max_rate_counts_s: 10.0,
            time_constant_s: 0.0,
        });
        let mut act = sim.actuator();
        let (left, right) = sim.encoders();

        act.arcade_drive(0.5, 0.0);
        sim.step(1.0);

        assert_abs_diff_eq!(left.raw_position(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(right.raw_position(), -5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(left.raw_velocity(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(right.raw_velocity(), -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_demands_clamped() {
        let sim = SimDrivetrain::new(SimParams::default());
        let mut act = sim.actuator();

        act.tank_drive(4.0, -2.0);
        assert_eq!(
            sim.last_demand(),
            ActuatorDemand::Tank {
                left: 1.0,
                right: -1.0
            }
        );
        assert_eq!(sim.num_demands(), 1);
    }

    #[test]
    fn test_zero_position() {
        let sim = SimDrivetrain::new(SimParams::default());
        let (mut left, right) = sim.encoders();
        sim.set_counts(12.0, -3.0);

        left.zero_position();
        assert_eq!(left.raw_position(), 0.0);
        assert_eq!(right.raw_position(), -3.0);
    }
}
