//! # PID controller module
//!
//! This module provides the generic discrete PID controller used by the
//! drivetrain. The controller is ticked once per control cycle through
//! [`PidController::calc`], which clamps its output into the configured
//! limits, holds the integral while the output is saturated and forces small
//! outputs to zero.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use serde::Serialize;

// Internal
pub use params::*;
use util::maths;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Clone)]
pub struct PidController {
    /// Name used to tag diagnostics from this controller
    name: String,

    /// Gains, limits and flags
    params: PidParams,

    /// Controller memory
    state: PidState,
}

/// The memory of a PID controller, carried between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PidState {
    /// The setpoint the controller is driving towards
    pub target: f64,

    /// The integral accumulation
    pub integral: f64,

    /// Error from the previous call to `calc`
    pub last_error: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller from the given parameters.
    ///
    /// A non-positive or non-finite `dt_s` is replaced by one tick.
    pub fn new(name: &str, params: PidParams) -> Self {
        let mut params = params;

        if !(params.dt_s.is_finite() && params.dt_s > 0.0) {
            warn!(
                "PID {}: invalid time step {}, using one tick instead",
                name, params.dt_s
            );
            params.dt_s = 1.0;
        }

        let mut ctrl = Self {
            name: String::from(name),
            params,
            state: PidState::default(),
        };

        // Pass the limits through the setter so inverted ones get fixed up
        ctrl.set_output_limits(params.out_min, params.out_max);

        ctrl
    }

    /// Name of the controller.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current parameters of the controller.
    pub fn params(&self) -> &PidParams {
        &self.params
    }

    /// Current memory of the controller.
    pub fn state(&self) -> PidState {
        self.state
    }

    /// Set the range the output of `calc` is clamped into.
    ///
    /// If `min` is greater than `max` the two are swapped.
    pub fn set_output_limits(&mut self, min: f64, max: f64) {
        if min > max {
            warn!(
                "PID {}: output limits given as [{}, {}], swapping them",
                self.name, min, max
            );
            self.params.out_min = max;
            self.params.out_max = min;
        } else {
            self.params.out_min = min;
            self.params.out_max = max;
        }
    }

    /// Outputs with a magnitude below `min_magnitude` will be reported as
    /// zero, or as the limit nearest zero if zero is outside the output
    /// limits.
    pub fn set_min_magnitude(&mut self, min_magnitude: f64) {
        self.params.min_magnitude = min_magnitude.abs();
    }

    /// Set a new setpoint.
    ///
    /// The integral and previous error are left untouched so the output does
    /// not jump.
    pub fn set_target(&mut self, target: f64) {
        self.state.target = target;
    }

    /// Get the current setpoint.
    pub fn target(&self) -> f64 {
        self.state.target
    }

    /// Zero the setpoint, integral and previous error.
    pub fn reset(&mut self) {
        self.state = PidState::default();
    }

    /// Run the controller for one tick against the given measurement and
    /// return the demand.
    ///
    /// The returned value is always in `[out_min, out_max]`. If its magnitude
    /// is below `min_magnitude` it is exactly zero, or the limit nearest zero
    /// when zero is outside the limits.
    ///
    /// A non-finite measurement leaves the controller memory untouched and
    /// gives the same output as the deadband.
    pub fn calc(&mut self, measurement: f64) -> f64 {
        let p = &self.params;

        let error = self.calc_error(measurement);
        if !error.is_finite() {
            warn!("PID {}: non-finite error from measurement {}, holding", self.name, measurement);
            return maths::clamp(0.0, p.out_min, p.out_max);
        }

        let deriv = (error - self.state.last_error) / p.dt_s;

        let p_term = p.k_p * error;
        let d_term = p.k_d * deriv;

        // Only accumulate the integral if the output isn't already pinned
        // against the limit the error is pushing it towards.
        let held_out = p_term + p.k_i * self.state.integral + d_term;
        let push = p.k_i * error;
        let saturated = (held_out >= p.out_max && push > 0.0)
            || (held_out <= p.out_min && push < 0.0);

        if !saturated {
            self.state.integral += error * p.dt_s;
        }

        let raw = p_term + p.k_i * self.state.integral + d_term;
        let mut out = maths::clamp(raw, p.out_min, p.out_max);

        // The output limits take precedence over the deadband
        if out.abs() < p.min_magnitude {
            out = maths::clamp(0.0, p.out_min, p.out_max);
        }

        self.state.last_error = error;

        out
    }

    /// Periodic hook for diagnostics, safe to call on every tick whatever
    /// the drive mode.
    pub fn update(&self) {
        trace!(
            "PID {}: target {:.4}, integral {:.4}, last error {:.4}",
            self.name,
            self.state.target,
            self.state.integral,
            self.state.last_error
        );
    }

    /// Error between the target and the measurement, with the sign set by
    /// `reversed` and wrapped if the input is continuous.
    fn calc_error(&self, measurement: f64) -> f64 {
        let error = match self.params.reversed {
            true => measurement - self.state.target,
            false => self.state.target - measurement,
        };

        match self.params.continuous {
            true => maths::wrap_to_half_span(error, self.params.input_max - self.params.input_min),
            false => error,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn drive_pid(k_p: f64, k_i: f64, k_d: f64) -> PidController {
        let mut pid = PidController::new("test", PidParams::from_gains(k_p, k_i, k_d));
        pid.set_output_limits(-0.4, 0.4);
        pid
    }

    #[test]
    fn test_first_calc_proportional() {
        let mut pid = drive_pid(0.1, 0.0, 0.0);
        pid.set_output_limits(-2.0, 2.0);
        pid.set_target(10.0);
        assert_abs_diff_eq!(pid.calc(0.0), 1.0, epsilon = 1e-12);

        let mut pid = drive_pid(0.1, 0.0, 0.0);
        pid.set_target(10.0);
        assert_eq!(pid.calc(0.0), 0.4);
    }

    #[test]
    fn test_output_within_limits() {
        let mut pid = drive_pid(0.7, 0.3, 0.5);
        pid.set_target(25.0);

        let mut meas = -40.0;
        for _ in 0..200 {
            let out = pid.calc(meas);
            assert!(out >= -0.4 && out <= 0.4, "output {} out of range", out);
            meas += 3.7;
            if meas > 60.0 {
                meas = -60.0;
            }
        }
    }

    #[test]
    fn test_min_magnitude() {
        let mut pid = drive_pid(0.01, 0.0, 0.0);
        pid.set_min_magnitude(0.05);
        pid.set_target(4.0);

        // 0.04 is under the threshold
        assert_eq!(pid.calc(0.0), 0.0);

        // 0.06 is not
        pid.set_target(6.0);
        assert_abs_diff_eq!(pid.calc(0.0), 0.06, epsilon = 1e-12);

        // Negative outputs are treated the same
        pid.set_target(-4.0);
        assert_eq!(pid.calc(0.0), 0.0);
    }

    #[test]
    fn test_min_magnitude_with_positive_limits() {
        let mut pid = drive_pid(0.01, 0.0, 0.0);
        pid.set_output_limits(0.1, 0.5);
        pid.set_min_magnitude(0.2);

        // 0.15 is in the deadband, but zero is below the limits
        pid.set_target(15.0);
        assert_eq!(pid.calc(0.0), 0.1);

        pid.set_target(30.0);
        assert_abs_diff_eq!(pid.calc(0.0), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_measurement() {
        let mut pid = drive_pid(0.1, 0.01, 0.1);
        pid.set_target(10.0);
        pid.calc(2.0);
        let before = pid.state();

        for m in &[std::f64::NAN, std::f64::INFINITY, std::f64::NEG_INFINITY] {
            let out = pid.calc(*m);
            assert_eq!(out, 0.0);
            assert_eq!(pid.state(), before);
        }

        // Recovers as soon as the measurement does
        let out = pid.calc(2.0);
        assert!(out.is_finite());
        assert!(out >= -0.4 && out <= 0.4);

        let mut pid = drive_pid(1.0, 0.0, 0.0);
        pid.set_output_limits(0.1, 0.5);
        assert_eq!(pid.calc(std::f64::NAN), 0.1);
    }

    #[test]
    fn test_set_target_keeps_memory() {
        let mut pid = drive_pid(0.0, 0.01, 0.0);
        pid.set_target(3.0);
        pid.calc(0.0);
        pid.calc(1.0);

        let before = pid.state();
        pid.set_target(-12.0);
        let after = pid.state();

        assert_eq!(after.target, -12.0);
        assert_eq!(after.integral, before.integral);
        assert_eq!(after.last_error, before.last_error);
        assert_abs_diff_eq!(after.integral, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut pid = drive_pid(0.1, 0.01, 0.1);
        pid.set_target(8.0);
        pid.calc(1.0);
        pid.calc(2.0);
        assert_ne!(pid.state(), PidState::default());

        pid.reset();
        assert_eq!(pid.state(), PidState::default());
        assert_eq!(pid.target(), 0.0);
    }

    #[test]
    fn test_zero_gains() {
        let mut pid = drive_pid(0.0, 0.0, 0.0);
        pid.set_target(100.0);
        for m in &[0.0, 50.0, -20.0, 100.0] {
            assert_eq!(pid.calc(*m), 0.0);
        }
    }

    #[test]
    fn test_anti_windup() {
        let mut pid = drive_pid(0.0, 0.1, 0.0);
        pid.set_target(10.0);

        // The first tick integrates and saturates the output
        assert_eq!(pid.calc(0.0), 0.4);
        let integral = pid.state().integral;
        assert_abs_diff_eq!(integral, 10.0, epsilon = 1e-12);

        // Sustained saturation must not grow the integral any further
        for _ in 0..50 {
            assert_eq!(pid.calc(0.0), 0.4);
        }
        assert_eq!(pid.state().integral, integral);

        // Once the error reverses the integral unwinds straight away
        let out = pid.calc(20.0);
        assert!(pid.state().integral < integral);
        assert!(out < 0.4);
    }

    #[test]
    fn test_derivative() {
        let mut pid = drive_pid(0.0, 0.0, 0.1);
        pid.set_output_limits(-10.0, 10.0);
        pid.set_target(5.0);

        // First tick sees the whole error as a step from zero
        assert_abs_diff_eq!(pid.calc(0.0), 0.5, epsilon = 1e-12);
        // Error falls from 5 to 3
        assert_abs_diff_eq!(pid.calc(2.0), -0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_reversed() {
        let mut params = PidParams::from_gains(0.1, 0.0, 0.0);
        params.reversed = true;
        let mut pid = PidController::new("rev", params);
        pid.set_target(10.0);
        assert_abs_diff_eq!(pid.calc(0.0), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_continuous() {
        let mut params = PidParams::from_gains(1.0, 0.0, 0.0);
        params.continuous = true;
        params.input_min = -180.0;
        params.input_max = 180.0;
        let mut pid = PidController::new("heading", params);

        // 170 -> -170 is 20 degrees the short way, not -340
        pid.set_target(-170.0);
        assert_abs_diff_eq!(pid.calc(170.0), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inverted_limits_swapped() {
        let mut pid = drive_pid(1.0, 0.0, 0.0);
        pid.set_output_limits(0.3, -0.3);
        assert_eq!(pid.params().out_min, -0.3);
        assert_eq!(pid.params().out_max, 0.3);
        pid.set_target(-5.0);
        assert_eq!(pid.calc(0.0), -0.3);
    }

    #[test]
    fn test_invalid_dt() {
        let mut params = PidParams::from_gains(0.0, 1.0, 0.0);
        params.dt_s = 0.0;
        let mut pid = PidController::new("dt", params);
        pid.set_target(1.0);
        assert_eq!(pid.params().dt_s, 1.0);
        assert_abs_diff_eq!(pid.calc(0.0), 1.0, epsilon = 1e-12);
    }
}
