//! # Motion shaper module
//!
//! Ramp limiter for the drive and turn channels. Each tick the demand on a
//! channel moves towards the requested target by at most one acceleration
//! step, and snaps onto the target once it is within a step of it.
//!
//! The two channels differ in where their magnitude limit is applied. The
//! drive target is clamped before stepping, so the ramp never heads past
//! `drive_max`. The turn demand is clamped after stepping, so a request
//! beyond `turn_max` ramps up to the limit and is then clipped.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
pub use params::*;
use util::maths;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Slack allowed when deciding whether the demand is within one step of the
/// target, so that accumulated rounding doesn't cost an extra tiny step.
///
/// A snap can therefore move the demand by up to `accel + SNAP_TOLERANCE` in
/// one tick.
const SNAP_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Ramp limiter for both drive channels.
#[derive(Debug, Clone, Default)]
pub struct MotionShaper {
    params: ShaperParams,
    state: MotionState,
}

/// The demands most recently produced by the shaper. These are the starting
/// point of the next tick's ramp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MotionState {
    pub drive_speed: f64,
    pub turn_speed: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionShaper {
    /// Create a new shaper with both channels at rest.
    pub fn new(params: ShaperParams) -> Self {
        Self {
            params,
            state: MotionState::default(),
        }
    }

    pub fn params(&self) -> &ShaperParams {
        &self.params
    }

    /// Current ramp memory.
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Bring both channels back to rest, so the next demand ramps up from
    /// zero.
    pub fn reset(&mut self) {
        self.state = MotionState::default();
    }

    /// Step the drive demand towards `target` and return the demand allowed
    /// on this tick.
    ///
    /// Must be called at most once per tick.
    pub fn drive_accel_curve(&mut self, target: f64) -> f64 {
        let target = maths::clamp_abs(target, self.params.drive_max);

        self.state.drive_speed = step_toward(
            self.state.drive_speed,
            target,
            self.params.drive_accel,
        );

        trace!("Drive ramp: target {:.3}, demand {:.3}", target, self.state.drive_speed);

        self.state.drive_speed
    }

    /// Step the turn demand towards `target` and return the demand allowed
    /// on this tick.
    ///
    /// Must be called at most once per tick.
    pub fn turn_accel_curve(&mut self, target: f64) -> f64 {
        let stepped = step_toward(self.state.turn_speed, target, self.params.turn_accel);

        self.state.turn_speed = if stepped >= 0.0 {
            stepped.min(self.params.turn_max)
        } else {
            stepped.max(-self.params.turn_max)
        };

        trace!("Turn ramp: target {:.3}, demand {:.3}", target, self.state.turn_speed);

        self.state.turn_speed
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Move `current` towards `target` by exactly `step`, or onto `target` if it
/// is no more than one step (plus `SNAP_TOLERANCE`) away.
fn step_toward(current: f64, target: f64, step: f64) -> f64 {
    if (current - target).abs() > step + SNAP_TOLERANCE {
        if current > target {
            current - step
        } else {
            current + step
        }
    } else {
        target
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_drive_ramp_to_half() {
        let mut shaper = MotionShaper::new(ShaperParams::default());
        let mut prev = 0.0;

        for tick in 1..=10 {
            let out = shaper.drive_accel_curve(0.5);
            assert!(out - prev <= 0.05 + 1e-12, "tick {} stepped {}", tick, out - prev);
            assert!(out >= prev && out <= 0.5);
            prev = out;
        }

        assert_eq!(shaper.state().drive_speed, 0.5);
        assert_eq!(shaper.drive_accel_curve(0.5), 0.5);
    }

    #[test]
    fn test_drive_target_clamped_first() {
        let mut shaper = MotionShaper::new(ShaperParams::default());

        // Way beyond the limit, the ramp still stops dead on the limit
        for _ in 0..100 {
            let out = shaper.drive_accel_curve(7.0);
            assert!(out <= 1.0);
        }
        assert_eq!(shaper.state().drive_speed, 1.0);

        for _ in 0..100 {
            let out = shaper.drive_accel_curve(-3.0);
            assert!(out >= -1.0);
        }
        assert_eq!(shaper.state().drive_speed, -1.0);
    }

    #[test]
    fn test_drive_converges_without_overshoot() {
        let starts_targets = [(0.0, 0.73), (0.4, -0.9), (-1.0, 1.0), (0.2, 0.21)];

        for (start, target) in starts_targets.iter() {
            let mut shaper = MotionShaper::new(ShaperParams::default());

            // Ramp up to the start point first
            while shaper.state().drive_speed != *start {
                shaper.drive_accel_curve(*start);
            }

            let max_ticks = ((target - start).abs() / 0.05).ceil() as usize;
            let mut ticks = 0;
            while shaper.state().drive_speed != *target {
                let before = shaper.state().drive_speed;
                let out = shaper.drive_accel_curve(*target);

                // Monotonic approach
                assert!((target - out).abs() <= (target - before).abs());
                assert!((out - before).abs() <= 0.05 + 1e-12);
                ticks += 1;
                assert!(ticks <= max_ticks, "took more than {} ticks", max_ticks);
            }
        }
    }

    #[test]
    fn test_turn_ramp_reverse() {
        let mut shaper = MotionShaper::new(ShaperParams::default());

        // Get up to 0.3 first
        for _ in 0..5 {
            shaper.turn_accel_curve(0.3);
        }
        assert_eq!(shaper.state().turn_speed, 0.3);

        let mut prev = 0.3;
        let mut ticks = 0;
        while shaper.state().turn_speed != -0.3 {
            let out = shaper.turn_accel_curve(-0.3);
            assert!(out >= -0.5 && out <= 0.5);
            assert!(prev - out <= 0.06 + 1e-12);
            assert!(out < prev);
            prev = out;
            ticks += 1;
            assert!(ticks <= 10);
        }
        assert_eq!(shaper.state().turn_speed, -0.3);
    }

    #[test]
    fn test_turn_clamped_after_step() {
        let params = ShaperParams {
            turn_accel: 0.2,
            ..ShaperParams::default()
        };
        let mut shaper = MotionShaper::new(params);

        // 0.2, 0.4, then 0.6 is clipped back to the limit
        assert_abs_diff_eq!(shaper.turn_accel_curve(0.9), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(shaper.turn_accel_curve(0.9), 0.4, epsilon = 1e-12);
        assert_eq!(shaper.turn_accel_curve(0.9), 0.5);
        assert_eq!(shaper.turn_accel_curve(0.9), 0.5);

        // Within a step of an out-of-range target the snap is clipped too
        let mut shaper = MotionShaper::new(params);
        for _ in 0..3 {
            shaper.turn_accel_curve(-0.55);
        }
        assert_eq!(shaper.turn_accel_curve(-0.55), -0.5);
    }

    #[test]
    fn test_turn_always_bounded() {
        let mut shaper = MotionShaper::new(ShaperParams::default());
        let targets = [2.0, -5.0, 0.49, 0.51, -0.51, 100.0, 0.0, -0.2];

        for t in targets.iter() {
            for _ in 0..30 {
                let out = shaper.turn_accel_curve(*t);
                assert!(out.abs() <= 0.5);
            }
        }
    }

    #[test]
    fn test_channels_independent() {
        let mut shaper = MotionShaper::new(ShaperParams::default());
        shaper.drive_accel_curve(1.0);
        assert_eq!(shaper.state().turn_speed, 0.0);
        shaper.turn_accel_curve(-1.0);
        assert_abs_diff_eq!(shaper.state().drive_speed, 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(shaper.state().turn_speed, -0.06, epsilon = 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut shaper = MotionShaper::new(ShaperParams::default());
        for _ in 0..20 {
            shaper.drive_accel_curve(1.0);
            shaper.turn_accel_curve(1.0);
        }

        shaper.reset();
        assert_eq!(shaper.state(), MotionState::default());
        assert_abs_diff_eq!(shaper.drive_accel_curve(1.0), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_snap_step_bound() {
        let mut shaper = MotionShaper::new(ShaperParams::default());

        // Just over one step away snaps onto the target
        let target = 0.05 + 5e-10;
        assert_eq!(shaper.drive_accel_curve(target), target);
        assert!(target <= 0.05 + SNAP_TOLERANCE);

        // Further than the tolerance takes a normal step
        shaper.reset();
        assert_abs_diff_eq!(shaper.drive_accel_curve(0.05 + 1e-6), 0.05, epsilon = 1e-12);
    }
}
