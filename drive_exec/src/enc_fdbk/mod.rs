//! # Encoder feedback module
//!
//! Reads the left and right drive encoders, converts their raw values into
//! physical units and fuses them into a single average for the robot body.
//!
//! The right side encoder is mounted mirrored to the left one, so it counts
//! backwards when the robot drives forwards. All averages invert the right
//! channel to compensate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A single encoder channel as exposed by the hardware.
pub trait EncoderHardware {
    /// Raw accumulated position.
    ///
    /// Units: counts
    fn raw_position(&self) -> f64;

    /// Raw velocity.
    ///
    /// Units: counts/second
    fn raw_velocity(&self) -> f64;

    /// Set the raw accumulated position to zero. Velocity is not affected.
    fn zero_position(&mut self);
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Side of the drivetrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Feedback from both drive encoders.
pub struct EncoderFeedback<E: EncoderHardware> {
    left: E,
    right: E,

    /// Scale from raw counts to physical distance, shared by both channels.
    ///
    /// Units: inches/count
    conversion_factor: f64,
}

/// A snapshot of one encoder channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncoderReading {
    pub side: Side,

    /// Units: counts
    pub raw_position: f64,

    /// Units: counts/second
    pub raw_velocity: f64,

    /// Units: inches/count
    pub conversion_factor: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EncoderReading {
    /// Position in physical units.
    ///
    /// Units: inches
    pub fn position(&self) -> f64 {
        self.raw_position * self.conversion_factor
    }

    /// Velocity in physical units.
    ///
    /// Units: inches/second
    pub fn velocity(&self) -> f64 {
        self.raw_velocity * self.conversion_factor
    }
}

impl<E: EncoderHardware> EncoderFeedback<E> {
    /// Bind the two encoder channels together with their conversion factor.
    pub fn new(left: E, right: E, conversion_factor: f64) -> Self {
        Self {
            left,
            right,
            conversion_factor,
        }
    }

    /// Scale from raw counts to physical distance.
    pub fn conversion_factor(&self) -> f64 {
        self.conversion_factor
    }

    /// Take a snapshot of one channel.
    pub fn reading(&self, side: Side) -> EncoderReading {
        let hw = match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        };

        EncoderReading {
            side,
            raw_position: hw.raw_position(),
            raw_velocity: hw.raw_velocity(),
            conversion_factor: self.conversion_factor,
        }
    }

    /// Distance travelled by the left side.
    ///
    /// Units: inches
    pub fn left_dist(&self) -> f64 {
        self.left.raw_position() * self.conversion_factor
    }

    /// Distance travelled by the right side, as the encoder reports it
    /// (negative when driving forwards).
    ///
    /// Units: inches
    pub fn right_dist(&self) -> f64 {
        self.right.raw_position() * self.conversion_factor
    }

    /// Units: inches/second
    pub fn left_velocity(&self) -> f64 {
        self.left.raw_velocity() * self.conversion_factor
    }

    /// Units: inches/second
    pub fn right_velocity(&self) -> f64 {
        self.right.raw_velocity() * self.conversion_factor
    }

    /// Average distance travelled by the robot, with the right side inverted.
    ///
    /// Units: inches
    pub fn average_dist(&self) -> f64 {
        (self.left_dist() + -self.right_dist()) / 2.0
    }

    /// Average velocity of the robot, with the right side inverted.
    ///
    /// Units: inches/second
    pub fn average_velocity(&self) -> f64 {
        (self.left_velocity() + -self.right_velocity()) / 2.0
    }

    /// Zero the position of both channels.
    ///
    /// Whoever owns a controller closing the loop on these positions must
    /// reset it in the same tick.
    pub fn reset(&mut self) {
        self.left.zero_position();
        self.right.zero_position();
        debug!("Drive encoders zeroed");
    }
}
