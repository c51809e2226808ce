//! # Telemetry module
//!
//! Named values published by the drivetrain for display. Publishing is best
//! effort: a sink can never report a failure back to the control loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Destination for named telemetry values.
pub trait TelemetrySink {
    /// Publish a number.
    fn put_num(&mut self, key: &str, value: f64);

    /// Publish a string.
    fn put_str(&mut self, key: &str, value: &str);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Writes telemetry to the log under the `telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetry;

/// Discards all telemetry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetry;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TelemetrySink for LogTelemetry {
    fn put_num(&mut self, key: &str, value: f64) {
        debug!(target: "telemetry", "{}: {:.4}", key, value);
    }

    fn put_str(&mut self, key: &str, value: &str) {
        debug!(target: "telemetry", "{}: {}", key, value);
    }
}

impl TelemetrySink for NullTelemetry {
    fn put_num(&mut self, _key: &str, _value: f64) {}

    fn put_str(&mut self, _key: &str, _value: &str) {}
}
