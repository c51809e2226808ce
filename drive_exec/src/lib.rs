//! # Drivetrain library.
//!
//! This library holds the drivetrain control modules so that they can be used
//! by the executable, tests and benchmarks.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator interface - the capability through which demands reach the drive motors
pub mod actuator;

/// Data store - owns the drivetrain instance and per-cycle data
pub mod data_store;

/// Drivetrain control module - open loop shaped drive and closed loop distance hold
pub mod drive_ctrl;

/// Encoder feedback - converted and averaged drive encoder readings
pub mod enc_fdbk;

/// Motion shaper - acceleration limits on the drive and turn demands
pub mod motion_shaper;

/// Generic PID controller
pub mod pid_ctrl;

/// Simulated drivetrain - stands in for the motors and encoders off the robot
pub mod sim;

/// Telemetry sinks
pub mod telemetry;
