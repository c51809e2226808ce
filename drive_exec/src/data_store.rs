//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};

use crate::{
    actuator::DifferentialActuator,
    drive_ctrl::{self, DriveCtrl, DriveCtrlError},
    enc_fdbk::EncoderHardware,
};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the drivetrain has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    /// DriveCtrl processing returned an error
    DriveCtrlError,

    /// The drive script has no more commands
    EndOfScript,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Data store for the executable.
///
/// Owns the one drivetrain instance. The drivetrain is installed once during
/// initialisation, and any access before then fails with
/// [`DriveCtrlError::NotInitialised`].
pub struct DataStore<A, E>
where
    A: DifferentialActuator,
    E: EncoderHardware,
{
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Elapsed time since the start of the run
    pub run_time_s: f64,

    // Safe mode variables
    /// Determines if the drivetrain is in safe mode.
    pub safe: bool,

    /// Gives the reason for the drivetrain being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // DriveCtrl
    drive_ctrl: Option<DriveCtrl<A, E>>,
    pub drive_ctrl_input: drive_ctrl::InputData,
    pub drive_ctrl_output: drive_ctrl::OutputData,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl<A, E> Default for DataStore<A, E>
where
    A: DifferentialActuator,
    E: EncoderHardware,
{
    fn default() -> Self {
        Self {
            num_cycles: 0,
            run_time_s: 0.0,
            safe: false,
            safe_cause: None,
            drive_ctrl: None,
            drive_ctrl_input: drive_ctrl::InputData::default(),
            drive_ctrl_output: drive_ctrl::OutputData::default(),
            drive_ctrl_status_rpt: drive_ctrl::StatusReport::default(),
            num_consec_cycle_overruns: 0,
        }
    }
}

impl<A, E> DataStore<A, E>
where
    A: DifferentialActuator,
    E: EncoderHardware,
{
    /// Install the drivetrain. Returns the previous one if there was one.
    pub fn install_drive_ctrl(&mut self, dc: DriveCtrl<A, E>) -> Option<DriveCtrl<A, E>> {
        if self.drive_ctrl.is_some() {
            warn!("Replacing the existing DriveCtrl instance");
        }
        self.drive_ctrl.replace(dc)
    }

    /// Get the drivetrain.
    pub fn drive_ctrl(&self) -> Result<&DriveCtrl<A, E>, DriveCtrlError> {
        self.drive_ctrl.as_ref().ok_or(DriveCtrlError::NotInitialised)
    }

    /// Get the drivetrain mutably.
    pub fn drive_ctrl_mut(&mut self) -> Result<&mut DriveCtrl<A, E>, DriveCtrlError> {
        self.drive_ctrl.as_mut().ok_or(DriveCtrlError::NotInitialised)
    }

    /// Puts the drivetrain into safe mode with the given cause, stopping the
    /// motors.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            match self.drive_ctrl.as_mut() {
                Some(dc) => dc.stop(),
                None => warn!("No DriveCtrl to stop"),
            }
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `true` if safe mode is now disabled. To remove safe mode the
    /// provided cause must match the initial reason for safe mode being
    /// enabled.
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> bool {
        if !self.safe {
            return true;
        }

        match self.safe_cause {
            Some(root_cause) if root_cause == cause => {
                self.safe = false;
                self.safe_cause = None;
                info!("Make unsafe requested, root cause match, safe mode disabled");
                true
            }
            _ => false,
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle.
    pub fn cycle_start(&mut self, cycle_period_s: f64) {
        self.drive_ctrl_input = drive_ctrl::InputData::default();
        self.drive_ctrl_output = drive_ctrl::OutputData::default();
        self.drive_ctrl_status_rpt = drive_ctrl::StatusReport::default();

        self.run_time_s = self.num_cycles as f64 * cycle_period_s;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive_ctrl::Params;
    use crate::sim::{SimActuator, SimDrivetrain, SimEncoder, SimParams};
    use crate::telemetry::NullTelemetry;
    use crate::actuator::ActuatorDemand;

    type SimStore = DataStore<SimActuator, SimEncoder>;

    fn install(ds: &mut SimStore) -> SimDrivetrain {
        let sim = SimDrivetrain::new(SimParams::default());
        let (left, right) = sim.encoders();
        let dc = DriveCtrl::new(Params::default(), sim.actuator(), left, right, Box::new(NullTelemetry))
            .unwrap();
        assert!(ds.install_drive_ctrl(dc).is_none());
        sim
    }

    #[test]
    fn test_not_initialised() {
        let mut ds = SimStore::default();
        assert!(matches!(ds.drive_ctrl(), Err(DriveCtrlError::NotInitialised)));
        assert!(matches!(ds.drive_ctrl_mut(), Err(DriveCtrlError::NotInitialised)));

        install(&mut ds);
        assert!(ds.drive_ctrl().is_ok());
    }

    #[test]
    fn test_safe_mode() {
        let mut ds = SimStore::default();
        let sim = install(&mut ds);

        ds.drive_ctrl_mut().unwrap().accel_drive(1.0, 0.0);
        ds.make_safe(SafeModeCause::EndOfScript);

        assert!(ds.safe);
        assert_eq!(
            sim.last_demand(),
            ActuatorDemand::Tank {
                left: 0.0,
                right: 0.0
            }
        );

        assert!(!ds.make_unsafe(SafeModeCause::DriveCtrlError));
        assert!(ds.safe);
        assert!(ds.make_unsafe(SafeModeCause::EndOfScript));
        assert!(!ds.safe);
    }

    #[test]
    fn test_cycle_counting() {
        let mut ds = SimStore::default();
        for _ in 0..5 {
            ds.cycle_start(0.02);
            ds.cycle_end();
        }
        ds.cycle_start(0.02);
        assert_eq!(ds.num_cycles, 5);
        assert!((ds.run_time_s - 0.1).abs() < 1e-12);
    }
}
