//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{DriveCmd, DriveCtrlError, Params, DRIVE_PID_NAME};
use crate::actuator::{ActuatorDemand, DifferentialActuator};
use crate::enc_fdbk::{EncoderFeedback, EncoderHardware};
use crate::motion_shaper::{MotionShaper, MotionState};
use crate::pid_ctrl::PidController;
use crate::telemetry::TelemetrySink;
use util::{
    archive::{Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drivetrain control module state.
///
/// There is one of these per robot. It is the only thing allowed to command
/// the drive motors.
pub struct DriveCtrl<A, E>
where
    A: DifferentialActuator,
    E: EncoderHardware,
{
    params: Params,

    shaper: MotionShaper,
    encoders: EncoderFeedback<E>,
    drive_pid: PidController,

    actuator: A,
    telemetry: Box<dyn TelemetrySink>,

    /// Entry point family used most recently
    mode: DriveMode,

    /// Set when a distance target is requested and refreshed each time the
    /// distance controller runs.
    at_target: bool,

    last_demand: Option<ActuatorDemand>,
    last_pid_output: f64,

    /// Whether a demand was sent to the actuator during the current cycle
    issued_this_cycle: bool,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: OutputData,
    arch_output: Archiver,
}

/// Input data to DriveCtrl.
#[derive(Default, Debug, Clone, Copy)]
pub struct InputData {
    /// The entry point to run on this cycle, or `None` to leave the motors
    /// alone.
    pub cmd: Option<DriveCmd>,
}

/// Output data from one DriveCtrl cycle.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct OutputData {
    /// True if a demand was sent to the actuator on this cycle.
    pub issued: bool,

    /// Left side demand last sent to the actuator.
    pub left_dem: f64,

    /// Right side demand last sent to the actuator.
    pub right_dem: f64,

    /// Ramp memory of the drive channel.
    pub drive_speed: f64,

    /// Ramp memory of the turn channel.
    pub turn_speed: f64,

    /// Units: inches
    pub average_dist_in: f64,

    /// Units: inches/second
    pub average_vel_ins: f64,

    /// Units: inches
    pub pid_target_in: f64,

    /// Last output of the distance controller.
    pub pid_output: f64,
}

/// Status report for DriveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Mode at the end of the cycle
    pub mode: DriveMode,

    /// True if an entry point of a different mode was called since the last
    /// report without stopping in between.
    pub mode_switched: bool,

    /// True if the robot is within tolerance of the distance target.
    pub at_target: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The family of entry points last used to drive the robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DriveMode {
    /// Not driving, either never started or stopped.
    Idle,

    /// Driving through the acceleration curves.
    OpenLoop,

    /// Driving to a distance target.
    DistanceHold,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::Idle
    }
}

impl<A, E> DriveCtrl<A, E>
where
    A: DifferentialActuator,
    E: EncoderHardware,
{
    /// Wire the drivetrain up to its hardware.
    ///
    /// The parameters are validated here, so the conversion factor and
    /// limits can be trusted by every cycle afterwards.
    pub fn new(
        params: Params,
        actuator: A,
        left_encoder: E,
        right_encoder: E,
        telemetry: Box<dyn TelemetrySink>,
    ) -> Result<Self, DriveCtrlError> {
        params.are_valid()?;

        let drive_pid = PidController::new(DRIVE_PID_NAME, params.drive_pid);

        let mut dc = Self {
            shaper: MotionShaper::new(params.shaper),
            encoders: EncoderFeedback::new(left_encoder, right_encoder, params.conversion_factor),
            drive_pid,
            actuator,
            telemetry,
            mode: DriveMode::Idle,
            at_target: false,
            last_demand: None,
            last_pid_output: 0.0,
            issued_this_cycle: false,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: OutputData::default(),
            arch_output: Archiver::default(),
            params,
        };

        dc.telemetry
            .put_num("Conversion factor", dc.encoders.conversion_factor());

        debug!("DriveCtrl created with {:#?}", dc.params);

        Ok(dc)
    }

    /// Prepare the drivetrain for a new run.
    ///
    /// Only the distance controller is reset. The acceleration ramps keep
    /// their memory from any previous run.
    pub fn init(&mut self) {
        self.drive_pid.reset();
        info!("DriveCtrl initialised");
    }

    // ---- OPEN LOOP ----

    /// Drive with the given demands passed through the acceleration curves.
    pub fn accel_drive(&mut self, drive: f64, turn: f64) {
        self.enter_mode(DriveMode::OpenLoop);

        let drive = self.shaper.drive_accel_curve(drive);
        let turn = self.shaper.turn_accel_curve(turn);

        self.telemetry.put_num("Drive output", drive);
        self.telemetry.put_num("Turn output", turn);

        // The turn axis of the motors is the opposite way round to the
        // operator's
        self.issue(ActuatorDemand::Arcade { drive, turn: -turn });
    }

    // ---- DISTANCE HOLD ----

    /// Set a distance target `distance_in` inches from where the robot is
    /// now.
    pub fn drive_distance(&mut self, distance_in: f64) {
        self.enter_mode(DriveMode::DistanceHold);

        let current = self.encoders.average_dist();
        self.drive_pid.set_target(current + distance_in);
        self.at_target = self.dist_within_tolerance(current);

        debug!(
            "Distance target set to {:.2} in ({:+.2} in from {:.2} in)",
            self.drive_pid.target(),
            distance_in,
            current
        );
    }

    /// Run the distance controller for this cycle and send its output to the
    /// motors.
    pub fn drive_by_pid(&mut self) {
        self.enter_mode(DriveMode::DistanceHold);

        let output_drive = self.calc_drive();
        // No heading hold, so the robot is only held straight mechanically
        let output_turn = 0.0;

        self.telemetry.put_num("Drive PID output", output_drive);
        self.telemetry.put_num("Turn PID output", output_turn);

        self.issue(ActuatorDemand::Arcade {
            drive: output_drive,
            turn: output_turn,
        });

        self.at_target = self.dist_within_tolerance(self.encoders.average_dist());
    }

    /// Run the distance controller against the current average distance.
    ///
    /// Must be called at most once per cycle.
    pub fn calc_drive(&mut self) -> f64 {
        self.last_pid_output = self.drive_pid.calc(self.encoders.average_dist());
        self.last_pid_output
    }

    /// True if the robot was within tolerance of the distance target the
    /// last time it was checked.
    pub fn is_at_target(&self) -> bool {
        self.at_target
    }

    // ---- COMMON ----

    /// Zero both encoders, together with the distance controller that works
    /// from them.
    pub fn reset_encoders(&mut self) {
        self.encoders.reset();
        self.drive_pid.reset();
    }

    /// Command zero power to both sides.
    ///
    /// The acceleration ramps are brought back to rest as well, so driving
    /// off again ramps up from zero.
    pub fn stop(&mut self) {
        self.set_mode(DriveMode::Idle);
        self.shaper.reset();
        self.issue(ActuatorDemand::Tank {
            left: 0.0,
            right: 0.0,
        });
    }

    /// Periodic diagnostics, safe to call on every cycle.
    pub fn update(&mut self) {
        self.drive_pid.update();
    }

    // ---- ACCESSORS ----

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn motion_state(&self) -> MotionState {
        self.shaper.state()
    }

    pub fn drive_pid(&self) -> &PidController {
        &self.drive_pid
    }

    pub fn encoders(&self) -> &EncoderFeedback<E> {
        &self.encoders
    }

    /// Units: inches
    pub fn average_dist(&self) -> f64 {
        self.encoders.average_dist()
    }

    /// Units: inches/second
    pub fn average_velocity(&self) -> f64 {
        self.encoders.average_velocity()
    }

    /// The last demand sent to the actuator, if any.
    pub fn last_demand(&self) -> Option<ActuatorDemand> {
        self.last_demand
    }

    // ---- PRIVATE ----

    /// Record a change of mode, flagging it if it switches between the open
    /// and closed loop entry points directly.
    fn enter_mode(&mut self, mode: DriveMode) {
        if self.mode != DriveMode::Idle && self.mode != mode {
            warn!(
                "Drive mode changed from {:?} to {:?} without stopping",
                self.mode, mode
            );
            self.report.mode_switched = true;
        }
        self.set_mode(mode);
    }

    fn set_mode(&mut self, mode: DriveMode) {
        if self.mode != mode {
            self.telemetry.put_str("Drive mode", &format!("{:?}", mode));
        }
        self.mode = mode;
    }

    fn dist_within_tolerance(&self, current: f64) -> bool {
        (current - self.drive_pid.target()).abs() <= self.params.at_target_tolerance_in
    }

    fn issue(&mut self, demand: ActuatorDemand) {
        trace!("DriveCtrl demand: {:?}", demand);

        match demand {
            ActuatorDemand::Arcade { drive, turn } => self.actuator.arcade_drive(drive, turn),
            ActuatorDemand::Tank { left, right } => self.actuator.tank_drive(left, right),
        }

        self.last_demand = Some(demand);
        self.issued_this_cycle = true;
    }

    fn make_output(&self) -> OutputData {
        let (left_dem, right_dem) = self
            .last_demand
            .map(|d| d.to_tank())
            .unwrap_or((0.0, 0.0));
        let motion = self.shaper.state();

        OutputData {
            issued: self.issued_this_cycle,
            left_dem,
            right_dem,
            drive_speed: motion.drive_speed,
            turn_speed: motion.turn_speed,
            average_dist_in: self.encoders.average_dist(),
            average_vel_ins: self.encoders.average_velocity(),
            pid_target_in: self.drive_pid.target(),
            pid_output: self.last_pid_output,
        }
    }
}

impl<A, E> State for DriveCtrl<A, E>
where
    A: DifferentialActuator,
    E: EncoderHardware,
{
    type InitData = ();
    type InitError = DriveCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module, setting up its archives in the
    /// session.
    fn init(&mut self, _init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.arch_report = Archiver::from_path(session, "drive_ctrl/status_report.csv")
            .map_err(|e| DriveCtrlError::ArchiveInit(e.to_string()))?;
        self.arch_output = Archiver::from_path(session, "drive_ctrl/output.csv")
            .map_err(|e| DriveCtrlError::ArchiveInit(e.to_string()))?;

        DriveCtrl::init(self);

        Ok(())
    }

    /// Perform cyclic processing of DriveCtrl.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();
        self.issued_this_cycle = false;

        match input_data.cmd {
            Some(DriveCmd::Accel(c)) => self.accel_drive(c.drive, c.turn),
            Some(DriveCmd::DriveDistance { distance_in }) => {
                self.drive_distance(distance_in);
                self.drive_by_pid();
            }
            Some(DriveCmd::HoldDistance) => self.drive_by_pid(),
            Some(DriveCmd::ResetEncoders) => self.reset_encoders(),
            Some(DriveCmd::Stop) => self.stop(),
            None => (),
        }

        self.update();

        self.report.mode = self.mode;
        self.report.at_target = self.at_target;
        self.output = self.make_output();

        trace!(
            "DriveCtrl output: dems ({:.3}, {:.3}), dist {:.2} in",
            self.output.left_dem,
            self.output.right_dem,
            self.output.average_dist_in
        );

        Ok((self.output, self.report))
    }
}

impl<A, E> Archived for DriveCtrl<A, E>
where
    A: DifferentialActuator,
    E: EncoderHardware,
{
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output)?;

        Ok(())
    }
}
