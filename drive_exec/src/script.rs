//! # Drive script
//!
//! Steps through the commands given in the executable parameters, producing
//! the DriveCtrl input for each cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use log::info;

use crate::params::ScriptStep;
use drive_lib::drive_ctrl::DriveCmd;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct ScriptRunner {
    pending: VecDeque<ScriptStep>,

    /// Step being executed, and the number of cycles it has left
    current: Option<(ScriptStep, u64)>,

    cycle_period_s: f64,
}

/// What the script wants done on a cycle.
#[derive(Debug, PartialEq)]
pub enum PendingCmd {
    /// Run DriveCtrl with this command, or with no command
    Cmd(Option<DriveCmd>),

    /// There are no steps left
    EndOfScript,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ScriptRunner {
    pub fn new(steps: &[ScriptStep], cycle_period_s: f64) -> Self {
        Self {
            pending: steps.iter().copied().collect(),
            current: None,
            cycle_period_s,
        }
    }

    /// Total duration of the steps not yet started.
    ///
    /// Units: seconds
    pub fn remaining_duration_s(&self) -> f64 {
        self.pending.iter().map(|s| s.duration_s).sum()
    }

    /// Get the command for the next cycle.
    pub fn next_cmd(&mut self) -> PendingCmd {
        // Carry on with the current step if it has cycles left
        if let Some((step, cycles_left)) = self.current.as_mut() {
            if *cycles_left > 0 {
                *cycles_left -= 1;
                return PendingCmd::Cmd(step.cmd.continuation());
            }
        }

        match self.pending.pop_front() {
            Some(step) => {
                info!("Script step: {:?} for {:.2} s", step.cmd, step.duration_s);
                let cycles_left = step.num_cycles(self.cycle_period_s) - 1;
                self.current = Some((step, cycles_left));
                PendingCmd::Cmd(Some(step.cmd))
            }
            None => {
                self.current = None;
                PendingCmd::EndOfScript
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use drive_lib::drive_ctrl::DriveCommand;

    #[test]
    fn test_runner() {
        let steps = [
            ScriptStep {
                duration_s: 0.06,
                cmd: DriveCmd::Accel(DriveCommand::new(0.5, 0.0)),
            },
            ScriptStep {
                duration_s: 0.0,
                cmd: DriveCmd::ResetEncoders,
            },
            ScriptStep {
                duration_s: 0.04,
                cmd: DriveCmd::DriveDistance { distance_in: 12.0 },
            },
        ];
        let mut runner = ScriptRunner::new(&steps, 0.02);

        let accel = DriveCmd::Accel(DriveCommand::new(0.5, 0.0));
        for _ in 0..3 {
            assert_eq!(runner.next_cmd(), PendingCmd::Cmd(Some(accel)));
        }

        // Zero length steps still run once
        assert_eq!(runner.next_cmd(), PendingCmd::Cmd(Some(DriveCmd::ResetEncoders)));

        assert_eq!(
            runner.next_cmd(),
            PendingCmd::Cmd(Some(DriveCmd::DriveDistance { distance_in: 12.0 }))
        );
        assert_eq!(runner.next_cmd(), PendingCmd::Cmd(Some(DriveCmd::HoldDistance)));
        assert_eq!(runner.next_cmd(), PendingCmd::EndOfScript);
    }
}
