//! # Drive Cycle Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use drive_lib::{
    drive_ctrl::{DriveCmd, DriveCommand, DriveCtrl, InputData, Params},
    pid_ctrl::PidParams,
    sim::{SimDrivetrain, SimParams},
    telemetry::NullTelemetry,
};
use util::module::State;

fn drive_cycle_benchmark(c: &mut Criterion) {
    // ---- Build a simulated drivetrain ----

    let params = Params {
        drive_pid: PidParams {
            k_p: 0.05,
            k_d: 0.5,
            out_min: -0.4,
            out_max: 0.4,
            ..PidParams::default()
        },
        ..Params::default()
    };

    let sim = SimDrivetrain::new(SimParams::default());
    let (left, right) = sim.encoders();
    let mut dc =
        DriveCtrl::new(params, sim.actuator(), left, right, Box::new(NullTelemetry)).unwrap();

    let accel = InputData {
        cmd: Some(DriveCmd::Accel(DriveCommand::new(0.8, 0.3))),
    };
    let hold = InputData {
        cmd: Some(DriveCmd::HoldDistance),
    };

    // Bench the open loop cycle
    c.bench_function("DriveCtrl::proc::accel", |b| {
        b.iter(|| {
            dc.proc(&accel).unwrap();
            sim.step(0.02);
        })
    });

    dc.drive_distance(1000.0);

    // Bench the closed loop cycle
    c.bench_function("DriveCtrl::proc::hold_distance", |b| {
        b.iter(|| {
            dc.proc(&hold).unwrap();
            sim.step(0.02);
        })
    });
}

criterion_group!(benches, drive_cycle_benchmark);
criterion_main!(benches);
