//! # Path Emulation Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use ctrl_lib::{
    ctrl::CtrlRunner,
    emulate::{arc, EmulatePath, Params, PathSource},
    params::DrivetrainParams,
    path::Path,
    sim::SimDrivetrain,
    viz::NullPathSink,
};
use util::geom::Pose;

const DT_S: f64 = 0.02;

/// A quarter circle to the left of the given radius, with points 2 inches
/// apart.
fn quarter_circle(radius_in: f64) -> Path {
    let num_points = (radius_in * std::f64::consts::FRAC_PI_2 / 2.0) as usize;

    Path::from_points(
        (0..=num_points)
            .map(|i| {
                let angle = std::f64::consts::FRAC_PI_2 * i as f64 / num_points as f64;
                Pose::new(
                    radius_in * (angle.cos() - 1.0),
                    radius_in * angle.sin(),
                    angle.to_degrees(),
                )
            })
            .collect(),
    )
}

fn emulate_benchmark(c: &mut Criterion) {
    let path = quarter_circle(120.0);
    let params = Params::default();
    let drivetrain = DrivetrainParams::default();

    // ---- Arc fitting alone ----

    let points = path.points().unwrap().to_vec();
    let pose = Pose::new(-1.0, 10.0, 5.0);

    c.bench_function("emulate_arc_fit", |b| {
        b.iter(|| {
            let imm = arc::immediate_path(&points, &pose, pose.heading_deg(), 8, params.immediate_path_size);
            let fitted = arc::fit_arc(&imm);
            arc::wheel_speeds(
                fitted.length_in,
                fitted.turn_deg.to_radians(),
                true,
                false,
                &params,
                &drivetrain,
            )
        })
    });

    // ---- Full controller tick ----

    let results_file = std::env::temp_dir().join("ctrl_exec_bench_emulate.txt");
    let ctrl = EmulatePath::new(params.clone(), drivetrain.clone(), Box::new(NullPathSink))
        .with_source(PathSource::Loaded(path))
        .with_results_file(&results_file);

    // The simulation is never stepped so the vehicle stays at the start and
    // the run never finishes
    let mut sim = SimDrivetrain::new(drivetrain, DT_S);
    let mut runner = CtrlRunner::new(ctrl);
    runner.start(&mut sim);

    c.bench_function("emulate_tick", |b| b.iter(|| runner.step(&mut sim)));

    runner.cancel(&mut sim);
}

criterion_group!(benches, emulate_benchmark);
criterion_main!(benches);
