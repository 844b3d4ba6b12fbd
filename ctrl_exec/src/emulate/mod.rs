//! # Path emulation module
//!
//! Path emulation drives the vehicle back along a previously recorded path.
//! The path is a list of poses a few inches apart. Each cycle:
//!
//! 1. Points which are now beside or behind the vehicle are skipped.
//! 2. The vehicle decides whether to drive forwards or backwards depending
//!    on whether the next point is in front of or behind it.
//! 3. The next few points, prefixed by the vehicle's own position, form the
//!    immediate path, which is approximated by a single arc.
//! 4. If the vehicle has drifted from the path a correction towards a point
//!    further ahead is added to the arc's turn.
//! 5. The arc is converted into left and right wheel speeds, with the speed
//!    limited so the tyres don't slip in the corner.
//!
//! The run finishes once the vehicle reaches the end of the path. The driven
//! trajectory is recorded and published alongside the intended path.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arc;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use state::*;

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        ctrl::{CtrlMode, CtrlRunner},
        params::DrivetrainParams,
        path::Path,
        sim::SimDrivetrain,
        viz::{NullPathSink, PathSink},
    };
    use comms_if::eqpt::drive::{DriveDems, Drivetrain};
    use std::{
        path::PathBuf,
        sync::{Arc, Mutex},
    };
    use util::geom::Pose;

    const DT_S: f64 = 0.02;

    /// Remembers the names of the paths it was sent.
    struct NameSink(Arc<Mutex<Vec<(String, usize)>>>);

    impl PathSink for NameSink {
        fn send_path(&mut self, path: &Path, name: &str) {
            self.0.lock().unwrap().push((name.to_string(), path.len()));
        }
    }

    fn results_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ctrl_exec_test_{}", std::process::id()))
            .join(name)
    }

    fn line_path(num_points: usize, step_in: f64) -> Path {
        Path::from_points(
            (0..num_points)
                .map(|i| Pose::new(0.0, step_in * i as f64, 0.0))
                .collect(),
        )
    }

    fn emulator(params: Params, path: Path, results: &str) -> EmulatePath {
        EmulatePath::new(params, DrivetrainParams::default(), Box::new(NullPathSink))
            .with_source(PathSource::Loaded(path))
            .with_results_file(results_file(results))
    }

    fn velocity(dems: DriveDems) -> (f64, f64) {
        match dems {
            DriveDems::Velocity {
                left_rpm,
                right_rpm,
            } => (left_rpm, right_rpm),
            d => panic!("Expected a velocity demand, got {:?}", d),
        }
    }

    #[test]
    fn test_straight_four_points() {
        let params = Params {
            lookahead_threshold_deg: 0.0,
            max_heading_to_turn_diff_deg: 0.0,
            points_to_skip: 0,
            ..Params::default()
        };
        let path = Path::from_points(vec![
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(0.0, 100.0 / 3.0, 0.0),
            Pose::new(0.0, 200.0 / 3.0, 0.0),
            Pose::new(0.0, 100.0, 0.0),
        ]);

        let mut sim = SimDrivetrain::new(DrivetrainParams::default(), DT_S);
        let mut runner = CtrlRunner::new(emulator(params, path, "straight_four.txt"));

        assert_eq!(runner.start(&mut sim), CtrlMode::Running);
        assert!(sim.velocity_loop_cfg().is_some());
        assert_eq!(runner.controller().point_index(), Some(1));
        assert_eq!(runner.controller().is_forwards(), Some(true));

        let report = runner.step(&mut sim).unwrap();
        assert_eq!(report.point_index, 2);
        assert!(report.is_forwards);
        assert!(!report.should_zero_turn);
        assert!((report.left_rpm - report.right_rpm).abs() < 1e-9);
        assert!(report.left_rpm > 0.0);

        // Finished as soon as the index reaches len - 2
        assert_eq!(runner.mode(), CtrlMode::Finished);
        assert!(sim.last_dems().is_stop());
    }

    #[test]
    fn test_invalid_path_aborts() {
        let mut sim = SimDrivetrain::new(DrivetrainParams::default(), DT_S);
        let mut runner = CtrlRunner::new(emulator(
            Params::default(),
            Path::invalid(),
            "invalid.txt",
        ));

        assert_eq!(runner.start(&mut sim), CtrlMode::Aborted);
        assert!(runner.step(&mut sim).is_none());
        assert_eq!(sim.num_dems(), 0);
        assert!(sim.velocity_loop_cfg().is_none());

        // Missing files are invalid paths too
        let ctrl = EmulatePath::new(
            Params::default(),
            DrivetrainParams::default(),
            Box::new(NullPathSink),
        )
        .with_source(PathSource::File("/this/path/does/not/exist.txt".into()));
        let mut runner = CtrlRunner::new(ctrl);
        assert_eq!(runner.start(&mut sim), CtrlMode::Aborted);
    }

    #[test]
    fn test_follow_straight_path() {
        let path = line_path(41, 5.0);
        let len = path.len();

        let mut sim = SimDrivetrain::new(DrivetrainParams::default(), DT_S);
        let mut runner = CtrlRunner::new(emulator(Params::default(), path, "follow_straight.txt"));
        runner.start(&mut sim);

        let mut last_index = 0;
        for _ in 0..500 {
            let report = match runner.step(&mut sim) {
                Some(r) => r,
                None => break,
            };

            assert!(report.point_index >= last_index);
            assert!(report.point_index <= len - 2);
            assert!(report.is_forwards);
            assert_eq!(report.left_rpm, report.right_rpm);
            assert!(report.left_rpm > 0.0);

            // Once finished the drivetrain has already been stopped
            if runner.mode() == CtrlMode::Running {
                assert_eq!(velocity(sim.last_dems()), (report.left_rpm, report.right_rpm));
            }

            last_index = report.point_index;
            sim.step();
        }

        assert_eq!(runner.mode(), CtrlMode::Finished);
        assert!(sim.last_dems().is_stop());
        assert!(sim.pose().y() > 150.0);
        assert!(sim.pose().x().abs() < 1e-9);

        let driven = Path::load(results_file("follow_straight.txt"));
        assert_eq!(driven.len() as u64, runner.num_ticks() + 1);
    }

    #[test]
    fn test_follow_backwards() {
        let path = line_path(41, -5.0);

        let mut sim = SimDrivetrain::new(DrivetrainParams::default(), DT_S);
        let mut runner = CtrlRunner::new(emulator(Params::default(), path, "follow_backwards.txt"));
        runner.start(&mut sim);
        assert_eq!(runner.controller().is_forwards(), Some(false));

        for _ in 0..500 {
            let report = match runner.step(&mut sim) {
                Some(r) => r,
                None => break,
            };

            assert!(!report.is_forwards);
            assert!(report.left_rpm < 0.0 && report.right_rpm < 0.0);
            sim.step();
        }

        assert_eq!(runner.mode(), CtrlMode::Finished);
        assert!(sim.pose().y() < -150.0);

        // Still facing the same way
        assert!(sim.pose().heading_deg() < 1e-9);
    }

    #[test]
    fn test_initial_direction_from_origin() {
        // Second point at a heading of 300 from the origin, off to the right
        // of +Y, which counts as behind the vehicle
        let path = Path::from_points(
            (0..10)
                .map(|i| Pose::new(8.66 * i as f64, 5.0 * i as f64, 0.0))
                .collect(),
        );
        assert!((Pose::default().heading_to(&path.points().unwrap()[1]) - 300.0).abs() < 0.01);

        let mut sim = SimDrivetrain::new(DrivetrainParams::default(), DT_S);
        let mut runner = CtrlRunner::new(emulator(Params::default(), path, "initial_300.txt"));

        assert_eq!(runner.start(&mut sim), CtrlMode::Running);
        assert_eq!(runner.controller().is_forwards(), Some(false));

        // Second point at a heading of 30 starts forwards
        let path = Path::from_points(
            (0..10)
                .map(|i| Pose::new(-5.0 * i as f64, 8.66 * i as f64, 30.0))
                .collect(),
        );
        let mut runner = CtrlRunner::new(emulator(Params::default(), path, "initial_30.txt"));

        runner.start(&mut sim);
        assert_eq!(runner.controller().is_forwards(), Some(true));
    }

    #[test]
    fn test_follow_quarter_circle() {
        let radius_in = 120.0;
        let num_points = 94;
        let path = Path::from_points(
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
        );
        let len = path.len();
        let end = path.points().unwrap()[len - 1];

        let mut sim = SimDrivetrain::new(DrivetrainParams::default(), DT_S);
        let mut runner = CtrlRunner::new(emulator(Params::default(), path, "quarter_circle.txt"));
        assert_eq!(runner.start(&mut sim), CtrlMode::Running);
        assert_eq!(runner.controller().is_forwards(), Some(true));

        let mut last_index = 0;
        let mut num_left_turns = 0;
        for _ in 0..1000 {
            let report = match runner.step(&mut sim) {
                Some(r) => r,
                None => break,
            };

            assert!(report.point_index >= last_index);
            assert!(report.point_index <= len - 2);
            assert!(report.is_forwards);

            if report.right_rpm > report.left_rpm {
                num_left_turns += 1;
            }

            last_index = report.point_index;
            sim.step();
        }

        assert_eq!(runner.mode(), CtrlMode::Finished);
        assert!(sim.last_dems().is_stop());
        assert!(num_left_turns > 0);
        assert!(sim.true_pose().distance_to(&end) < 36.0);
    }

    #[test]
    fn test_positional_correction_and_skip() {
        // Start well to the right of a path along +Y
        let mut sim = SimDrivetrain::new(DrivetrainParams::default(), DT_S)
            .with_pose(Pose::new(30.0, 0.0, 0.0));
        let mut runner = CtrlRunner::new(emulator(
            Params::default(),
            line_path(20, 5.0),
            "correction.txt",
        ));
        runner.start(&mut sim);

        let report = runner.step(&mut sim).unwrap();

        // Point 1 is more than 75 deg off the direction of travel
        assert_eq!(report.point_index, 2);
        assert!(report.is_forwards);

        // Steers left, back towards the path
        assert!(report.positional_correction_deg > 0.0);
        assert!(report.right_rpm > report.left_rpm);
    }

    #[test]
    fn test_pivot_when_turn_disagrees_with_headings() {
        // Straight points whose recorded heading flips half way along
        let path = Path::from_points(
            (0..20)
                .map(|i| Pose::new(0.0, 5.0 * i as f64, if i < 5 { 0.0 } else { 180.0 }))
                .collect(),
        );

        let mut sim = SimDrivetrain::new(DrivetrainParams::default(), DT_S);
        let mut runner = CtrlRunner::new(emulator(Params::default(), path, "pivot.txt"));
        runner.start(&mut sim);

        let report = runner.step(&mut sim).unwrap();
        assert!((report.heading_change_deg - 180.0).abs() < 1e-9);
        assert!(report.immediate_turn_deg.abs() < 1e-9);
        assert!(report.should_zero_turn);
        assert_eq!(report.left_rpm, report.right_rpm);
    }

    #[test]
    fn test_heading_sensor_fault_reported() {
        let mut sim = SimDrivetrain::new(DrivetrainParams::default(), DT_S);
        sim.set_heading_connected(false);

        let mut runner = CtrlRunner::new(emulator(
            Params::default(),
            line_path(20, 5.0),
            "heading_fault.txt",
        ));
        runner.start(&mut sim);

        let report = runner.step(&mut sim).unwrap();
        assert!(report.heading_sensor_fault);
        assert_eq!(runner.mode(), CtrlMode::Running);
        velocity(sim.last_dems());
    }

    #[test]
    fn test_cancel_publishes_paths() {
        let names = Arc::new(Mutex::new(Vec::new()));
        let ctrl = EmulatePath::new(
            Params::default(),
            DrivetrainParams::default(),
            Box::new(NameSink(names.clone())),
        )
        .with_source(PathSource::Loaded(line_path(30, 5.0)))
        .with_results_file(results_file("cancel.txt"));

        let mut sim = SimDrivetrain::new(DrivetrainParams::default(), DT_S);
        let mut runner = CtrlRunner::new(ctrl);
        runner.start(&mut sim);

        for _ in 0..3 {
            runner.step(&mut sim);
            sim.step();
        }
        runner.cancel(&mut sim);

        assert_eq!(runner.mode(), CtrlMode::Aborted);
        assert!(sim.last_dems().is_stop());
        assert_eq!(runner.controller().point_index(), None);

        // 3 ticks plus the final pose
        let names = names.lock().unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0], (DESIRED_PATH_NAME.to_string(), 30));
        assert_eq!(names[1], (DRIVEN_PATH_NAME.to_string(), 4));
    }
}
