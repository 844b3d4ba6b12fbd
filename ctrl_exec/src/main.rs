//! Main motion control executable entry point.
//!
//! # Architecture
//!
//! The executable runs a single controller, selected on the command line,
//! against the simulated hardware:
//!
//!     - Initialise the session and logging
//!     - Load parameters
//!     - Start the controller
//!     - Main loop, at a fixed period:
//!         - Controller tick and finish check
//!         - Hardware simulation step
//!     - Save the status reports into the session
//!
//! The run is cancelled, zeroing all outputs, if it exceeds the configured
//! maximum number of cycles.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::path::{Path as FsPath, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use ctrl_lib::{
    aim_hold::{self, AimHold},
    ctrl::{CtrlMode, CtrlRunner},
    drive_dist::{self, DriveDist, DriveDistTarget},
    emulate::{self, EmulatePath},
    params::{CtrlExecParams, DrivetrainParams},
    sim::{SimDrivetrain, SimTurret},
    viz::{NullPathSink, PathSink, SessionPathSink},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Yaw speed of the simulated turret at full output.
const SIM_TURRET_YAW_RATE_TPS: f64 = 4000.0;

/// Pitch speed of the simulated turret at full output.
const SIM_TURRET_PITCH_RATE_TPS: f64 = 100.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "ctrl_exec", about = "Run a motion controller")]
struct Opt {
    /// Minimum level of log messages, at least `info`.
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,

    #[structopt(subcommand)]
    cmd: Command,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
enum Command {
    /// Follow a recorded path.
    #[structopt(name = "emulate")]
    Emulate {
        /// Path file to follow, defaults to the one in `emulate.toml`.
        #[structopt(long, parse(from_os_str))]
        path: Option<PathBuf>,
    },

    /// Drive a distance in a straight line.
    #[structopt(name = "drive")]
    Drive {
        /// Distance to drive in inches, defaults to the test distance in
        /// `drive_dist.toml`.
        #[structopt(long, allow_hyphen_values = true)]
        distance: Option<f64>,

        /// Output limit between 0 and 1.
        #[structopt(long, default_value = "0.5")]
        power: f64,

        /// Heading to hold in degrees, defaults to the heading at the start.
        #[structopt(long, allow_hyphen_values = true)]
        heading: Option<f64>,
    },

    /// Hold the turret at a position.
    #[structopt(name = "aim")]
    Aim {
        /// Yaw target in ticks, defaults to the target for the start offset
        /// in `aim_hold.toml`.
        #[structopt(long, allow_hyphen_values = true)]
        yaw: Option<i32>,

        /// Pitch target in ticks.
        #[structopt(long, allow_hyphen_values = true)]
        pitch: i32,

        /// Finish as soon as the vision sensor is aligned with the target.
        #[structopt(long)]
        cancelable: bool,
    },
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Motion Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let sw_root = host::get_sw_root().wrap_err("Could not get the software root")?;

    let exec_params: CtrlExecParams =
        params::load_or_default("ctrl_exec.toml").wrap_err("Could not load exec params")?;
    let drivetrain_params: DrivetrainParams = params::load_or_default("drivetrain.toml")
        .wrap_err("Could not load drivetrain params")?;

    info!("Exec parameters loaded");

    // ---- RUN ----

    let mode = match opt.cmd {
        Command::Emulate { path } => {
            let mut emulate_params: emulate::Params = params::load_or_default("emulate.toml")
                .wrap_err("Could not load emulate params")?;

            let path_file = path.unwrap_or_else(|| emulate_params.path_file.clone());
            emulate_params.path_file = resolve(&sw_root, &path_file);
            emulate_params.results_file = resolve(&sw_root, &emulate_params.results_file);

            let viz: Box<dyn PathSink> = match session.saver() {
                Some(s) => Box::new(SessionPathSink::new(s)),
                None => Box::new(NullPathSink),
            };

            let ctrl = EmulatePath::new(emulate_params, drivetrain_params.clone(), viz);

            let mut sim = SimDrivetrain::new(drivetrain_params, exec_params.cycle_period_s);
            let mut runner = CtrlRunner::new(ctrl);
            let mut reports = Vec::new();

            runner.start(&mut sim);
            run_cycles(&exec_params, || match runner.step(&mut sim) {
                Some(r) => {
                    reports.push(r);
                    sim.step();
                    true
                }
                None => false,
            });
            runner.cancel(&mut sim);

            session.save("reports/emulate.json", reports);
            runner.mode()
        }
        Command::Drive {
            distance,
            power,
            heading,
        } => {
            let dd_params: drive_dist::Params = params::load_or_default("drive_dist.toml")
                .wrap_err("Could not load drive_dist params")?;

            let target = match (distance, heading) {
                (Some(d), Some(h)) => DriveDistTarget::with_heading(d, power, h, 1.0),
                (Some(d), None) => DriveDistTarget::new(d, power),
                (None, _) => DriveDistTarget::from_params(&dd_params),
            };

            let ctrl = DriveDist::new(
                dd_params,
                drivetrain_params.clone(),
                target,
                exec_params.cycle_period_s,
            );

            let mut sim = SimDrivetrain::new(drivetrain_params, exec_params.cycle_period_s);
            let mut runner = CtrlRunner::new(ctrl);
            let mut reports = Vec::new();

            runner.start(&mut sim);
            run_cycles(&exec_params, || match runner.step(&mut sim) {
                Some(r) => {
                    reports.push(r);
                    sim.step();
                    true
                }
                None => false,
            });
            runner.cancel(&mut sim);

            session.save("reports/drive_dist.json", reports);
            runner.mode()
        }
        Command::Aim {
            yaw,
            pitch,
            cancelable,
        } => {
            let aim_params: aim_hold::Params = params::load_or_default("aim_hold.toml")
                .wrap_err("Could not load aim_hold params")?;

            let yaw = yaw.unwrap_or_else(|| {
                aim_hold::yaw_ticks_to_target(aim_params.start_offset_in, &aim_params)
            });

            let ctrl = if cancelable {
                AimHold::cancelable(&aim_params, yaw, pitch, exec_params.cycle_period_s)
            }
            else {
                AimHold::new(&aim_params, yaw, pitch, exec_params.cycle_period_s)
            };

            let mut sim = SimTurret::new(
                exec_params.cycle_period_s,
                SIM_TURRET_YAW_RATE_TPS,
                SIM_TURRET_PITCH_RATE_TPS,
            );
            let mut runner = CtrlRunner::new(ctrl);
            let mut reports = Vec::new();

            runner.start(&mut sim);
            run_cycles(&exec_params, || match runner.step(&mut sim) {
                Some(r) => {
                    reports.push(r);
                    sim.step();
                    true
                }
                None => false,
            });
            runner.cancel(&mut sim);

            session.save("reports/aim_hold.json", reports);
            runner.mode()
        }
    };

    match mode {
        CtrlMode::Finished => info!("Controller finished"),
        m => warn!("Controller ended in {:?} mode", m),
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Run `cycle` at the configured period until it returns false or the cycle
/// limit is reached. Returns the number of cycles run.
fn run_cycles<F: FnMut() -> bool>(exec_params: &CtrlExecParams, mut cycle: F) -> u64 {
    let period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let mut num_cycles = 0u64;

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        if !cycle() {
            break;
        }

        num_cycles += 1;

        if exec_params.max_cycles > 0 && num_cycles >= exec_params.max_cycles {
            warn!("Cycle limit of {} reached", exec_params.max_cycles);
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - period.as_secs_f64()
            ),
        }
    }

    info!("Main loop exited after {} cycles", num_cycles);

    num_cycles
}

/// Resolve a path relative to the software root.
fn resolve(sw_root: &FsPath, path: &FsPath) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    }
    else {
        sw_root.join(path)
    }
}
