//! # Motor Control Executable
//!
//! This executable drives the speed motor and the steering servo of the car:
//! - One-shot speed, steering and brake commands from the command line
//! - An interactive shell for bench testing the calibration tables
//!
//! On the Raspberry Pi both controllers write to a PCA9685 servo board, on any other host the
//! pulse widths are only logged.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters for the motor executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use rustyline::{error::ReadlineError, Editor};
use structopt::{clap::AppSettings, StructOpt};

// Internal
use motor_lib::{
    calib::PlaceholderTransform,
    servo_ctrl::PwmOutput,
    speed_ctrl::{self, SpeedCtrl},
    steer_ctrl::{self, SteerCtrl},
};
use params::{MotorExecParams, Pca9685Params};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PROMPT: &str = "motor $ ";

const HISTORY_FILE: &str = "repl_history.txt";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(
    name = "motor_exec",
    about = "Speed and steering motor control",
    global_setting = AppSettings::AllowNegativeNumbers
)]
struct Opt {
    /// Parameter file, relative to the params directory.
    #[structopt(long, default_value = "motor_exec.toml")]
    params: String,

    /// Minimum level of log messages, must be at least "info".
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,

    #[structopt(subcommand)]
    cmd: ExecCmd,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
enum ExecCmd {
    /// Apply a single speed command in millimeters/second.
    #[structopt(name = "speed")]
    Speed { value: i32 },

    /// Apply a single steering command in tenths of a degree.
    #[structopt(name = "angle")]
    Angle { value: i32 },

    /// Brake the speed motor.
    #[structopt(name = "brake")]
    Brake,

    /// Start an interactive shell.
    #[structopt(name = "repl")]
    Repl,
}

/// A command entered in the interactive shell.
#[derive(Debug, StructOpt)]
#[structopt(
    name = "motor",
    setting = AppSettings::NoBinaryName,
    global_setting = AppSettings::AllowNegativeNumbers
)]
enum ReplCmd {
    /// Apply a speed command in millimeters/second.
    #[structopt(name = "speed")]
    Speed { value: i32 },

    /// Apply a steering command in tenths of a degree.
    #[structopt(name = "angle")]
    Angle { value: i32 },

    /// Brake the speed motor.
    #[structopt(name = "brake")]
    Brake,

    /// Show a command clamped into the limits of the current mode.
    #[structopt(name = "clamp")]
    Clamp(ClampCmd),

    /// Leave the shell.
    #[structopt(name = "quit")]
    Quit,
}

#[derive(Debug, StructOpt)]
enum ClampCmd {
    #[structopt(name = "speed")]
    Speed { value: i32 },

    #[structopt(name = "angle")]
    Angle { value: i32 },
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("motor_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Motor Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: MotorExecParams = util::params::load(&opt.params)
        .wrap_err_with(|| format!("Failed to load parameters from {}", opt.params))?;
    params.are_valid().wrap_err("Invalid parameters")?;

    info!("Parameters loaded");

    // ---- CONTROLLER INITIALISATION ----

    let (speed_out, steer_out) = init_outputs(&params.pca9685)?;

    let mut speed = init_speed_ctrl(speed_out, &params)?;
    let mut steer = init_steer_ctrl(steer_out, &params)?;

    info!("Initialisation complete");

    // ---- COMMAND EXECUTION ----

    match opt.cmd {
        ExecCmd::Speed { value } => {
            let pwm = speed.set_speed(speed.in_range(value))?;
            println!("{}", pwm);
        }
        ExecCmd::Angle { value } => {
            let pwm = steer.set_angle(steer.in_range(value))?;
            println!("{}", pwm);
        }
        ExecCmd::Brake => speed.set_brake()?,
        ExecCmd::Repl => {
            let history = session.session_root.join(HISTORY_FILE);
            run_repl(&mut speed, &mut steer, &history)?;
        }
    }

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn init_speed_ctrl<O: PwmOutput>(output: O, params: &MotorExecParams) -> Result<SpeedCtrl<O>> {
    let p: speed_ctrl::Params = params.speed.clone();

    let ctrl = if params.use_placeholder_transform {
        let placeholder = PlaceholderTransform {
            neutral: p.neutral_us,
        };
        SpeedCtrl::with_transform(output, p, placeholder)
    } else {
        SpeedCtrl::new(output, p)
    };

    ctrl.wrap_err("Failed to initialise SpeedCtrl")
}

fn init_steer_ctrl<O: PwmOutput>(output: O, params: &MotorExecParams) -> Result<SteerCtrl<O>> {
    let p: steer_ctrl::Params = params.steer.clone();

    let ctrl = if params.use_placeholder_transform {
        let placeholder = PlaceholderTransform {
            neutral: p.neutral_us,
        };
        SteerCtrl::with_transform(output, p, placeholder)
    } else {
        SteerCtrl::new(output, p)
    };

    ctrl.wrap_err("Failed to initialise SteerCtrl")
}

/// Run the interactive shell until `quit`, Ctrl-C or Ctrl-D.
fn run_repl<S, T>(
    speed: &mut SpeedCtrl<S>,
    steer: &mut SteerCtrl<T>,
    history: &std::path::Path,
) -> Result<()>
where
    S: PwmOutput,
    T: PwmOutput,
{
    let mut rl = Editor::<(), rustyline::history::DefaultHistory>::new().wrap_err("Failed to start the shell")?;
    if rl.load_history(history).is_err() {
        info!("No shell history found");
    }

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).wrap_err("Failed to read from the shell"),
        };

        if line.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(line.as_str());

        let cmd = match ReplCmd::from_iter_safe(line.split_whitespace()) {
            Ok(c) => c,
            Err(e) => {
                println!("{}", e.message);
                continue;
            }
        };

        // Controller errors are reported but don't end the session
        let result = match cmd {
            ReplCmd::Speed { value } => speed
                .set_speed(speed.in_range(value))
                .map(|pwm| println!("speed {} -> {}", value, pwm))
                .map_err(|e| e.to_string()),
            ReplCmd::Angle { value } => steer
                .set_angle(steer.in_range(value))
                .map(|pwm| println!("angle {} -> {}", value, pwm))
                .map_err(|e| e.to_string()),
            ReplCmd::Brake => speed
                .set_brake()
                .map(|_| println!("braking"))
                .map_err(|e| e.to_string()),
            ReplCmd::Clamp(ClampCmd::Speed { value }) => {
                println!("{} ({:?})", speed.in_range(value), speed.mode());
                Ok(())
            }
            ReplCmd::Clamp(ClampCmd::Angle { value }) => {
                println!("{} ({:?})", steer.in_range(value), steer.mode());
                Ok(())
            }
            ReplCmd::Quit => break,
        };

        if let Err(e) = result {
            warn!("{}", e);
        }
    }

    if let Err(e) = rl.save_history(history) {
        warn!("Could not save the shell history: {}", e);
    }

    Ok(())
}

#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
fn init_outputs(
    _params: &Pca9685Params,
) -> Result<(motor_lib::servo_ctrl::LogPwm, motor_lib::servo_ctrl::LogPwm)> {
    use motor_lib::servo_ctrl::LogPwm;

    info!("No servo hardware on this host, outputs will only be logged");

    Ok((LogPwm::new("speed"), LogPwm::new("steer")))
}

#[cfg(all(target_arch = "arm", target_os = "linux"))]
fn init_outputs(
    params: &Pca9685Params,
) -> Result<(
    motor_lib::servo_ctrl::Pca9685Output<rppal::i2c::I2c>,
    motor_lib::servo_ctrl::Pca9685Output<rppal::i2c::I2c>,
)> {
    use color_eyre::eyre::eyre;
    use motor_lib::servo_ctrl::{pca9685::channel_from_index, Pca9685Output};
    use pwm_pca9685::{Address, Pca9685};
    use std::{cell::RefCell, rc::Rc};

    let i2c = rppal::i2c::I2c::new().wrap_err("Failed to open the I2C bus")?;

    let mut board = Pca9685::new(i2c, Address::from(params.address))
        .map_err(|e| eyre!("Failed to create the PCA9685 driver: {:?}", e))?;
    board
        .enable()
        .map_err(|e| eyre!("Failed to enable the PCA9685: {:?}", e))?;

    info!("PCA9685 enabled at address {:#04x}", params.address);

    let board = Rc::new(RefCell::new(board));

    let speed_channel = channel_from_index(params.speed_channel)
        .ok_or_else(|| eyre!("Invalid speed channel {}", params.speed_channel))?;
    let steer_channel = channel_from_index(params.steer_channel)
        .ok_or_else(|| eyre!("Invalid steering channel {}", params.steer_channel))?;

    Ok((
        Pca9685Output::new(board.clone(), speed_channel),
        Pca9685Output::new(board, steer_channel),
    ))
}
