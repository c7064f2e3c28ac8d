//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info};
use fern;
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Crates of this workspace, records from these targets (and their modules) are shown down
/// to the requested level.
const WORKSPACE_TARGETS: &[&str] = &["motor_exec", "motor_lib", "util"];

/// Most verbose level shown for records from dependency crates.
const DEPENDENCY_MAX_LEVEL: LevelFilter = LevelFilter::Info;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level less than `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Records are written both to stdout and to the session's log file. `min_level` applies to
/// the workspace crates, so `Trace` shows every command handled by the controllers, while
/// dependency crates are never more verbose than `Info`.
///
/// # Notes
///
/// - `min_level` must be at least as verbose as `log::Level::Info`, so that
///   controller construction messages always reach the log file.
/// 
/// # Safety
/// 
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: self::LevelFilter, 
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    // Setup the logger using fern's builder pattern
    match fern::Dispatch::new()
        .format(|out, message, record| {

            // If debug or trace include the target, otherwise don't include it
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{:10.6} {}] {}: {}",
                    session::get_elapsed_seconds(),
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            }
            else {
                out.finish(format_args!(
                    "[{:10.6} {}] {}",
                    session::get_elapsed_seconds(),
                    level_to_str(record.level()),
                    message
                ))
            }

        })
        .level(min_level)
        .filter(move |meta| meta.level() <= target_level(meta.target(), min_level))
        .chain(std::io::stdout())
        .chain(match fern::log_file(session.log_file_path.clone()) {
            Ok(f) => f,
            Err(e) => return Err(LoggerInitError::LogFileInitError(e))
        })
        .apply() {
            Ok(_) => (),
            Err(e) => return Err(LoggerInitError::FernInitError(e))
        };
    
    info!("Logging initialised");
    info!("    Session epoch: {}", session.epoch);
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The most verbose level shown for records from `target`.
fn target_level(target: &str, min_level: LevelFilter) -> LevelFilter {
    let in_workspace = WORKSPACE_TARGETS.iter().any(|krate| {
        target == *krate
            || target
                .strip_prefix(krate)
                .map_or(false, |module| module.starts_with("::"))
    });

    if in_workspace {
        min_level
    } else {
        min_level.min(DEPENDENCY_MAX_LEVEL)
    }
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_level_to_str() {
        colored::control::set_override(false);

        assert_eq!(level_to_str(log::Level::Trace).to_string(), "TRC");
        assert_eq!(level_to_str(log::Level::Info).to_string(), "INF");
        assert_eq!(level_to_str(log::Level::Error).to_string(), "ERR");
    }

    #[test]
    fn test_target_level() {
        // Controller records follow the requested level
        assert_eq!(
            target_level("motor_lib::speed_ctrl::state", LevelFilter::Trace),
            LevelFilter::Trace
        );
        assert_eq!(
            target_level("motor_lib::steer_ctrl::state", LevelFilter::Trace),
            LevelFilter::Trace
        );
        assert_eq!(target_level("motor_exec", LevelFilter::Debug), LevelFilter::Debug);
        assert_eq!(target_level("util::logger", LevelFilter::Trace), LevelFilter::Trace);

        // Dependencies are capped at info
        assert_eq!(target_level("rustyline::edit", LevelFilter::Trace), LevelFilter::Info);
        assert_eq!(target_level("motor_libx", LevelFilter::Trace), LevelFilter::Info);
        assert_eq!(target_level("pwm_pca9685", LevelFilter::Info), LevelFilter::Info);
    }
}
