//! Host platform (linux for example) utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "MOTOR_SW_ROOT";

/// Get the software root directory from the `MOTOR_SW_ROOT` environment variable.
///
/// Parameter files and session directories are all found relative to this path.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
