//! Parameters structure for SteerCtrl

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{
    calib::OperatingMode,
    interp::CalibTable,
    limits::{ControllerLimits, LimitsError},
    servo_ctrl::PulseWidth,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Furthest left angle accepted in calibrated mode.
///
/// Units: tenths of a degree
pub const CALIB_INF_LIMIT: i32 = -250;

/// Furthest right angle accepted in calibrated mode.
///
/// Units: tenths of a degree
pub const CALIB_SUP_LIMIT: i32 = 250;

/// Units: milliseconds
pub const DEFAULT_PERIOD_MS: u32 = 20;

/// Time to wait before the first output write, letting the board's supply settle so the servo
/// doesn't oscillate on power-on.
///
/// Units: milliseconds
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 10_000;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for the steering controller.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- LIMITS ----

    /// Furthest left steering angle.
    ///
    /// Units: tenths of a degree
    pub inf_limit: i32,

    /// Furthest right steering angle.
    ///
    /// Units: tenths of a degree
    pub sup_limit: i32,

    /// Units: tenths of a degree
    #[serde(default = "default_calib_inf_limit")]
    pub calib_inf_limit: i32,

    /// Units: tenths of a degree
    #[serde(default = "default_calib_sup_limit")]
    pub calib_sup_limit: i32,

    // ---- OUTPUT ----

    /// Pulse width written at startup.
    pub neutral_us: PulseWidth,

    /// Units: milliseconds
    #[serde(default = "default_period_ms")]
    pub period_ms: u32,

    /// Units: milliseconds
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,

    // ---- CONVERSION ----

    #[serde(default)]
    pub mode: OperatingMode,

    /// Angle to pulse width breakpoints.
    pub table: CalibTable,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Params {
    /// Build the controller limits, checking neither pair is inverted.
    pub fn limits(&self) -> Result<ControllerLimits, LimitsError> {
        ControllerLimits::new(
            (self.inf_limit, self.sup_limit),
            (self.calib_inf_limit, self.calib_sup_limit),
        )
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_calib_inf_limit() -> i32 {
    CALIB_INF_LIMIT
}

fn default_calib_sup_limit() -> i32 {
    CALIB_SUP_LIMIT
}

fn default_period_ms() -> u32 {
    DEFAULT_PERIOD_MS
}

fn default_startup_delay_ms() -> u64 {
    DEFAULT_STARTUP_DELAY_MS
}
