//! Parameters structure for SpeedCtrl

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

/// Lowest speed accepted in calibrated mode.
///
/// Units: millimeters/second
pub const CALIB_INF_LIMIT: i32 = -500;

/// Highest speed accepted in calibrated mode.
///
/// Units: millimeters/second
pub const CALIB_SUP_LIMIT: i32 = 500;

/// Units: milliseconds
pub const DEFAULT_PERIOD_MS: u32 = 20;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for the speed controller.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- LIMITS ----

    /// Lowest speed command (highest backwards speed).
    ///
    /// Units: millimeters/second
    pub inf_limit: i32,

    /// Highest speed command.
    ///
    /// Units: millimeters/second
    pub sup_limit: i32,

    /// Lowest speed command in calibrated mode.
    ///
    /// Units: millimeters/second
    #[serde(default = "default_calib_inf_limit")]
    pub calib_inf_limit: i32,

    /// Highest speed command in calibrated mode.
    ///
    /// Units: millimeters/second
    #[serde(default = "default_calib_sup_limit")]
    pub calib_sup_limit: i32,

    // ---- OUTPUT ----

    /// Pulse width which leaves the motor unpowered.
    pub neutral_us: PulseWidth,

    /// Period of the output signal.
    ///
    /// Units: milliseconds
    #[serde(default = "default_period_ms")]
    pub period_ms: u32,

    // ---- CONVERSION ----

    /// How speed commands are converted to pulse widths.
    #[serde(default)]
    pub mode: OperatingMode,

    /// Negate speed commands before looking them up in the table, for motors wired backwards.
    #[serde(default)]
    pub reverse_direction: bool,

    /// Speed to pulse width breakpoints.
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
