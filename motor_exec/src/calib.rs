//! # Calibrated Transform
//!
//! In calibrated mode a controller bypasses its table and converts commands with a closed-form
//! transfer function (e.g. a fitted polynomial or spline) supplied at construction. This module
//! defines the contract such a function must satisfy.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::servo_ctrl::PulseWidth;
use util::maths::saturate_u16;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A pure transfer function from a command to a pulse width in microseconds.
///
/// Implementations must be deterministic and total over `i64`. Results outside the range of a
/// [`PulseWidth`] are saturated by the controller.
pub trait CalibratedTransform {
    fn pulse_width_us(&self, command: i64) -> i64;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Transform which always returns the neutral pulse width.
///
/// Stands in for a fitted transform that has not been generated yet, so selecting calibrated mode
/// with it leaves the motor unactuated. It must be chosen explicitly, a controller will not fall
/// back to it on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderTransform {
    pub neutral: PulseWidth,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Selects how a controller converts commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Interpolate the calibration table, clamping with the configured limits.
    Uncalibrated,

    /// Use the calibrated transform, clamping with the calibrated limits.
    Calibrated,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for OperatingMode {
    fn default() -> Self {
        OperatingMode::Uncalibrated
    }
}

impl<F> CalibratedTransform for F
where
    F: Fn(i64) -> i64,
{
    fn pulse_width_us(&self, command: i64) -> i64 {
        self(command)
    }
}

impl CalibratedTransform for PlaceholderTransform {
    fn pulse_width_us(&self, _command: i64) -> i64 {
        self.neutral.as_us() as i64
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Evaluate a transform and saturate the result into a pulse width.
pub fn apply_transform(transform: &dyn CalibratedTransform, command: i32) -> PulseWidth {
    PulseWidth(saturate_u16(transform.pulse_width_us(command as i64)))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
