//! # Command Limits
//!
//! Each controller carries two pairs of limits on its *input* command: the configured pair used
//! with table interpolation and a calibrated pair used with the calibrated transform. The
//! operating mode selects which pair [`ControllerLimits::in_range`] clamps with.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

use crate::calib::OperatingMode;
use util::maths::clamp;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An inclusive range of accepted commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub inf: i32,
    pub sup: i32,
}

/// The configured and calibrated limits of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerLimits {
    pub configured: Limits,
    pub calibrated: Limits,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LimitsError {
    #[error("Inferior limit ({inf}) is greater than the superior limit ({sup})")]
    Inverted { inf: i32, sup: i32 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Limits {
    pub fn new(inf: i32, sup: i32) -> Result<Self, LimitsError> {
        if inf > sup {
            return Err(LimitsError::Inverted { inf, sup });
        }

        Ok(Self { inf, sup })
    }

    /// Clamp `value` into `[inf, sup]`.
    pub fn clamp(&self, value: i32) -> i32 {
        clamp(&value, &self.inf, &self.sup)
    }
}

impl ControllerLimits {
    /// Build from the two limit pairs, rejecting either if inverted.
    pub fn new(configured: (i32, i32), calibrated: (i32, i32)) -> Result<Self, LimitsError> {
        Ok(Self {
            configured: Limits::new(configured.0, configured.1)?,
            calibrated: Limits::new(calibrated.0, calibrated.1)?,
        })
    }

    /// The limits that apply in the given mode.
    pub fn for_mode(&self, mode: OperatingMode) -> Limits {
        match mode {
            OperatingMode::Uncalibrated => self.configured,
            OperatingMode::Calibrated => self.calibrated,
        }
    }

    /// Clamp a command into the range allowed by `mode`.
    pub fn in_range(&self, value: i32, mode: OperatingMode) -> i32 {
        self.for_mode(mode).clamp(value)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
