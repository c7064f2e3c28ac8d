//! # Servo Output Module
//!
//! This module provides a unified pulse-width output interface which can abstract over the
//! different ways a servo or ESC signal can be generated. The speed and steering controllers only
//! ever write to an output, they never read from it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`PwmOutput`] implementation for a channel of the Adafruit PCA9685 16 channel servo driver.
pub mod pca9685;

/// [`PwmOutput`] implementation which only logs the demanded signal.
pub mod log_pwm;

/// [`PwmOutput`] implementation which records every write, for tests.
pub mod mock;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

pub use log_pwm::LogPwm;
pub use mock::{MockPwm, PwmWrite};
pub use pca9685::Pca9685Output;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for pulse-width outputs.
pub trait PwmOutput {
    /// Set the period of the output signal.
    ///
    /// ## Arguments
    /// - `period_ms` - The period in milliseconds, must be non-zero.
    fn set_period_ms(&mut self, period_ms: u32) -> Result<(), ServoError>;

    /// Set the high time of the output signal.
    ///
    /// Pulse widths longer than the current period are rejected.
    fn set_pulse_width_us(&mut self, pulse_width: PulseWidth) -> Result<(), ServoError>;

    /// Write a value straight to the output without any of the driver's pulse width bookkeeping.
    ///
    /// Used to force the output into a known state (e.g. braking). Drivers whose native unit is
    /// not microseconds convert the value the same way as in `set_pulse_width_us`.
    fn write_raw(&mut self, value: u16) -> Result<(), ServoError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The high time of a pulse-width signal.
///
/// Units: microseconds
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PulseWidth(pub u16);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoError {
    #[error("An I2C error occured")]
    I2c,

    #[error("Pulse width of {0} us does not fit in the output period")]
    InvalidPulseWidth(u16),

    #[error("Output period of {0} ms is not supported by the output")]
    InvalidPeriod(u32),

    #[error("The output driver rejected the demanded register values")]
    Rejected,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PulseWidth {
    /// Create a pulse width from a number of microseconds.
    pub const fn from_us(us: u16) -> Self {
        Self(us)
    }

    /// The pulse width in microseconds.
    pub const fn as_us(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PulseWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} us", self.0)
    }
}
