//! [`PwmOutput`] implementation for hosts without servo hardware

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use super::{PulseWidth, PwmOutput, ServoError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Output which logs every demand instead of driving a pin.
#[derive(Debug)]
pub struct LogPwm {
    name: String,
    period_ms: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LogPwm {
    /// Create a new logging output, `name` is used to tell outputs apart in the log.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            period_ms: 0,
        }
    }
}

impl PwmOutput for LogPwm {
    fn set_period_ms(&mut self, period_ms: u32) -> Result<(), ServoError> {
        if period_ms == 0 {
            return Err(ServoError::InvalidPeriod(period_ms));
        }
        self.period_ms = period_ms;
        info!("[{}] period: {} ms", self.name, period_ms);
        Ok(())
    }

    fn set_pulse_width_us(&mut self, pulse_width: PulseWidth) -> Result<(), ServoError> {
        let period_us = self.period_ms as u64 * 1000;
        if period_us != 0 && pulse_width.as_us() as u64 >= period_us {
            return Err(ServoError::InvalidPulseWidth(pulse_width.as_us()));
        }
        info!("[{}] pulse width: {}", self.name, pulse_width);
        Ok(())
    }

    fn write_raw(&mut self, value: u16) -> Result<(), ServoError> {
        info!("[{}] raw: {}", self.name, value);
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
