//! [`PwmOutput`] implementation which records every write

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{PulseWidth, PwmOutput, ServoError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Output which keeps the full history of writes for later verification.
#[derive(Debug, Default, Clone)]
pub struct MockPwm {
    writes: Vec<PwmWrite>,

    /// When set every write fails with this error.
    fail_with: Option<ServoError>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A single call made on a [`MockPwm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmWrite {
    Period(u32),
    PulseWidth(PulseWidth),
    Raw(u16),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MockPwm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an output on which every write fails.
    pub fn failing(err: ServoError) -> Self {
        Self {
            writes: Vec::new(),
            fail_with: Some(err),
        }
    }

    /// All writes made so far, oldest first.
    pub fn writes(&self) -> &[PwmWrite] {
        &self.writes
    }

    /// The last write made, if any.
    pub fn last(&self) -> Option<PwmWrite> {
        self.writes.last().copied()
    }

    /// The last pulse width written with `set_pulse_width_us`.
    pub fn last_pulse_width(&self) -> Option<PulseWidth> {
        self.writes.iter().rev().find_map(|w| match w {
            PwmWrite::PulseWidth(p) => Some(*p),
            _ => None,
        })
    }

    fn record(&mut self, write: PwmWrite) -> Result<(), ServoError> {
        match self.fail_with {
            Some(e) => Err(e),
            None => {
                self.writes.push(write);
                Ok(())
            }
        }
    }
}

impl PwmOutput for MockPwm {
    fn set_period_ms(&mut self, period_ms: u32) -> Result<(), ServoError> {
        if period_ms == 0 {
            return Err(ServoError::InvalidPeriod(period_ms));
        }
        self.record(PwmWrite::Period(period_ms))
    }

    fn set_pulse_width_us(&mut self, pulse_width: PulseWidth) -> Result<(), ServoError> {
        self.record(PwmWrite::PulseWidth(pulse_width))
    }

    fn write_raw(&mut self, value: u16) -> Result<(), ServoError> {
        self.record(PwmWrite::Raw(value))
    }
}
