//! Speed control module
//!
//! Converts signed speed demands (millimeters/second, positive forwards) into pulse widths for the
//! brushless motor's ESC.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

use crate::{limits::LimitsError, servo_ctrl::ServoError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SpeedCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SpeedCtrlError {
    #[error("Invalid speed limits: {0}")]
    InvalidLimits(#[from] LimitsError),

    #[error("Calibrated mode selected but no calibrated transform was supplied")]
    UnimplementedCalibratedTransform,

    #[error("Could not write to the speed output: {0}")]
    Servo(#[from] ServoError),
}
