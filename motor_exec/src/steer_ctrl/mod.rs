//! Steering control module
//!
//! Converts signed steering angle demands into pulse widths for the steering servo. Positive
//! angles steer right, negative angles steer left.

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

/// Possible errors that can occur during SteerCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SteerCtrlError {
    #[error("Invalid steering limits: {0}")]
    InvalidLimits(#[from] LimitsError),

    #[error("Calibrated mode selected but no calibrated transform was supplied")]
    UnimplementedCalibratedTransform,

    #[error("Could not write to the steering output: {0}")]
    Servo(#[from] ServoError),
}
