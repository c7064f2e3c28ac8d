//! # Motor library.
//!
//! Converts signed speed and steering commands into servo pulse widths. The executable and the
//! benchmarks access the controllers through this library.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Calibrated transform - closed-form conversion used in calibrated mode
pub mod calib;

/// Interpolation - fixed-point piecewise linear lookup through a calibration table
pub mod interp;

/// Limits - clamping of input commands per operating mode
pub mod limits;

/// Servo control - pulse width outputs (PCA9685, logging, mock)
pub mod servo_ctrl;

/// Speed control - converts speed commands into motor pulse widths
pub mod speed_ctrl;

/// Steering control - converts steering angles into servo pulse widths
pub mod steer_ctrl;
