//! # Motor Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;

use motor_lib::{calib::OperatingMode, limits::LimitsError, speed_ctrl, steer_ctrl};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of output channels on a PCA9685 board.
const NUM_PCA9685_CHANNELS: u8 = 16;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MotorExecParams {
    /// Speed controller parameters
    pub speed: speed_ctrl::Params,

    /// Steering controller parameters
    pub steer: steer_ctrl::Params,

    /// Allow calibrated mode with a transform that always outputs neutral.
    ///
    /// Without this calibrated mode is rejected, since no fitted transform is available to the
    /// executable.
    #[serde(default)]
    pub use_placeholder_transform: bool,

    /// Servo board wiring, only used on the car.
    pub pca9685: Pca9685Params,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pca9685Params {
    /// I2C address of the board
    pub address: u8,

    /// Channel the motor ESC is connected to
    pub speed_channel: u8,

    /// Channel the steering servo is connected to
    pub steer_channel: u8,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("Invalid speed limits: {0}")]
    SpeedLimits(LimitsError),

    #[error("Invalid steering limits: {0}")]
    SteerLimits(LimitsError),

    #[error("Channel {0} does not exist on the PCA9685")]
    InvalidChannel(u8),

    #[error("Speed and steering share channel {0}")]
    SharedChannel(u8),

    #[error(
        "The {0} controller is in calibrated mode but no calibrated transform is available, set \
        use_placeholder_transform to accept a neutral-only transform"
    )]
    NoCalibratedTransform(&'static str),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotorExecParams {
    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        self.speed.limits().map_err(ParamsError::SpeedLimits)?;
        self.steer.limits().map_err(ParamsError::SteerLimits)?;

        for &channel in &[self.pca9685.speed_channel, self.pca9685.steer_channel] {
            if channel >= NUM_PCA9685_CHANNELS {
                return Err(ParamsError::InvalidChannel(channel));
            }
        }

        if self.pca9685.speed_channel == self.pca9685.steer_channel {
            return Err(ParamsError::SharedChannel(self.pca9685.speed_channel));
        }

        if !self.use_placeholder_transform {
            if self.speed.mode == OperatingMode::Calibrated {
                return Err(ParamsError::NoCalibratedTransform("speed"));
            }
            if self.steer.mode == OperatingMode::Calibrated {
                return Err(ParamsError::NoCalibratedTransform("steering"));
            }
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PARAMS: &str = r#"
        [speed]
        inf_limit = -300
        sup_limit = 300
        neutral_us = 1500

        [speed.table]
        domain_pos = [1, 10, 25]
        domain_neg = [-1, -10, -25]
        output_pos = [1500, 1600, 1700]
        output_neg = [1400, 1300, 1100]

        [steer]
        inf_limit = -200
        sup_limit = 200
        neutral_us = 1500
        startup_delay_ms = 0

        [steer.table]
        domain_pos = [20, 150, 250]
        domain_neg = [-20, -150, -250]
        output_pos = [1520, 1750, 1900]
        output_neg = [1480, 1250, 1100]

        [pca9685]
        address = 0x40
        speed_channel = 0
        steer_channel = 1
    "#;

    fn params() -> MotorExecParams {
        util::params::from_str(PARAMS).unwrap()
    }

    #[test]
    fn test_defaults() {
        let p = params();

        assert_eq!(p.are_valid(), Ok(()));
        assert!(!p.use_placeholder_transform);
        assert!(!p.speed.reverse_direction);
        assert_eq!(p.speed.period_ms, speed_ctrl::DEFAULT_PERIOD_MS);
        assert_eq!(p.speed.calib_sup_limit, speed_ctrl::CALIB_SUP_LIMIT);
        assert_eq!(p.steer.calib_inf_limit, steer_ctrl::CALIB_INF_LIMIT);
        assert_eq!(p.steer.startup_delay_ms, 0);
        assert_eq!(p.steer.mode, OperatingMode::Uncalibrated);
    }

    #[test]
    fn test_default_file() {
        let p: MotorExecParams = util::params::load_from_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../params/motor_exec.toml"
        ))
        .unwrap();

        assert_eq!(p.are_valid(), Ok(()));
        assert_eq!(p.speed.table.len(), 25);
        assert_eq!(p.steer.table.len(), 3);
        assert_eq!(p.pca9685.address, 0x40);
    }

    #[test]
    fn test_are_valid() {
        let mut p = params();
        p.pca9685.steer_channel = 0;
        assert_eq!(p.are_valid(), Err(ParamsError::SharedChannel(0)));

        let mut p = params();
        p.pca9685.speed_channel = 16;
        assert_eq!(p.are_valid(), Err(ParamsError::InvalidChannel(16)));

        let mut p = params();
        p.steer.inf_limit = 300;
        assert_eq!(
            p.are_valid(),
            Err(ParamsError::SteerLimits(LimitsError::Inverted { inf: 300, sup: 200 }))
        );

        let mut p = params();
        p.speed.mode = OperatingMode::Calibrated;
        assert_eq!(p.are_valid(), Err(ParamsError::NoCalibratedTransform("speed")));
        p.use_placeholder_transform = true;
        assert_eq!(p.are_valid(), Ok(()));
    }
}
