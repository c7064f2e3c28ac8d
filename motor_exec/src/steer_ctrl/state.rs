//! Implementations for the SteerCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use std::{thread, time::Duration};

// Internal
use super::{Params, SteerCtrlError};
use crate::{
    calib::{apply_transform, CalibratedTransform, OperatingMode},
    interp::{interpolate_steer, CalibTable},
    limits::ControllerLimits,
    servo_ctrl::{PulseWidth, PwmOutput},
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Steering control module state
pub struct SteerCtrl<O> {
    output: O,

    table: CalibTable,
    limits: ControllerLimits,
    neutral: PulseWidth,

    mode: OperatingMode,
    transform: Option<Box<dyn CalibratedTransform>>,

    /// The last pulse width written to the output.
    pwm_value: PulseWidth,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl<O> SteerCtrl<O>
where
    O: PwmOutput,
{
    /// Create a steering controller without a calibrated transform.
    ///
    /// Blocks for the configured startup delay before setting the output period and centring the
    /// servo on the neutral pulse width.
    pub fn new(output: O, params: Params) -> Result<Self, SteerCtrlError> {
        Self::build(output, params, None)
    }

    /// Create a steering controller which uses `transform` in calibrated mode.
    pub fn with_transform<T>(output: O, params: Params, transform: T) -> Result<Self, SteerCtrlError>
    where
        T: CalibratedTransform + 'static,
    {
        let transform: Box<dyn CalibratedTransform> = Box::new(transform);
        Self::build(output, params, Some(transform))
    }

    fn build(
        mut output: O,
        params: Params,
        transform: Option<Box<dyn CalibratedTransform>>,
    ) -> Result<Self, SteerCtrlError> {
        let limits = params.limits()?;

        if params.mode == OperatingMode::Calibrated && transform.is_none() {
            return Err(SteerCtrlError::UnimplementedCalibratedTransform);
        }

        if params.startup_delay_ms > 0 {
            info!("Waiting {} ms for the steering supply to settle", params.startup_delay_ms);
            thread::sleep(Duration::from_millis(params.startup_delay_ms));
        }

        output.set_period_ms(params.period_ms)?;
        output.set_pulse_width_us(params.neutral_us)?;

        info!(
            "SteerCtrl initialised in {:?} mode, neutral at {}, {} breakpoints per direction",
            params.mode,
            params.neutral_us,
            params.table.len()
        );
        debug!("SteerCtrl limits: {:?}", limits);

        Ok(Self {
            output,
            table: params.table,
            limits,
            neutral: params.neutral_us,
            mode: params.mode,
            transform,
            pwm_value: params.neutral_us,
        })
    }

    /// Compute the pulse width for an angle without touching the output.
    ///
    /// Unlike the speed controller a zero angle is not special-cased here, it goes through the
    /// table (or transform) like any other angle.
    pub fn compute(&self, angle: i32) -> PulseWidth {
        match (self.mode, &self.transform) {
            (OperatingMode::Calibrated, Some(t)) => apply_transform(t.as_ref(), angle),
            _ => interpolate_steer(&self.table, angle),
        }
    }

    /// Set the steering angle, returning the pulse width written to the output.
    ///
    /// Units: tenths of a degree, positive is right.
    pub fn set_angle(&mut self, angle: i32) -> Result<PulseWidth, SteerCtrlError> {
        let pwm_value = self.compute(angle);

        self.output.set_pulse_width_us(pwm_value)?;
        self.pwm_value = pwm_value;

        trace!("angle {} -> {}", angle, pwm_value);

        Ok(pwm_value)
    }

    /// Clamp an angle into the limits of the current mode.
    pub fn in_range(&self, angle: i32) -> i32 {
        self.limits.in_range(angle, self.mode)
    }

    /// Change the operating mode.
    ///
    /// Switching to calibrated mode fails if no transform was supplied at construction.
    pub fn set_mode(&mut self, mode: OperatingMode) -> Result<(), SteerCtrlError> {
        if mode == OperatingMode::Calibrated && self.transform.is_none() {
            return Err(SteerCtrlError::UnimplementedCalibratedTransform);
        }

        info!("SteerCtrl switching to {:?} mode", mode);
        self.mode = mode;

        Ok(())
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn neutral(&self) -> PulseWidth {
        self.neutral
    }

    pub fn limits(&self) -> &ControllerLimits {
        &self.limits
    }

    /// The last pulse width written to the output.
    pub fn pwm_value(&self) -> PulseWidth {
        self.pwm_value
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
