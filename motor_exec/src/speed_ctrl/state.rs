//! Implementations for the SpeedCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};

// Internal
use super::{Params, SpeedCtrlError};
use crate::{
    calib::{apply_transform, CalibratedTransform, OperatingMode},
    interp::{interpolate_speed, CalibTable},
    limits::ControllerLimits,
    servo_ctrl::{PulseWidth, PwmOutput},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Speed control module state
pub struct SpeedCtrl<O> {
    output: O,

    table: CalibTable,
    limits: ControllerLimits,
    neutral: PulseWidth,
    reverse_direction: bool,

    mode: OperatingMode,
    transform: Option<Box<dyn CalibratedTransform>>,

    /// The last pulse width written to the output.
    pwm_value: PulseWidth,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<O> SpeedCtrl<O>
where
    O: PwmOutput,
{
    /// Create a speed controller without a calibrated transform.
    ///
    /// The output's period is set and the motor is put in neutral. Fails if the parameters select
    /// calibrated mode, since there is nothing to compute it with.
    pub fn new(output: O, params: Params) -> Result<Self, SpeedCtrlError> {
        Self::build(output, params, None)
    }

    /// Create a speed controller which uses `transform` in calibrated mode.
    pub fn with_transform<T>(output: O, params: Params, transform: T) -> Result<Self, SpeedCtrlError>
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
    ) -> Result<Self, SpeedCtrlError> {
        let limits = params.limits()?;

        if params.mode == OperatingMode::Calibrated && transform.is_none() {
            return Err(SpeedCtrlError::UnimplementedCalibratedTransform);
        }

        output.set_period_ms(params.period_ms)?;
        output.set_pulse_width_us(params.neutral_us)?;

        info!(
            "SpeedCtrl initialised in {:?} mode, neutral at {}, {} breakpoints per direction",
            params.mode,
            params.neutral_us,
            params.table.len()
        );
        debug!("SpeedCtrl limits: {:?}", limits);

        Ok(Self {
            output,
            table: params.table,
            limits,
            neutral: params.neutral_us,
            reverse_direction: params.reverse_direction,
            mode: params.mode,
            transform,
            pwm_value: params.neutral_us,
        })
    }

    /// Compute the pulse width for a speed without touching the output.
    ///
    /// Never fails and never allocates. Units: millimeters/second.
    pub fn compute(&self, speed: i32) -> PulseWidth {
        let mut pwm_value = self.neutral;

        if speed != 0 {
            pwm_value = match (self.mode, &self.transform) {
                (OperatingMode::Calibrated, Some(t)) => apply_transform(t.as_ref(), speed),
                _ => {
                    let speed = if self.reverse_direction {
                        speed.saturating_neg()
                    } else {
                        speed
                    };
                    interpolate_speed(&self.table, speed, self.neutral)
                }
            };
        }

        pwm_value
    }

    /// Set the speed of the motor, returning the pulse width written to the output.
    ///
    /// Positive speeds are forwards, negative backwards. Units: millimeters/second.
    pub fn set_speed(&mut self, speed: i32) -> Result<PulseWidth, SpeedCtrlError> {
        let pwm_value = self.compute(speed);

        self.output.set_pulse_width_us(pwm_value)?;
        self.pwm_value = pwm_value;

        trace!("speed {} -> {}", speed, pwm_value);

        Ok(pwm_value)
    }

    /// Put the motor into its brake state by writing neutral straight to the output.
    pub fn set_brake(&mut self) -> Result<(), SpeedCtrlError> {
        self.output.write_raw(self.neutral.as_us())?;
        self.pwm_value = self.neutral;

        debug!("Brake applied");

        Ok(())
    }

    /// Clamp a speed into the limits of the current mode.
    pub fn in_range(&self, speed: i32) -> i32 {
        self.limits.in_range(speed, self.mode)
    }

    /// Change the operating mode.
    ///
    /// Switching to calibrated mode fails if no transform was supplied at construction.
    pub fn set_mode(&mut self, mode: OperatingMode) -> Result<(), SpeedCtrlError> {
        if mode == OperatingMode::Calibrated && self.transform.is_none() {
            return Err(SpeedCtrlError::UnimplementedCalibratedTransform);
        }

        info!("SpeedCtrl switching to {:?} mode", mode);
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

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
