//! [`PwmOutput`] implementation for a channel of the PCA9685 driver
//!
//! All 16 channels of a board share one prescaler, so the board is held behind an
//! `Rc<RefCell<_>>` and setting the period on any channel changes it for every channel.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use embedded_hal::blocking::i2c::{Write, WriteRead};
use log::trace;
use pwm_pca9685::{Channel, Pca9685};
use std::{cell::RefCell, rc::Rc};

use super::{PulseWidth, PwmOutput, ServoError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const MAX_PWM: u64 = 4096;

/// Frequency of the PCA9685 internal oscillator.
const OSC_CLOCK_HZ: u64 = 25_000_000;

const MIN_PRESCALE: u64 = 3;
const MAX_PRESCALE: u64 = 255;

/// Period used until `set_period_ms` is called, matching the power-on prescale of 200 Hz.
const DEFAULT_PERIOD_MS: u32 = 5;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A PCA9685 board shared between several channel outputs.
pub type SharedPca9685<I2C> = Rc<RefCell<Pca9685<I2C>>>;

/// A single output channel of a PCA9685 board.
pub struct Pca9685Output<I2C> {
    board: SharedPca9685<I2C>,
    channel: Channel,
    period_ms: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<I2C> Pca9685Output<I2C> {
    /// Wrap one channel of an already enabled board.
    pub fn new(board: SharedPca9685<I2C>, channel: Channel) -> Self {
        Self {
            board,
            channel,
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

impl<I2C, E> PwmOutput for Pca9685Output<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    fn set_period_ms(&mut self, period_ms: u32) -> Result<(), ServoError> {
        let prescale = prescale_for_period(period_ms)?;

        self.board
            .borrow_mut()
            .set_prescale(prescale)
            .map_err(map_pca_err)?;
        self.period_ms = period_ms;

        trace!("PCA9685 prescale set to {} for a {} ms period", prescale, period_ms);

        Ok(())
    }

    fn set_pulse_width_us(&mut self, pulse_width: PulseWidth) -> Result<(), ServoError> {
        let ticks = pulse_width_to_ticks(pulse_width.as_us(), self.period_ms)?;

        self.board
            .borrow_mut()
            .set_channel_on_off(self.channel, 0, ticks)
            .map_err(map_pca_err)
    }

    fn write_raw(&mut self, value: u16) -> Result<(), ServoError> {
        self.set_pulse_width_us(PulseWidth::from_us(value))
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Compute the prescale register value which gives the closest period to `period_ms`.
pub fn prescale_for_period(period_ms: u32) -> Result<u8, ServoError> {
    if period_ms == 0 {
        return Err(ServoError::InvalidPeriod(period_ms));
    }

    let num = OSC_CLOCK_HZ * period_ms as u64;
    let den = MAX_PWM * 1000;
    let prescale = (num + den / 2) / den;

    if prescale < MIN_PRESCALE + 1 || prescale > MAX_PRESCALE + 1 {
        return Err(ServoError::InvalidPeriod(period_ms));
    }

    Ok((prescale - 1) as u8)
}

/// Convert a pulse width into a number of counter ticks for the given period.
pub fn pulse_width_to_ticks(pulse_us: u16, period_ms: u32) -> Result<u16, ServoError> {
    let period_us = period_ms as u64 * 1000;
    if period_us == 0 {
        return Err(ServoError::InvalidPeriod(period_ms));
    }

    let ticks = pulse_us as u64 * MAX_PWM / period_us;

    if ticks >= MAX_PWM {
        return Err(ServoError::InvalidPulseWidth(pulse_us));
    }

    Ok(ticks as u16)
}

/// Look up a PCA9685 channel by its index on the board.
pub fn channel_from_index(index: u8) -> Option<Channel> {
    let channel = match index {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return None,
    };

    Some(channel)
}

fn map_pca_err<E>(err: pwm_pca9685::Error<E>) -> ServoError {
    match err {
        pwm_pca9685::Error::I2C(_) => ServoError::I2c,
        pwm_pca9685::Error::InvalidInputData => ServoError::Rejected,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use pwm_pca9685::Address;

    const PRE_SCALE_REGISTER: u8 = 0xFE;
    const LED0_ON_L_REGISTER: u8 = 0x06;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct BusError;

    /// I2C bus which records every write into a log shared with the test.
    struct RecordingI2c {
        log: Rc<RefCell<Vec<Vec<u8>>>>,
        fail: bool,
    }

    impl Write for RecordingI2c {
        type Error = BusError;

        fn write(&mut self, _address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(BusError);
            }
            self.log.borrow_mut().push(bytes.to_vec());
            Ok(())
        }
    }

    impl WriteRead for RecordingI2c {
        type Error = BusError;

        fn write_read(
            &mut self,
            address: u8,
            bytes: &[u8],
            buffer: &mut [u8],
        ) -> Result<(), Self::Error> {
            self.write(address, bytes)?;
            buffer.iter_mut().for_each(|b| *b = 0);
            Ok(())
        }
    }

    fn board(fail: bool) -> (SharedPca9685<RecordingI2c>, Rc<RefCell<Vec<Vec<u8>>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let i2c = RecordingI2c {
            log: log.clone(),
            fail,
        };
        let board = Pca9685::new(i2c, Address::default()).unwrap();

        (Rc::new(RefCell::new(board)), log)
    }

    #[test]
    fn test_output_writes() -> Result<(), ServoError> {
        let (board, log) = board(false);
        let mut speed = Pca9685Output::new(board.clone(), Channel::C0);
        let mut steer = Pca9685Output::new(board, Channel::C1);

        speed.set_period_ms(20)?;
        assert!(log.borrow().contains(&vec![PRE_SCALE_REGISTER, 121]));

        steer.set_period_ms(20)?;
        steer.set_pulse_width_us(PulseWidth(1500))?;
        assert_eq!(
            log.borrow().last(),
            Some(&vec![LED0_ON_L_REGISTER + 4, 0, 0, 0x33, 0x01])
        );

        // Raw writes are converted like pulse widths
        speed.write_raw(1000)?;
        assert_eq!(
            log.borrow().last(),
            Some(&vec![LED0_ON_L_REGISTER, 0, 0, 0xCC, 0x00])
        );

        // Rejected before reaching the bus
        let writes = log.borrow().len();
        assert_eq!(
            speed.set_pulse_width_us(PulseWidth(20_000)),
            Err(ServoError::InvalidPulseWidth(20_000))
        );
        assert_eq!(log.borrow().len(), writes);

        Ok(())
    }

    #[test]
    fn test_bus_error() {
        let (board, _log) = board(true);
        let mut output = Pca9685Output::new(board, Channel::C3);

        assert_eq!(output.set_period_ms(20), Err(ServoError::I2c));
        assert_eq!(output.set_pulse_width_us(PulseWidth(1500)), Err(ServoError::I2c));
    }

    #[test]
    fn test_map_pca_err() {
        assert_eq!(map_pca_err(pwm_pca9685::Error::I2C(BusError)), ServoError::I2c);
        assert_eq!(
            map_pca_err::<BusError>(pwm_pca9685::Error::InvalidInputData),
            ServoError::Rejected
        );
    }

    #[test]
    fn test_prescale_for_period() {
        // 50 Hz servo frame
        assert_eq!(prescale_for_period(20), Ok(121));
        assert_eq!(prescale_for_period(5), Ok(30));
        assert_eq!(prescale_for_period(0), Err(ServoError::InvalidPeriod(0)));
        assert_eq!(prescale_for_period(100), Err(ServoError::InvalidPeriod(100)));
    }

    #[test]
    fn test_pulse_width_to_ticks() {
        assert_eq!(pulse_width_to_ticks(1500, 20), Ok(307));
        assert_eq!(pulse_width_to_ticks(1000, 20), Ok(204));
        assert_eq!(pulse_width_to_ticks(0, 20), Ok(0));
        assert_eq!(
            pulse_width_to_ticks(20_000, 20),
            Err(ServoError::InvalidPulseWidth(20_000))
        );
        assert_eq!(pulse_width_to_ticks(1500, 0), Err(ServoError::InvalidPeriod(0)));
    }

    #[test]
    fn test_channel_from_index() {
        assert_eq!(channel_from_index(0), Some(Channel::C0));
        assert_eq!(channel_from_index(15), Some(Channel::C15));
        assert_eq!(channel_from_index(16), None);
    }
}
