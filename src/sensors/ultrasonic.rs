//! HC-SR04 ultrasonic ranging driver.
//!
//! A 10 µs trigger pulse starts a measurement; the sensor answers with an
//! echo pulse whose width is the round-trip time of flight.  Both waits
//! are bounded (10 ms for the echo to start, 25 ms for it to end) so a
//! disconnected or blind sensor can never stall the poll loop.
//!
//! ## Timing
//!
//! Both echo phases are timed against an injected [`MicrosClock`], never
//! by counting poll iterations: a pin read plus `delay_us(1)` costs far
//! more than a microsecond on real hardware.  The delay only paces the
//! polling.
//!
//! ## Dual-target design
//!
//! Generic over `embedded-hal` 1.0 pins and delay.  On the host, the
//! simulation pins in [`adapters::sim`](crate::adapters::sim) stand in.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use super::{MicrosClock, NO_ECHO_CM};
use crate::error::SensorError;

/// Max wait for the echo line to go high.
const ECHO_START_TIMEOUT_US: u64 = 10_000;
/// Max echo pulse width (~430 cm round trip).
const ECHO_WIDTH_TIMEOUT_US: u64 = 25_000;
/// Echo polling pace.
const POLL_STEP_US: u32 = 1;
/// Speed of sound, cm per µs (343 m/s).
const SOUND_CM_PER_US: f32 = 0.0343;
/// Plausible range of the HC-SR04.
const MIN_RANGE_CM: f32 = 2.0;
const MAX_RANGE_CM: f32 = 400.0;

pub struct Ultrasonic<T, E, D, M> {
    trig: T,
    echo: E,
    delay: D,
    clock: M,
}

impl<T, E, D, M> Ultrasonic<T, E, D, M>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    M: MicrosClock,
{
    pub fn new(trig: T, echo: E, delay: D, clock: M) -> Self {
        Self {
            trig,
            echo,
            delay,
            clock,
        }
    }

    /// One ranging cycle.  Errors on timeout or an implausible reading.
    pub fn measure(&mut self) -> Result<f32, SensorError> {
        self.pulse_trigger()?;

        let armed = self.clock.uptime_us();
        while !self.echo_high()? {
            if self.clock.uptime_us().saturating_sub(armed) >= ECHO_START_TIMEOUT_US {
                return Err(SensorError::EchoStartTimeout);
            }
            self.delay.delay_us(POLL_STEP_US);
        }

        let rise = self.clock.uptime_us();
        let fall = loop {
            if !self.echo_high()? {
                break self.clock.uptime_us();
            }
            if self.clock.uptime_us().saturating_sub(rise) >= ECHO_WIDTH_TIMEOUT_US {
                return Err(SensorError::EchoWidthTimeout);
            }
            self.delay.delay_us(POLL_STEP_US);
        };

        let width_us = fall.saturating_sub(rise);
        let cm = width_us as f32 * SOUND_CM_PER_US / 2.0;
        if !(MIN_RANGE_CM..=MAX_RANGE_CM).contains(&cm) {
            return Err(SensorError::OutOfRange);
        }
        Ok(cm)
    }

    /// Distance in cm, or [`NO_ECHO_CM`] when no valid echo was seen.
    pub fn distance_cm(&mut self) -> f32 {
        self.measure().unwrap_or_else(|e| {
            debug!("ultrasonic: {e}, reporting no echo");
            NO_ECHO_CM
        })
    }

    pub fn release(self) -> (T, E, D, M) {
        (self.trig, self.echo, self.delay, self.clock)
    }

    fn pulse_trigger(&mut self) -> Result<(), SensorError> {
        self.trig.set_low().map_err(|_| SensorError::GpioWriteFailed)?;
        self.delay.delay_us(2);
        self.trig.set_high().map_err(|_| SensorError::GpioWriteFailed)?;
        self.delay.delay_us(10);
        self.trig.set_low().map_err(|_| SensorError::GpioWriteFailed)
    }

    fn echo_high(&mut self) -> Result<bool, SensorError> {
        self.echo.is_high().map_err(|_| SensorError::GpioReadFailed)
    }
}
