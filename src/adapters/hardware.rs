//! Hardware adapter — bridges `embedded-hal` peripherals to domain port traits.
//!
//! [`GpioSensorBank`] owns the two PIR inputs, the door contact and the
//! ultrasonic ranger and exposes them through [`SensorPort`].  The matrix
//! keypad driver is exposed through [`KeypadPort`].  Pin read errors
//! degrade to "no detection"; nothing here returns an error to the core.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use crate::app::ports::{KeypadPort, SensorPort};
use crate::drivers::matrix_keypad::MatrixKeypad;
use crate::keypad::Key;
use crate::sensors::{MicrosClock, MotionZone};
use crate::sensors::ultrasonic::Ultrasonic;

/// Concrete adapter that combines the alarm sensors behind [`SensorPort`].
///
/// PIR outputs and the door contact are active-high (door high = open).
pub struct GpioSensorBank<P, T, E, D, M> {
    pir_exterior: P,
    pir_interior: P,
    door: P,
    ranger: Ultrasonic<T, E, D, M>,
}

impl<P, T, E, D, M> GpioSensorBank<P, T, E, D, M>
where
    P: InputPin,
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    M: MicrosClock,
{
    pub fn new(
        pir_exterior: P,
        pir_interior: P,
        door: P,
        ranger: Ultrasonic<T, E, D, M>,
    ) -> Self {
        Self {
            pir_exterior,
            pir_interior,
            door,
            ranger,
        }
    }

    fn level(pin: &mut P, what: &str) -> bool {
        pin.is_high().unwrap_or_else(|_| {
            debug!("{what}: read failed, treating as inactive");
            false
        })
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P, T, E, D, M> SensorPort for GpioSensorBank<P, T, E, D, M>
where
    P: InputPin,
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    M: MicrosClock,
{
    fn motion(&mut self, zone: MotionZone) -> bool {
        match zone {
            MotionZone::Exterior => Self::level(&mut self.pir_exterior, "pir exterior"),
            MotionZone::Interior => Self::level(&mut self.pir_interior, "pir interior"),
        }
    }

    fn door_open(&mut self) -> bool {
        Self::level(&mut self.door, "door contact")
    }

    fn distance_cm(&mut self) -> f32 {
        self.ranger.distance_cm()
    }
}

// ── KeypadPort implementation ─────────────────────────────────

impl<R, C> KeypadPort for MatrixKeypad<R, C>
where
    R: OutputPin,
    C: InputPin,
{
    fn scan(&mut self) -> Option<Key> {
        self.poll()
    }
}
