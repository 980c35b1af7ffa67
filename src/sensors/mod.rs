//! Sensor subsystem — individual drivers and the per-tick snapshot.
//!
//! The boolean sensors (two PIRs and the door contact) are sampled into a
//! [`SensorSnapshot`] each tick.  The ultrasonic distance is measured
//! separately because it is rate-limited and only needed while armed
//! without an entry delay.

pub mod proximity;
pub mod ultrasonic;

/// Distance reported when the ultrasonic sensor has no valid echo
/// (timeout or out of range).  Far beyond any alert threshold.
pub const NO_ECHO_CM: f32 = 400.0;

/// Monotonic microsecond timebase used to time echo pulses.
///
/// Implemented by [`HostClock`](crate::adapters::time::HostClock) on the
/// host and by the simulated ranger's timebase.
pub trait MicrosClock {
    /// Microseconds since an arbitrary fixed origin.
    fn uptime_us(&self) -> u64;
}

/// Which PIR sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionZone {
    /// Outside-facing PIR; armed in both home and away mode.
    Exterior,
    /// Interior PIR; ignored in home mode so occupants can move around.
    Interior,
}

/// A point-in-time snapshot of the boolean sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorSnapshot {
    /// Exterior PIR reports motion.
    pub motion_exterior: bool,
    /// Interior PIR reports motion.
    pub motion_interior: bool,
    /// Door contact reports open.
    pub door_open: bool,
}

impl SensorSnapshot {
    /// True if either PIR reports motion.
    pub fn any_motion(&self) -> bool {
        self.motion_exterior || self.motion_interior
    }
}
