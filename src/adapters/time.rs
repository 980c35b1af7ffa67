//! Host time adapter.
//!
//! Monotonic milliseconds (and the microsecond timebase for echo timing)
//! come from `std::time::Instant`; calendar time
//! comes from the local system clock through `chrono`, standing in for
//! the battery-backed RTC on the real board.

use std::time::Instant;

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

use crate::app::ports::{ClockPort, WallTime};
use crate::sensors::MicrosClock;

/// Time adapter for the host simulator.
pub struct HostClock {
    start: Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl ClockPort for HostClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn wall_time(&self) -> WallTime {
        to_wall_time(&Local::now())
    }
}

impl MicrosClock for HostClock {
    fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

/// RTC-style breakdown of a calendar instant.  `day` counts from Sunday = 1.
pub fn to_wall_time<Tz: TimeZone>(t: &DateTime<Tz>) -> WallTime {
    WallTime {
        sec: t.second() as u8,
        min: t.minute() as u8,
        hour: t.hour() as u8,
        day: t.weekday().number_from_sunday() as u8,
        date: t.day() as u8,
        month: t.month() as u8,
        year: t.year().clamp(0, i32::from(u16::MAX)) as u16,
    }
}
