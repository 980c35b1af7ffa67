//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AlarmService (domain)
//! ```
//!
//! Driven adapters (keypad, sensors, clock, display/buzzer, event log,
//! config storage) implement these traits.  The
//! [`AlarmService`](super::service::AlarmService) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! ## Failure model
//!
//! - Annunciator calls are fire-and-forget.
//! - Sensor reads never fail at the port: drivers map timeouts to "no
//!   detection" or the [`NO_ECHO_CM`](crate::sensors::NO_ECHO_CM) sentinel.
//! - Event-log errors are typed; the journal decides whether to degrade.

use core::fmt;

use crate::config::SystemConfig;
use crate::error::{ConfigError, LogError};
use crate::fsm::context::Indicator;
use crate::keypad::Key;
use crate::sensors::MotionZone;

// ───────────────────────────────────────────────────────────────
// Keypad port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Non-blocking keypad scan.  Debounce is the adapter's job.
pub trait KeypadPort {
    /// At most one newly pressed key, or `None`.
    fn scan(&mut self) -> Option<Key>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Current level of one PIR sensor.
    fn motion(&mut self, zone: MotionZone) -> bool;

    /// Door contact level; `true` = open.
    fn door_open(&mut self) -> bool;

    /// One ultrasonic measurement in cm.  May block for up to ~35 ms;
    /// returns the no-echo sentinel on timeout or an implausible reading.
    fn distance_cm(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Calendar time from the RTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallTime {
    pub sec: u8,
    pub min: u8,
    pub hour: u8,
    /// Day of week, 1–7.
    pub day: u8,
    /// Day of month, 1–31.
    pub date: u8,
    pub month: u8,
    pub year: u16,
}

impl fmt::Display for WallTime {
    /// `YYYY-MM-DD HH:MM:SS`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.date, self.hour, self.min, self.sec
        )
    }
}

pub trait ClockPort {
    /// Monotonic milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Current calendar time.
    fn wall_time(&self) -> WallTime;
}

// ───────────────────────────────────────────────────────────────
// Annunciator port (driven adapter: domain → display / LED / buzzer)
// ───────────────────────────────────────────────────────────────

/// Write-side port for everything the occupant sees or hears.
pub trait AnnunciatorPort {
    /// Replace the status line.
    fn show_status(&mut self, text: &str);

    /// Redraw the clock line.
    fn show_clock(&mut self, time: &WallTime);

    /// Set the RGB status indicator.
    fn set_indicator(&mut self, indicator: Indicator);

    /// Start a tone.  Must not block for the tone's duration.
    fn tone(&mut self, freq_hz: f32, duration_secs: f32);
}

// ───────────────────────────────────────────────────────────────
// Event log port (driven adapter: domain → SD card / file)
// ───────────────────────────────────────────────────────────────

/// Append-only persistent event log.
pub trait EventLogPort {
    /// Prepare the backing store.  Called once at startup.
    fn init(&mut self) -> Result<(), LogError>;

    /// Append one complete, newline-terminated line.
    fn append(&mut self, line: &str) -> Result<(), LogError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting.  Invalid values are
/// rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    /// Load configuration.  [`ConfigError::NotFound`] on first boot.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}
