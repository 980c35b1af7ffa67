//! System configuration parameters
//!
//! All tunable parameters for the HomeGuard controller.
//! Values can be overridden from the JSON config file on the host build
//! (see [`adapters::config_store`](crate::adapters::config_store)).

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Length of the provisioned access code.
pub const CODE_LEN: usize = 4;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Access ---
    /// Provisioned 4-digit access code
    pub access_code: String<CODE_LEN>,

    // --- Entry delay ---
    /// Grace period from door-open (away mode) to forced alarm (seconds)
    pub entry_delay_secs: u32,

    // --- Proximity ---
    /// Distance (cm) below which the proximity latch enters the alert zone
    pub proximity_enter_cm: f32,
    /// Distance (cm) above which the proximity latch clears
    pub proximity_clear_cm: f32,
    /// Minimum spacing between two ultrasonic alerts (milliseconds)
    pub proximity_alert_interval_ms: u32,
    /// Minimum spacing between two distance measurements (milliseconds)
    pub min_measure_interval_ms: u32,

    // --- Timing ---
    /// Poll loop interval (milliseconds)
    pub poll_interval_ms: u32,
    /// Clock line refresh interval (milliseconds)
    pub clock_refresh_ms: u32,
    /// How long a transient notice stays before the status is restored (milliseconds)
    pub notice_duration_ms: u32,
    /// Alarm flash / siren toggle period (milliseconds)
    pub alarm_pattern_period_ms: u32,

    // --- Event log ---
    /// Path of the append-only event log (host build)
    pub event_log_path: std::string::String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut access_code = String::new();
        // "2580" is exactly CODE_LEN bytes.
        let _ = access_code.push_str("2580");

        Self {
            access_code,

            // Entry delay
            entry_delay_secs: 30,

            // Proximity
            proximity_enter_cm: 10.0,
            proximity_clear_cm: 12.0,
            proximity_alert_interval_ms: 1000,
            min_measure_interval_ms: 60,

            // Timing
            poll_interval_ms: 50,         // 20 Hz
            clock_refresh_ms: 1000,       // 1 Hz
            notice_duration_ms: 1000,
            alarm_pattern_period_ms: 200, // 100 ms on, 100 ms off

            // Event log
            event_log_path: "events.txt".into(),
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_code.len() != CODE_LEN
            || !self.access_code.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ConfigError::ValidationFailed(
                "access_code must be exactly 4 ASCII digits",
            ));
        }
        if self.entry_delay_secs == 0 {
            return Err(ConfigError::ValidationFailed("entry_delay_secs must be > 0"));
        }
        if !(self.proximity_enter_cm > 0.0 && self.proximity_enter_cm < self.proximity_clear_cm) {
            return Err(ConfigError::ValidationFailed(
                "proximity_enter_cm must be positive and below proximity_clear_cm",
            ));
        }
        if self.poll_interval_ms == 0
            || self.clock_refresh_ms == 0
            || self.alarm_pattern_period_ms == 0
        {
            return Err(ConfigError::ValidationFailed("timing intervals must be > 0"));
        }
        if self.event_log_path.is_empty() {
            return Err(ConfigError::ValidationFailed("event_log_path must not be empty"));
        }
        Ok(())
    }
}
