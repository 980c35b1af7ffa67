//! Proximity policy: hysteresis latch and the two rate limiters.
//!
//! The raw ultrasonic reading is noisy around the threshold.  The latch
//! enters the alert zone below `enter_cm` and only leaves it above
//! `clear_cm`, so a reading chattering between the two produces a single
//! alert.  [`MeasurementGate`] keeps the sensor from being pinged more
//! often than the echo can settle; [`RateLimiter`] keeps alerts from
//! storming.

/// Hysteresis latch: "currently inside the alert zone".
#[derive(Debug, Clone)]
pub struct ProximityLatch {
    enter_cm: f32,
    clear_cm: f32,
    in_zone: bool,
}

impl ProximityLatch {
    pub fn new(enter_cm: f32, clear_cm: f32) -> Self {
        debug_assert!(enter_cm < clear_cm, "hysteresis band inverted");
        Self {
            enter_cm,
            clear_cm,
            in_zone: false,
        }
    }

    /// Feed one reading.  Returns `true` only on the edge into the zone.
    pub fn update(&mut self, distance_cm: f32) -> bool {
        if !self.in_zone && distance_cm < self.enter_cm {
            self.in_zone = true;
            return true;
        }
        if self.in_zone && distance_cm > self.clear_cm {
            self.in_zone = false;
        }
        false
    }

    pub fn in_zone(&self) -> bool {
        self.in_zone
    }

    pub fn reset(&mut self) {
        self.in_zone = false;
    }
}

/// Allows an action at most once per `interval_ms`.
///
/// The first call after construction or [`reset`](Self::reset) is always
/// allowed.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl RateLimiter {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: u64::from(interval_ms),
            last_ms: None,
        }
    }

    /// Whether an action at `now_ms` would be allowed, without consuming.
    pub fn ready(&self, now_ms: u64) -> bool {
        match self.last_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }

    /// Consume the slot at `now_ms`.  Returns `false` if still limited.
    pub fn try_acquire(&mut self, now_ms: u64) -> bool {
        if self.ready(now_ms) {
            self.last_ms = Some(now_ms);
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Minimum spacing between two ultrasonic measurements.
pub type MeasurementGate = RateLimiter;
