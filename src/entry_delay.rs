//! Entry delay timer.
//!
//! After a door-open edge in away mode the occupant has a grace period to
//! type the code before the alarm is forced.  The window is a start
//! timestamp plus a display throttle; it is cancelled on disarm, expiry,
//! re-arm, and on every exit from ARMED_AWAY.

/// Countdown status for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// No window is open.
    Inactive,
    /// Window open; `remaining_secs` whole seconds left.  `refresh` is set
    /// at most once per second, when the display should be redrawn.
    Running { remaining_secs: u32, refresh: bool },
    /// Grace period used up.
    Expired,
}

/// The entry-delay window.
#[derive(Debug, Clone, Default)]
pub struct EntryDelay {
    start_ms: Option<u64>,
    last_display_ms: Option<u64>,
}

impl EntryDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the window at `now_ms`.  Ignored if a window is already open.
    pub fn start(&mut self, now_ms: u64) {
        if self.start_ms.is_none() {
            self.start_ms = Some(now_ms);
            self.last_display_ms = None;
        }
    }

    /// Close the window (valid code, expiry, or state change).
    pub fn cancel(&mut self) {
        self.start_ms = None;
        self.last_display_ms = None;
    }

    pub fn is_active(&self) -> bool {
        self.start_ms.is_some()
    }

    /// Remaining whole seconds, or `None` when no window is open.
    pub fn remaining_secs(&self, now_ms: u64, delay_secs: u32) -> Option<u32> {
        let start = self.start_ms?;
        let elapsed_secs = now_ms.saturating_sub(start) / 1000;
        Some(u64::from(delay_secs).saturating_sub(elapsed_secs) as u32)
    }

    /// Advance the countdown.  Returns [`Countdown::Expired`] once the
    /// remaining time reaches zero; the caller is expected to cancel.
    pub fn poll(&mut self, now_ms: u64, delay_secs: u32) -> Countdown {
        let Some(remaining_secs) = self.remaining_secs(now_ms, delay_secs) else {
            return Countdown::Inactive;
        };
        if remaining_secs == 0 {
            return Countdown::Expired;
        }
        let refresh = match self.last_display_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= 1000,
        };
        if refresh {
            self.last_display_ms = Some(now_ms);
        }
        Countdown::Running {
            remaining_secs,
            refresh,
        }
    }
}
