//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It carries the tick's inputs (time, key, sensor findings),
//! the code-entry episode, the entry-delay window, and a queue of
//! [`Output`]s that the service applies to the annunciator and the event
//! journal once the tick is done.  Think of it as the "blackboard" in a
//! blackboard architecture.

use core::fmt::{self, Write as _};

use heapless::{String, Vec};
use log::warn;

use super::SecurityState;
use crate::access::{AccessCode, CodeEntry};
use crate::config::SystemConfig;
use crate::entry_delay::EntryDelay;
use crate::keypad::{Key, PendingCommand};
use crate::monitor::SensorFindings;

/// Longest status line the display can hold.
pub const STATUS_CAPACITY: usize = 32;
/// Outputs a single tick may queue.
pub const OUTPUT_CAPACITY: usize = 32;

pub type StatusLine = String<STATUS_CAPACITY>;

// ---------------------------------------------------------------------------
// Outputs (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Status indicator colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Off,
    Green,
    Purple,
    Blue,
    Red,
}

impl Indicator {
    /// Resting colour for a posture.
    pub fn for_state(state: SecurityState) -> Self {
        match state {
            SecurityState::Disarmed => Self::Green,
            SecurityState::ArmedHome => Self::Purple,
            SecurityState::ArmedAway => Self::Blue,
            SecurityState::Alarm => Self::Red,
        }
    }

    /// (R, G, B), each 0–255.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Off => (0, 0, 0),
            Self::Green => (0, 255, 0),
            Self::Purple => (128, 0, 128),
            Self::Blue => (0, 0, 255),
            Self::Red => (255, 0, 0),
        }
    }
}

/// One annunciator or journal action requested by a state handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Status(StatusLine),
    Indicator(Indicator),
    Tone { freq_hz: f32, duration_secs: f32 },
    Journal(&'static str),
}

// ---------------------------------------------------------------------------
// Alarm sub-state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmPhase {
    /// Siren pattern running; only `C` is accepted.
    #[default]
    Sounding,
    /// `C` pressed; digits are being collected.
    CodeEntry,
}

/// Siren pattern bookkeeping, owned by the ALARM state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlarmStatus {
    pub phase: AlarmPhase,
    /// Last flash toggle.
    pub last_toggle_ms: Option<u64>,
    /// Whether the indicator is currently lit.
    pub flash_on: bool,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Monotonic milliseconds at the start of this tick.
    pub now_ms: u64,

    // -- Inputs --
    /// Key scanned this tick, if any.
    pub key: Option<Key>,
    /// Sensor monitor results for this tick.
    pub findings: SensorFindings,

    // -- Code entry --
    pub entry: CodeEntry,
    pub pending: Option<PendingCommand>,
    pub access_code: AccessCode,

    // -- Timers --
    pub entry_delay: EntryDelay,
    pub alarm: AlarmStatus,
    /// When a transient notice should give way to the resting status.
    pub notice_until_ms: Option<u64>,

    // -- Outputs --
    /// Actions to apply after the FSM tick.
    pub outputs: Vec<Output, OUTPUT_CAPACITY>,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        let access_code = AccessCode::parse(&config.access_code).unwrap_or_else(|e| {
            warn!("{e}; falling back to the factory code");
            AccessCode::default()
        });
        Self {
            now_ms: 0,
            key: None,
            findings: SensorFindings::default(),
            entry: CodeEntry::new(),
            pending: None,
            access_code,
            entry_delay: EntryDelay::new(),
            alarm: AlarmStatus::default(),
            notice_until_ms: None,
            outputs: Vec::new(),
            config,
        }
    }

    /// Reset per-tick inputs and outputs.  Episode and timer state carry over.
    pub fn begin_tick(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        self.key = None;
        self.findings = SensorFindings::default();
        self.outputs.clear();
    }

    /// Drop the code-entry episode.
    pub fn clear_episode(&mut self) {
        self.entry.clear();
        self.pending = None;
    }

    // -- Output helpers --

    fn push(&mut self, output: Output) {
        if let Err(dropped) = self.outputs.push(output) {
            warn!("output queue full, dropping {:?}", dropped);
        }
    }

    /// Replace the status line.  Text beyond the display width is cut.
    pub fn show(&mut self, text: &str) {
        let mut line = StatusLine::new();
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        self.push(Output::Status(line));
    }

    pub fn show_fmt(&mut self, args: fmt::Arguments<'_>) {
        let mut line = StatusLine::new();
        let _ = line.write_fmt(args);
        self.push(Output::Status(line));
    }

    pub fn indicate(&mut self, indicator: Indicator) {
        self.push(Output::Indicator(indicator));
    }

    pub fn tone(&mut self, freq_hz: f32, duration_secs: f32) {
        self.push(Output::Tone {
            freq_hz,
            duration_secs,
        });
    }

    /// Key-press feedback.
    pub fn click(&mut self) {
        self.tone(1000.0, 0.05);
    }

    pub fn journal(&mut self, text: &'static str) {
        self.push(Output::Journal(text));
    }

    /// Show `text` until `notice_duration_ms` has passed.
    pub fn notice(&mut self, text: &str) {
        self.show(text);
        self.notice_until_ms = Some(self.now_ms + u64::from(self.config.notice_duration_ms));
    }

    /// True once, when a pending notice has run its course.
    pub fn notice_expired(&mut self) -> bool {
        match self.notice_until_ms {
            Some(until) if self.now_ms >= until => {
                self.notice_until_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Resting status line and indicator colour for `state`.
    pub fn announce(&mut self, state: SecurityState) {
        self.show(state.status_text());
        self.indicate(Indicator::for_state(state));
    }

    pub fn show_code_prompt(&mut self) {
        let progress = self.entry.progress();
        self.show_fmt(format_args!("Enter Code: {progress}"));
    }

    /// Status lines queued this tick, oldest first.
    pub fn status_lines(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().filter_map(|o| match o {
            Output::Status(s) => Some(s.as_str()),
            _ => None,
        })
    }
}
