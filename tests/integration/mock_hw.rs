//! Mock hardware adapters for integration tests.
//!
//! Every port is backed by shared `Rc` state so a test can keep a handle
//! after the adapters have been moved into the service: push keys, flip
//! sensors, advance the fake clock, then inspect what the panel showed
//! and what the journal wrote.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use homeguard::app::events::AppEvent;
use homeguard::app::ports::{
    AnnunciatorPort, ClockPort, EventLogPort, EventSink, KeypadPort, SensorPort, WallTime,
};
use homeguard::app::service::{AlarmService, Ports};
use homeguard::config::SystemConfig;
use homeguard::error::LogError;
use homeguard::fsm::SecurityState;
use homeguard::fsm::context::Indicator;
use homeguard::keypad::Key;
use homeguard::sensors::{MotionZone, NO_ECHO_CM};

// ── Keypad ────────────────────────────────────────────────────

/// One queued key per scan.
pub struct MockKeypad(Rc<RefCell<VecDeque<Key>>>);

impl KeypadPort for MockKeypad {
    fn scan(&mut self) -> Option<Key> {
        self.0.borrow_mut().pop_front()
    }
}

// ── Sensors ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Inputs {
    pub exterior: bool,
    pub interior: bool,
    pub door: bool,
    pub distance_cm: f32,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            exterior: false,
            interior: false,
            door: false,
            distance_cm: NO_ECHO_CM,
        }
    }
}

pub struct MockSensors {
    inputs: Rc<Cell<Inputs>>,
    measurements: Rc<Cell<u32>>,
}

impl SensorPort for MockSensors {
    fn motion(&mut self, zone: MotionZone) -> bool {
        let i = self.inputs.get();
        match zone {
            MotionZone::Exterior => i.exterior,
            MotionZone::Interior => i.interior,
        }
    }

    fn door_open(&mut self) -> bool {
        self.inputs.get().door
    }

    fn distance_cm(&mut self) -> f32 {
        self.measurements.set(self.measurements.get() + 1);
        self.inputs.get().distance_cm
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Monotonic ms under test control; wall time is 2025-01-01 00:00:00
/// plus the elapsed whole seconds.
pub struct FakeClock(Rc<Cell<u64>>);

impl ClockPort for FakeClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }

    fn wall_time(&self) -> WallTime {
        let s = self.0.get() / 1000;
        WallTime {
            sec: (s % 60) as u8,
            min: (s / 60 % 60) as u8,
            hour: (s / 3600 % 24) as u8,
            day: 4,
            date: 1,
            month: 1,
            year: 2025,
        }
    }
}

// ── Annunciator ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PanelCall {
    Status(String),
    Clock(WallTime),
    Indicator(Indicator),
    Tone { freq_hz: f32, duration_secs: f32 },
}

pub struct RecordingPanel(Rc<RefCell<Vec<PanelCall>>>);

impl AnnunciatorPort for RecordingPanel {
    fn show_status(&mut self, text: &str) {
        self.0.borrow_mut().push(PanelCall::Status(text.to_owned()));
    }

    fn show_clock(&mut self, time: &WallTime) {
        self.0.borrow_mut().push(PanelCall::Clock(*time));
    }

    fn set_indicator(&mut self, indicator: Indicator) {
        self.0.borrow_mut().push(PanelCall::Indicator(indicator));
    }

    fn tone(&mut self, freq_hz: f32, duration_secs: f32) {
        self.0.borrow_mut().push(PanelCall::Tone {
            freq_hz,
            duration_secs,
        });
    }
}

// ── Event log ─────────────────────────────────────────────────

pub struct MemoryLog {
    lines: Rc<RefCell<Vec<String>>>,
    fail_init: bool,
}

impl EventLogPort for MemoryLog {
    fn init(&mut self) -> Result<(), LogError> {
        if self.fail_init {
            Err(LogError::OpenFailed)
        } else {
            Ok(())
        }
    }

    fn append(&mut self, line: &str) -> Result<(), LogError> {
        self.lines.borrow_mut().push(line.to_owned());
        Ok(())
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type MockService = AlarmService<MockKeypad, MockSensors, FakeClock, RecordingPanel, MemoryLog>;

/// A started service plus handles to every mock.
pub struct Rig {
    pub service: MockService,
    pub sink: RecordingSink,
    keys: Rc<RefCell<VecDeque<Key>>>,
    inputs: Rc<Cell<Inputs>>,
    measurements: Rc<Cell<u32>>,
    now: Rc<Cell<u64>>,
    panel: Rc<RefCell<Vec<PanelCall>>>,
    lines: Rc<RefCell<Vec<String>>>,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::build(SystemConfig::default(), false)
    }

    pub fn with_failing_log() -> Self {
        Self::build(SystemConfig::default(), true)
    }

    fn build(config: SystemConfig, fail_init: bool) -> Self {
        let keys = Rc::new(RefCell::new(VecDeque::new()));
        let inputs = Rc::new(Cell::new(Inputs::default()));
        let measurements = Rc::new(Cell::new(0));
        let now = Rc::new(Cell::new(0));
        let panel = Rc::new(RefCell::new(Vec::new()));
        let lines = Rc::new(RefCell::new(Vec::new()));

        let ports = Ports {
            keypad: MockKeypad(keys.clone()),
            sensors: MockSensors {
                inputs: inputs.clone(),
                measurements: measurements.clone(),
            },
            clock: FakeClock(now.clone()),
            annunciator: RecordingPanel(panel.clone()),
            event_log: MemoryLog {
                lines: lines.clone(),
                fail_init,
            },
        };
        let mut service = AlarmService::new(config, ports);
        let mut sink = RecordingSink::default();
        service.start(&mut sink);

        Self {
            service,
            sink,
            keys,
            inputs,
            measurements,
            now,
            panel,
            lines,
        }
    }

    fn poll_ms(&self) -> u64 {
        u64::from(self.service.config().poll_interval_ms)
    }

    pub fn now_ms(&self) -> u64 {
        self.now.get()
    }

    pub fn state(&self) -> SecurityState {
        self.service.state()
    }

    /// One poll interval, then one tick.
    pub fn tick(&mut self) {
        self.now.set(self.now.get() + self.poll_ms());
        self.service.tick(&mut self.sink);
    }

    /// Tick until `ms` of simulated time have passed.
    pub fn advance(&mut self, ms: u64) {
        let until = self.now.get() + ms;
        while self.now.get() + self.poll_ms() <= until {
            self.tick();
        }
    }

    /// Tick until the fake clock reads `t_ms`.
    pub fn advance_to(&mut self, t_ms: u64) {
        let now = self.now.get();
        assert!(t_ms >= now, "clock cannot go back");
        self.advance(t_ms - now);
    }

    /// Press each key on its own tick.
    pub fn press(&mut self, keys: &str) {
        for c in keys.chars() {
            let key = Key::from_char(c).unwrap_or_else(|| panic!("not a key: {c:?}"));
            self.keys.borrow_mut().push_back(key);
            self.tick();
        }
    }

    pub fn set(&self, f: impl FnOnce(&mut Inputs)) {
        let mut i = self.inputs.get();
        f(&mut i);
        self.inputs.set(i);
    }

    pub fn measurements(&self) -> u32 {
        self.measurements.get()
    }

    /// Raw journal lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Journal texts without the timestamp.
    pub fn journal(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .map(|l| match l.split_once(" - ") {
                Some((_, text)) => text.trim_end().to_owned(),
                None => l.trim_end().to_owned(),
            })
            .collect()
    }

    pub fn journal_count(&self, text: &str) -> usize {
        self.journal().iter().filter(|t| *t == text).count()
    }

    pub fn panel(&self) -> Vec<PanelCall> {
        self.panel.borrow().clone()
    }

    pub fn clear_panel(&self) {
        self.panel.borrow_mut().clear();
    }

    pub fn statuses(&self) -> Vec<String> {
        self.panel
            .borrow()
            .iter()
            .filter_map(|c| match c {
                PanelCall::Status(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses().pop()
    }

    /// Disarmed → armed with the factory code.
    pub fn arm(&mut self, command: char) {
        self.press(&format!("{command}2580#"));
    }
}
