//! Fuzz target: `AlarmService::tick`
//!
//! Drives arbitrary key presses, sensor levels and time steps through the
//! full service and asserts that it never panics, the code buffer never
//! exceeds four digits, and the entry delay only ever runs in ARMED_AWAY.
//!
//! Each 3-byte chunk is one tick: `[key, sensors, time step]`.
//!
//! cargo fuzz run fuzz_keypad_stream

#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use homeguard::app::events::AppEvent;
use homeguard::app::ports::{
    AnnunciatorPort, ClockPort, EventLogPort, EventSink, KeypadPort, SensorPort, WallTime,
};
use homeguard::app::service::{AlarmService, Ports};
use homeguard::config::{CODE_LEN, SystemConfig};
use homeguard::error::LogError;
use homeguard::fsm::SecurityState;
use homeguard::fsm::context::Indicator;
use homeguard::keypad::Key;
use homeguard::sensors::MotionZone;
use libfuzzer_sys::fuzz_target;

const KEYS: &[u8; 16] = b"0123456789ABCD*#";

#[derive(Clone, Copy, Default)]
struct Frame {
    key: Option<Key>,
    exterior: bool,
    interior: bool,
    door: bool,
    distance_cm: f32,
    now_ms: u64,
}

type Shared = Rc<Cell<Frame>>;

struct Keypad(Shared);
struct Sensors(Shared);
struct Clock(Shared);
struct Quiet;

impl KeypadPort for Keypad {
    fn scan(&mut self) -> Option<Key> {
        self.0.get().key
    }
}

impl SensorPort for Sensors {
    fn motion(&mut self, zone: MotionZone) -> bool {
        let f = self.0.get();
        match zone {
            MotionZone::Exterior => f.exterior,
            MotionZone::Interior => f.interior,
        }
    }
    fn door_open(&mut self) -> bool {
        self.0.get().door
    }
    fn distance_cm(&mut self) -> f32 {
        self.0.get().distance_cm
    }
}

impl ClockPort for Clock {
    fn now_ms(&self) -> u64 {
        self.0.get().now_ms
    }
    fn wall_time(&self) -> WallTime {
        WallTime::default()
    }
}

impl AnnunciatorPort for Quiet {
    fn show_status(&mut self, _text: &str) {}
    fn show_clock(&mut self, _time: &WallTime) {}
    fn set_indicator(&mut self, _indicator: Indicator) {}
    fn tone(&mut self, _freq_hz: f32, _duration_secs: f32) {}
}

impl EventLogPort for Quiet {
    fn init(&mut self) -> Result<(), LogError> {
        Ok(())
    }
    fn append(&mut self, _line: &str) -> Result<(), LogError> {
        Ok(())
    }
}

impl EventSink for Quiet {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let frame: Shared = Rc::new(Cell::new(Frame::default()));
    let ports = Ports {
        keypad: Keypad(frame.clone()),
        sensors: Sensors(frame.clone()),
        clock: Clock(frame.clone()),
        annunciator: Quiet,
        event_log: Quiet,
    };
    let mut service = AlarmService::new(SystemConfig::default(), ports);
    let mut sink = Quiet;
    service.start(&mut sink);

    let mut now = 0u64;
    for chunk in data.chunks_exact(3) {
        let (k, s, dt) = (chunk[0], chunk[1], chunk[2]);
        now += u64::from(dt) * 20;
        frame.set(Frame {
            key: KEYS
                .get(usize::from(k % 20))
                .and_then(|&c| Key::from_char(c as char)),
            exterior: s & 0b001 != 0,
            interior: s & 0b010 != 0,
            door: s & 0b100 != 0,
            distance_cm: f32::from(s >> 3) * 2.0,
            now_ms: now,
        });

        service.tick(&mut sink);

        let ctx = service.context();
        assert!(ctx.entry.len() <= CODE_LEN);
        if service.state() != SecurityState::ArmedAway {
            assert!(!ctx.entry_delay.is_active());
        }
    }
});
