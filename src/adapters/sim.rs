//! Host simulation peripherals.
//!
//! Stand-ins for the real board so the full service runs on a desktop:
//!
//! | Type         | Stands in for                 | Driven by              |
//! |--------------|-------------------------------|------------------------|
//! | `SimInput`   | PIR / door contact GPIO       | `SimLevel` handle      |
//! | `SimTrigger` | HC-SR04 trigger GPIO          | ultrasonic driver      |
//! | `SimEcho`    | HC-SR04 echo GPIO             | `SimRanger` handle     |
//! | `SimDelay`   | busy-wait delay               | advances sim time      |
//! | `SimMicros`  | microsecond timer             | `SimDelay`             |
//! | `SimKeypad`  | matrix keypad                 | `KeyQueue` producer    |
//!
//! Handles are cheap `Arc` clones so a console thread can flip inputs
//! while the poll loop owns the pins.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use log::debug;

use crate::adapters::hardware::GpioSensorBank;
use crate::app::ports::KeypadPort;
use crate::keypad::Key;
use crate::sensors::{MicrosClock, MotionZone};
use crate::sensors::ultrasonic::Ultrasonic;

// ── Digital inputs ────────────────────────────────────────────

/// Writer side of a simulated input line.
#[derive(Debug, Clone)]
pub struct SimLevel(Arc<AtomicBool>);

/// Reader side, handed to the driver as an `InputPin`.
#[derive(Debug)]
pub struct SimInput(Arc<AtomicBool>);

impl SimLevel {
    /// A new low line and its pin.
    pub fn pair() -> (Self, SimInput) {
        let line = Arc::new(AtomicBool::new(false));
        (Self(line.clone()), SimInput(line))
    }

    pub fn set(&self, high: bool) {
        self.0.store(high, Ordering::Release);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl ErrorType for SimInput {
    type Error = Infallible;
}

impl InputPin for SimInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.load(Ordering::Acquire))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

// ── Ultrasonic ranger ─────────────────────────────────────────

/// No target in range.
const NO_TARGET: u32 = u32::MAX;
/// Trigger to echo rise (the 40 kHz burst).
const ECHO_LAG_US: u64 = 200;

#[derive(Debug)]
struct RangerState {
    /// Target distance in tenths of a cm, or `NO_TARGET`.
    distance_dcm: AtomicU32,
    /// Simulated time, advanced only by [`SimDelay`].
    now_ns: AtomicU64,
    /// Simulated time of the last trigger pulse.
    trigger_ns: AtomicU64,
}

impl RangerState {
    fn now_us(&self) -> u64 {
        self.now_ns.load(Ordering::Acquire) / 1000
    }
}

/// Simulated HC-SR04 on its own simulated timebase.  The echo is a pulse
/// of the true round-trip width, `ECHO_LAG_US` after the trigger.
#[derive(Debug, Clone)]
pub struct SimRanger(Arc<RangerState>);

#[derive(Debug)]
pub struct SimTrigger(Arc<RangerState>);

#[derive(Debug)]
pub struct SimEcho(Arc<RangerState>);

/// Delay that advances the ranger's simulated time instead of sleeping.
#[derive(Debug)]
pub struct SimDelay(Arc<RangerState>);

/// Microsecond timebase read by the driver.
#[derive(Debug)]
pub struct SimMicros(Arc<RangerState>);

impl SimRanger {
    pub fn new() -> Self {
        Self(Arc::new(RangerState {
            distance_dcm: AtomicU32::new(NO_TARGET),
            now_ns: AtomicU64::new(0),
            trigger_ns: AtomicU64::new(0),
        }))
    }

    pub fn pins(&self) -> (SimTrigger, SimEcho) {
        (SimTrigger(self.0.clone()), SimEcho(self.0.clone()))
    }

    /// Delay and clock sharing this ranger's simulated time.
    pub fn timebase(&self) -> (SimDelay, SimMicros) {
        (SimDelay(self.0.clone()), SimMicros(self.0.clone()))
    }

    /// Place a target at `cm`, or remove it with `None`.
    pub fn set_distance(&self, cm: Option<f32>) {
        let dcm = cm.map_or(NO_TARGET, |cm| (cm.max(0.0) * 10.0).round() as u32);
        self.0.distance_dcm.store(dcm, Ordering::Release);
    }

    /// Ranging driver wired to this ranger.
    pub fn driver(&self) -> Ultrasonic<SimTrigger, SimEcho, SimDelay, SimMicros> {
        let (trig, echo) = self.pins();
        let (delay, micros) = self.timebase();
        Ultrasonic::new(trig, echo, delay, micros)
    }
}

impl Default for SimRanger {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for SimTrigger {
    type Error = Infallible;
}

impl OutputPin for SimTrigger {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let now = self.0.now_ns.load(Ordering::Acquire);
        self.0.trigger_ns.store(now, Ordering::Release);
        Ok(())
    }
}

impl ErrorType for SimEcho {
    type Error = Infallible;
}

impl InputPin for SimEcho {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        let dcm = self.0.distance_dcm.load(Ordering::Acquire);
        if dcm == NO_TARGET {
            return Ok(false);
        }
        let width_us = f64::from(dcm) / 10.0 * 2.0 / 0.0343;
        let trigger_us = self.0.trigger_ns.load(Ordering::Acquire) / 1000;
        let since = self.0.now_us().saturating_sub(trigger_us);
        Ok(since >= ECHO_LAG_US && ((since - ECHO_LAG_US) as f64) < width_us)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.now_ns.fetch_add(u64::from(ns), Ordering::AcqRel);
    }
}

impl MicrosClock for SimMicros {
    fn uptime_us(&self) -> u64 {
        self.0.now_us()
    }
}

// ── Lock-free key queue ───────────────────────────────────────
//
// Console thread writes (produce), poll loop reads (consume).
// Atomic head/tail indices plus atomic slots, so no `unsafe`.

/// Maximum number of pending keys.
const KEY_QUEUE_CAP: usize = 32;

/// Single-producer / single-consumer ring of key presses.
#[derive(Debug)]
pub struct KeyQueue {
    head: AtomicU8,
    tail: AtomicU8,
    slots: [AtomicU8; KEY_QUEUE_CAP],
}

impl KeyQueue {
    pub fn new() -> Self {
        Self {
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
            slots: core::array::from_fn(|_| AtomicU8::new(0)),
        }
    }

    /// Push a key.  Returns `false` if the queue is full (key dropped).
    pub fn push(&self, key: Key) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let next_head = (head + 1) % KEY_QUEUE_CAP as u8;

        if next_head == tail {
            return false;
        }

        self.slots[head as usize].store(key.as_char() as u8, Ordering::Relaxed);
        self.head.store(next_head, Ordering::Release);
        true
    }

    /// Pop the oldest key, if any.
    pub fn pop(&self) -> Option<Key> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let raw = self.slots[tail as usize].load(Ordering::Relaxed);
        self.tail
            .store((tail + 1) % KEY_QUEUE_CAP as u8, Ordering::Release);
        Key::from_char(raw as char)
    }

    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Relaxed) == self.head.load(Ordering::Acquire)
    }
}

impl Default for KeyQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Keypad fed from a [`KeyQueue`]; one key per scan.
#[derive(Debug, Clone)]
pub struct SimKeypad(Arc<KeyQueue>);

impl SimKeypad {
    pub fn new(queue: Arc<KeyQueue>) -> Self {
        Self(queue)
    }
}

impl KeypadPort for SimKeypad {
    fn scan(&mut self) -> Option<Key> {
        self.0.pop()
    }
}

// ── Console commands ──────────────────────────────────────────

/// One line typed at the simulator console.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    /// Keypad presses, e.g. `A2580#`.
    Keys(Vec<Key>),
    /// `door open` / `door closed`
    Door(bool),
    /// `pir ext on`, `pir int off`
    Motion(MotionZone, bool),
    /// `dist 8.5` / `dist none`
    Distance(Option<f32>),
    /// `quit`
    Quit,
}

impl SimCommand {
    /// Parse a console line.  `None` for anything unrecognised.
    pub fn parse(line: &str) -> Option<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => None,
            ["quit" | "exit"] => Some(Self::Quit),
            ["door", state] => on_off(state).map(Self::Door),
            ["pir", zone, state] => {
                let zone = match *zone {
                    "ext" | "exterior" => MotionZone::Exterior,
                    "int" | "interior" => MotionZone::Interior,
                    _ => return None,
                };
                on_off(state).map(|on| Self::Motion(zone, on))
            }
            ["dist", "none"] => Some(Self::Distance(None)),
            ["dist", cm] => cm.parse::<f32>().ok().map(|cm| Self::Distance(Some(cm))),
            _ => {
                let keys: Option<Vec<Key>> = line
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(Key::from_char)
                    .collect();
                keys.filter(|k| !k.is_empty()).map(Self::Keys)
            }
        }
    }
}

fn on_off(word: &str) -> Option<bool> {
    match word {
        "on" | "open" | "1" => Some(true),
        "off" | "closed" | "close" | "0" => Some(false),
        _ => None,
    }
}

/// Every simulator input handle, cloned into the console thread.
#[derive(Debug, Clone)]
pub struct SimHandles {
    pub pir_exterior: SimLevel,
    pub pir_interior: SimLevel,
    pub door: SimLevel,
    pub ranger: SimRanger,
    pub keys: Arc<KeyQueue>,
    pub quit: Arc<AtomicBool>,
}

impl SimHandles {
    pub fn apply(&self, command: &SimCommand) {
        match command {
            SimCommand::Keys(keys) => {
                for key in keys {
                    if !self.keys.push(*key) {
                        debug!("sim: key queue full, dropped {}", key.as_char());
                    }
                }
            }
            SimCommand::Door(open) => self.door.set(*open),
            SimCommand::Motion(MotionZone::Exterior, on) => self.pir_exterior.set(*on),
            SimCommand::Motion(MotionZone::Interior, on) => self.pir_interior.set(*on),
            SimCommand::Distance(cm) => self.ranger.set_distance(*cm),
            SimCommand::Quit => self.quit.store(true, Ordering::Release),
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }
}

// ── Board assembly ────────────────────────────────────────────

/// The sensor bank wired to simulation pins.
pub type SimSensorBank = GpioSensorBank<SimInput, SimTrigger, SimEcho, SimDelay, SimMicros>;

/// Wire up a complete simulated board: control handles for the console,
/// plus the keypad and sensor adapters for the service.
pub fn sim_board() -> (SimHandles, SimKeypad, SimSensorBank) {
    let (pir_exterior, ext_pin) = SimLevel::pair();
    let (pir_interior, int_pin) = SimLevel::pair();
    let (door, door_pin) = SimLevel::pair();
    let ranger = SimRanger::new();
    let keys = Arc::new(KeyQueue::new());

    let handles = SimHandles {
        pir_exterior,
        pir_interior,
        door,
        ranger,
        keys: keys.clone(),
        quit: Arc::new(AtomicBool::new(false)),
    };
    let sensors = GpioSensorBank::new(
        ext_pin,
        int_pin,
        door_pin,
        handles.ranger.driver(),
    );
    (handles, SimKeypad::new(keys), sensors)
}
