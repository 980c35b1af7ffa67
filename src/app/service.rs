//! Application service — the hexagonal core.
//!
//! [`AlarmService`] owns the FSM, the sensor monitor, the journal and the
//! shared context.  All I/O flows through the port adapters injected at
//! construction, making the entire service testable with mock adapters.
//!
//! ```text
//!  KeypadPort ──▶ ┌──────────────────────────┐ ──▶ AnnunciatorPort
//!  SensorPort ──▶ │       AlarmService        │ ──▶ EventLogPort
//!   ClockPort ──▶ │ Monitor · FSM · Journal   │ ──▶ EventSink
//!                 └──────────────────────────┘
//! ```
//!
//! One [`tick`](AlarmService::tick):
//!
//! 1. scan the keypad
//! 2. sample the sensors the current state needs
//! 3. monitor: door edge, proximity latch, rate limits
//! 4. FSM tick
//! 5. apply queued outputs (status, indicator, tones, journal)
//! 6. refresh the clock line once per second

use log::{debug, info};

use crate::config::SystemConfig;
use crate::fsm::context::{FsmContext, Indicator, Output};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, SecurityState};
use crate::journal::Journal;
use crate::monitor::SensorMonitor;
use crate::sensors::{MotionZone, SensorSnapshot};

use super::events::AppEvent;
use super::ports::{AnnunciatorPort, ClockPort, EventLogPort, EventSink, KeypadPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// Ports bundle
// ───────────────────────────────────────────────────────────────

/// The collaborators the service drives.
pub struct Ports<K, S, C, A, L> {
    pub keypad: K,
    pub sensors: S,
    pub clock: C,
    pub annunciator: A,
    pub event_log: L,
}

// ───────────────────────────────────────────────────────────────
// AlarmService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AlarmService<K, S, C, A, L> {
    fsm: Fsm,
    ctx: FsmContext,
    monitor: SensorMonitor,
    journal: Journal,
    ports: Ports<K, S, C, A, L>,
    last_clock_ms: Option<u64>,
    tick_count: u64,
}

impl<K, S, C, A, L> AlarmService<K, S, C, A, L>
where
    K: KeypadPort,
    S: SensorPort,
    C: ClockPort,
    A: AnnunciatorPort,
    L: EventLogPort,
{
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, ports: Ports<K, S, C, A, L>) -> Self {
        let monitor = SensorMonitor::new(&config);
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), SecurityState::Disarmed);

        Self {
            fsm,
            ctx,
            monitor,
            journal: Journal::new(),
            ports,
            last_clock_ms: None,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initialise the journal, run the annunciator self-test and enter
    /// DISARMED.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        let now = self.ports.clock.now_ms();

        match self.journal.init(&mut self.ports.event_log) {
            Ok(()) => {
                let at = self.ports.clock.wall_time();
                self.journal
                    .record(&mut self.ports.event_log, &at, "System Started");
            }
            Err(e) => {
                self.ports.annunciator.show_status("Log Init Failed!");
                sink.emit(&AppEvent::JournalDegraded(e));
            }
        }

        self.self_test();

        self.ctx.begin_tick(now);
        self.fsm.start(&mut self.ctx);
        self.apply_outputs();
        self.refresh_clock(now);

        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AlarmService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one poll cycle.  Never blocks beyond the bounded ultrasonic
    /// measurement.
    pub fn tick(&mut self, sink: &mut impl EventSink) {
        self.tick_count += 1;
        let now = self.ports.clock.now_ms();
        let state = self.fsm.current_state();

        self.ctx.begin_tick(now);

        // 1. Keypad
        self.ctx.key = self.ports.keypad.scan();
        if let Some(key) = self.ctx.key {
            debug!("key {}", key.as_char());
        }

        // 2. Sensors, only what this state listens to
        let sensors = &mut self.ports.sensors;
        let snapshot = SensorMonitor::wants_snapshot(state).then(|| SensorSnapshot {
            motion_exterior: sensors.motion(MotionZone::Exterior),
            motion_interior: sensors.motion(MotionZone::Interior),
            door_open: false,
        });
        let door = SensorMonitor::wants_door(state).then(|| sensors.door_open());
        let distance = self
            .monitor
            .take_measurement_slot(state, self.ctx.entry_delay.is_active(), now)
            .then(|| sensors.distance_cm());

        // 3. Monitor
        self.ctx.findings = self.monitor.evaluate(snapshot, door, distance, now);

        // 4. FSM
        let entered = self.fsm.tick(&mut self.ctx);

        // 5. Outputs
        self.apply_outputs();

        // 6. Clock line
        self.refresh_clock(now);

        if let Some(to) = entered {
            self.monitor.on_state_change(state, to);
            if to != state {
                sink.emit(&AppEvent::StateChanged { from: state, to });
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> SecurityState {
        self.fsm.current_state()
    }

    /// Total poll ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Read-only view of the FSM blackboard.
    pub fn context(&self) -> &FsmContext {
        &self.ctx
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Live configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Indicator and buzzer check: red, green, blue, then two tones.
    fn self_test(&mut self) {
        let a = &mut self.ports.annunciator;
        for colour in [Indicator::Red, Indicator::Green, Indicator::Blue] {
            a.set_indicator(colour);
        }
        a.tone(440.0, 0.1);
        a.tone(880.0, 0.1);
        a.show_status("Ready");
    }

    /// Translate queued FSM outputs into port calls, in order.
    fn apply_outputs(&mut self) {
        let Self {
            ctx,
            ports,
            journal,
            ..
        } = self;

        // Wall time is read at most once per tick.
        let mut stamp = None;
        for output in &ctx.outputs {
            match output {
                Output::Status(line) => ports.annunciator.show_status(line),
                Output::Indicator(colour) => ports.annunciator.set_indicator(*colour),
                Output::Tone {
                    freq_hz,
                    duration_secs,
                } => ports.annunciator.tone(*freq_hz, *duration_secs),
                Output::Journal(text) => {
                    let at = *stamp.get_or_insert_with(|| ports.clock.wall_time());
                    info!("journal: {text}");
                    journal.record(&mut ports.event_log, &at, text);
                }
            }
        }
    }

    fn refresh_clock(&mut self, now: u64) {
        let period = u64::from(self.ctx.config.clock_refresh_ms);
        let due = self
            .last_clock_ms
            .is_none_or(|last| now.saturating_sub(last) >= period);
        if due {
            self.last_clock_ms = Some(now);
            let at = self.ports.clock.wall_time();
            self.ports.annunciator.show_clock(&at);
        }
    }
}
