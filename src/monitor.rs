//! Sensor monitor.
//!
//! The monitor runs **every tick before the FSM** and turns raw readings
//! into edge-triggered findings in `FsmContext.findings`.  The FSM state
//! handlers decide what each finding means in the current posture.
//!
//! ## Owned state and reset rules
//!
//! | Field          | Meaning                         | Reset                         |
//! |----------------|---------------------------------|-------------------------------|
//! | `door_memory`  | previous door reading           | on entering ALARM             |
//! | `latch`        | inside proximity alert zone     | on leaving an armed state     |
//! | `alert_limit`  | last proximity alert            | on arming from DISARMED       |
//! | `measure_gate` | last distance measurement       | never (sensor settle time)    |

use log::{debug, info};

use crate::config::SystemConfig;
use crate::fsm::SecurityState;
use crate::sensors::SensorSnapshot;
use crate::sensors::proximity::{MeasurementGate, ProximityLatch, RateLimiter};

/// Edge-triggered results of one monitor pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorFindings {
    /// Latest boolean sensor levels (all `false` when not sampled).
    pub snapshot: SensorSnapshot,
    /// Door contact went closed → open this tick.
    pub door_opened: bool,
    /// Proximity latch entered the alert zone and the alert is not
    /// rate-limited.
    pub proximity_alert: bool,
}

/// Sensor monitor.
pub struct SensorMonitor {
    door_memory: Option<bool>,
    latch: ProximityLatch,
    alert_limit: RateLimiter,
    measure_gate: MeasurementGate,
}

impl SensorMonitor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            door_memory: None,
            latch: ProximityLatch::new(config.proximity_enter_cm, config.proximity_clear_cm),
            alert_limit: RateLimiter::new(config.proximity_alert_interval_ms),
            measure_gate: MeasurementGate::new(config.min_measure_interval_ms),
        }
    }

    /// Whether the boolean sensors should be sampled in `state`.
    pub fn wants_snapshot(state: SecurityState) -> bool {
        state.is_armed()
    }

    /// Whether the door contact alone should be sampled in `state`.
    pub fn wants_door(state: SecurityState) -> bool {
        state != SecurityState::Alarm
    }

    /// Whether a distance measurement should be taken now.  Consumes the
    /// measurement slot when it returns `true`.
    pub fn take_measurement_slot(
        &mut self,
        state: SecurityState,
        entry_delay_active: bool,
        now_ms: u64,
    ) -> bool {
        state.is_armed() && !entry_delay_active && self.measure_gate.try_acquire(now_ms)
    }

    /// Evaluate one tick's readings.
    ///
    /// * `snapshot` — `None` when the sensors were not sampled.
    /// * `door_open` — door level, sampled whenever [`wants_door`](Self::wants_door).
    /// * `distance_cm` — `None` when no measurement was taken this tick;
    ///   a skipped measurement leaves the latch untouched.
    pub fn evaluate(
        &mut self,
        snapshot: Option<SensorSnapshot>,
        door_open: Option<bool>,
        distance_cm: Option<f32>,
        now_ms: u64,
    ) -> SensorFindings {
        let mut findings = SensorFindings {
            snapshot: snapshot.unwrap_or_default(),
            ..SensorFindings::default()
        };

        // ── Door: rising edge only ───────────────────────────────
        if let Some(open) = door_open {
            findings.snapshot.door_open = open;
            findings.door_opened = self.door_memory == Some(false) && open;
            self.door_memory = Some(open);
        }

        // ── Proximity: hysteresis, then alert rate limit ─────────
        if let Some(cm) = distance_cm {
            if self.latch.update(cm) {
                if self.alert_limit.try_acquire(now_ms) {
                    info!("Proximity latch entered at {:.1} cm", cm);
                    findings.proximity_alert = true;
                } else {
                    debug!("Proximity alert at {:.1} cm suppressed (rate limit)", cm);
                }
            }
        }

        findings
    }

    /// Apply the reset rules for a state change.
    pub fn on_state_change(&mut self, from: SecurityState, to: SecurityState) {
        if from.is_armed() {
            self.latch.reset();
        }
        if to == SecurityState::Alarm {
            self.door_memory = None;
        }
        if from == SecurityState::Disarmed && to.is_armed() {
            self.alert_limit.reset();
        }
    }

    /// Whether the proximity latch is currently inside the alert zone.
    pub fn in_proximity_zone(&self) -> bool {
        self.latch.in_zone()
    }
}
