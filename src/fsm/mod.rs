//! Security state machine: a table of plain `fn` handlers per posture.
//!
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  StateTable                                                │
//! │  ┌────────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ State      │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├────────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ Disarmed   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ ArmedHome  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ ArmedAway  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ Alarm      │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  └────────────┴───────────┴──────────┴───────────────────┘ │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! `tick` runs the active row's `on_update`.  A `Some(next)` answer
//! leaves the active row (`on_exit`) and enters `next` (`on_enter`);
//! answering with the active state re-runs both, which is how a disarm
//! while already disarmed is still logged.  Handlers never touch a port:
//! they read the tick's inputs from `&mut FsmContext` and queue outputs
//! on it.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// The security posture.  Must stay in sync with the state table built in
/// [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SecurityState {
    Disarmed = 0,
    ArmedHome = 1,
    ArmedAway = 2,
    Alarm = 3,
}

impl SecurityState {
    /// Number of postures; the table has one row each.
    pub const COUNT: usize = 4;

    /// Convert an index back to a state.  Panics on out-of-range in debug
    /// builds; returns `Alarm` in release (fail secure).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Disarmed,
            1 => Self::ArmedHome,
            2 => Self::ArmedAway,
            3 => Self::Alarm,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Alarm
            }
        }
    }

    /// True for the two armed postures, where the sensors are monitored.
    pub fn is_armed(self) -> bool {
        matches!(self, Self::ArmedHome | Self::ArmedAway)
    }

    /// Status line shown while resting in this state.
    pub fn status_text(self) -> &'static str {
        match self {
            Self::Disarmed => "DISARMED",
            Self::ArmedHome => "ARMED HOME",
            Self::ArmedAway => "ARMED AWAY",
            Self::Alarm => "! ALARM !",
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Entry or exit action.
pub type StateActionFn = fn(&mut FsmContext);

/// Per-tick handler; `Some(next)` requests a transition.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<SecurityState>;

/// One row of the state table.
pub struct StateDescriptor {
    pub id: SecurityState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Indexed by `SecurityState as usize`.
    table: [StateDescriptor; SecurityState::COUNT],
    current: usize,
}

impl Fsm {
    /// Build the engine parked in `initial`.  Nothing runs until
    /// [`start`](Self::start).  Row `i` must describe the state with
    /// index `i`.
    pub fn new(table: [StateDescriptor; SecurityState::COUNT], initial: SecurityState) -> Self {
        for (idx, row) in table.iter().enumerate() {
            debug_assert!(
                row.id as usize == idx,
                "state table row {idx} holds {:?}",
                row.id
            );
        }
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Enter the initial posture.  Call exactly once.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM start: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// One poll cycle for the active posture.
    ///
    /// Returns the state entered, if a transition ran.
    pub fn tick(&mut self, ctx: &mut FsmContext) -> Option<SecurityState> {
        let next = (self.table[self.current].on_update)(ctx)?;
        self.transition(next, ctx);
        Some(next)
    }

    /// Force an immediate transition, bypassing `on_update`.  No-op when
    /// already in `next`.
    pub fn force_transition(&mut self, next: SecurityState, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> SecurityState {
        SecurityState::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: SecurityState, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
