//! Outbound application events.
//!
//! The [`AlarmService`](super::service::AlarmService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.  They are diagnostics only; the
//! occupant-facing event journal is written separately.

use crate::error::LogError;
use crate::fsm::SecurityState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(SecurityState),

    /// The FSM moved between two different states.
    StateChanged {
        from: SecurityState,
        to: SecurityState,
    },

    /// The event log could not be initialised; journal writes are skipped.
    JournalDegraded(LogError),
}
