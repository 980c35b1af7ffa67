//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!            ┌──[C + code #]──┐
//!            ▼                │
//!        DISARMED ──[A + code #]──▶ ARMED_HOME
//!            │  ▲                      │
//!  [B + code #] └──[C + code #]────────┤
//!            ▼                         │ [exterior motion]
//!       ARMED_AWAY ──[motion | window | entry expired]──▶ ALARM
//!                                                           │
//!  Any non-alarm state ──[D]──▶ ALARM ──[C + code #]──▶ DISARMED
//! ```
//!
//! Keys handled by every non-alarm state:
//!
//! | Key       | Effect                                                |
//! |-----------|-------------------------------------------------------|
//! | `A` `B` `C` | open an episode for that command, clear the buffer  |
//! | digit     | append (episode only, max 4)                          |
//! | `*`       | backspace (episode only)                              |
//! | `#`       | confirm when 4 digits are buffered                    |
//! | `D`       | panic, straight to ALARM                              |

use super::context::{AlarmPhase, FsmContext, Indicator};
use super::{SecurityState, StateDescriptor};
use crate::entry_delay::Countdown;
use crate::keypad::{Key, PendingCommand};
use log::{info, warn};

const SUCCESS_HZ: f32 = 880.0;
const ERROR_HZ: f32 = 220.0;
const SIREN_HZ: f32 = 1760.0;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; SecurityState::COUNT] {
    [
        // Index 0 — Disarmed
        StateDescriptor {
            id: SecurityState::Disarmed,
            name: "Disarmed",
            on_enter: Some(disarmed_enter),
            on_exit: Some(leave_state),
            on_update: disarmed_update,
        },
        // Index 1 — ArmedHome
        StateDescriptor {
            id: SecurityState::ArmedHome,
            name: "ArmedHome",
            on_enter: Some(armed_home_enter),
            on_exit: Some(leave_state),
            on_update: armed_home_update,
        },
        // Index 2 — ArmedAway
        StateDescriptor {
            id: SecurityState::ArmedAway,
            name: "ArmedAway",
            on_enter: Some(armed_away_enter),
            on_exit: Some(leave_state),
            on_update: armed_away_update,
        },
        // Index 3 — Alarm
        StateDescriptor {
            id: SecurityState::Alarm,
            name: "Alarm",
            on_enter: Some(alarm_enter),
            on_exit: Some(leave_state),
            on_update: alarm_update,
        },
    ]
}

/// Shared exit action: nothing typed or timed survives a state change.
fn leave_state(ctx: &mut FsmContext) {
    ctx.clear_episode();
    ctx.entry_delay.cancel();
    ctx.notice_until_ms = None;
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared key handling
// ═══════════════════════════════════════════════════════════════════════════

/// Normal code-entry episode for the non-alarm states.  Returns the target
/// state when a complete, correct code is confirmed.
fn handle_command_key(ctx: &mut FsmContext, key: Key) -> Option<SecurityState> {
    match key {
        Key::A | Key::B | Key::C => {
            ctx.pending = key.command();
            ctx.entry.clear();
            ctx.notice_until_ms = None;
            ctx.show_code_prompt();
            None
        }
        Key::Digit(d) => {
            if ctx.pending.is_some() && ctx.entry.push_digit(d) {
                ctx.show_code_prompt();
            }
            None
        }
        Key::Star => {
            if ctx.pending.is_some() {
                ctx.entry.backspace();
                ctx.show_code_prompt();
            }
            None
        }
        Key::Hash => match ctx.pending {
            Some(command) if ctx.entry.is_complete() => confirm_code(ctx, command),
            _ => None,
        },
        // Panic is handled before the episode.
        Key::D => None,
    }
}

fn confirm_code(ctx: &mut FsmContext, command: PendingCommand) -> Option<SecurityState> {
    if !ctx.access_code.matches(&ctx.entry) {
        warn!("wrong code for {:?}", command);
        ctx.journal("Wrong Code Entered");
        ctx.tone(ERROR_HZ, 0.5);
        ctx.notice("Wrong Code!");
        // The command stays pending so the user can retype.
        ctx.entry.clear();
        return None;
    }

    let (target, text) = match command {
        PendingCommand::ArmHome => (SecurityState::ArmedHome, "System Armed - Home Mode"),
        PendingCommand::ArmAway => (SecurityState::ArmedAway, "System Armed - Away Mode"),
        PendingCommand::Disarm => (SecurityState::Disarmed, "System Disarmed"),
    };
    ctx.journal(text);
    ctx.tone(SUCCESS_HZ, 0.1);
    ctx.entry_delay.cancel();
    ctx.clear_episode();
    Some(target)
}

/// `D` from any non-alarm state.
fn panic_pressed(ctx: &mut FsmContext) -> bool {
    if ctx.key != Some(Key::D) {
        return false;
    }
    info!("panic key");
    ctx.journal("Panic Button Pressed");
    ctx.clear_episode();
    true
}

/// Feedback tone plus episode handling for this tick's key.
fn handle_key(ctx: &mut FsmContext) -> Option<SecurityState> {
    let key = ctx.key?;
    ctx.click();
    handle_command_key(ctx, key)
}

/// Once a timed notice lapses the display returns to the posture text.
/// A pending command survives; the next keypress redraws the code prompt.
fn restore_after_notice(ctx: &mut FsmContext, state: SecurityState) {
    if ctx.notice_expired() {
        ctx.show(state.status_text());
    }
}

/// Home-mode chime: indicator off/on with `count` short tones.
fn chime(ctx: &mut FsmContext, count: usize, duration_secs: f32) {
    for _ in 0..count {
        ctx.indicate(Indicator::Off);
        ctx.tone(SUCCESS_HZ, duration_secs);
        ctx.indicate(Indicator::Purple);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISARMED
// ═══════════════════════════════════════════════════════════════════════════

fn disarmed_enter(ctx: &mut FsmContext) {
    ctx.announce(SecurityState::Disarmed);
    info!("DISARMED");
}

fn disarmed_update(ctx: &mut FsmContext) -> Option<SecurityState> {
    if panic_pressed(ctx) {
        return Some(SecurityState::Alarm);
    }
    if let Some(next) = handle_key(ctx) {
        return Some(next);
    }

    // Logged only; no state change while disarmed.
    if ctx.findings.door_opened {
        ctx.journal("Door Opened");
        ctx.notice("Door Opened");
    }

    restore_after_notice(ctx, SecurityState::Disarmed);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED_HOME — perimeter only, occupants inside
// ═══════════════════════════════════════════════════════════════════════════

fn armed_home_enter(ctx: &mut FsmContext) {
    ctx.announce(SecurityState::ArmedHome);
    info!("ARMED_HOME: exterior PIR, door chime, proximity chime");
}

fn armed_home_update(ctx: &mut FsmContext) -> Option<SecurityState> {
    if panic_pressed(ctx) {
        return Some(SecurityState::Alarm);
    }
    if let Some(next) = handle_key(ctx) {
        return Some(next);
    }

    let findings = ctx.findings;

    if findings.snapshot.motion_exterior {
        info!("ARMED_HOME: exterior motion");
        ctx.journal("Outside Motion!");
        return Some(SecurityState::Alarm);
    }

    if findings.door_opened {
        ctx.journal("Door Opened");
        ctx.notice("Door Opened");
        chime(ctx, 3, 0.1);
    }

    // Proximity never escalates in home mode.
    if findings.proximity_alert {
        ctx.journal("Proximity Alert");
        ctx.notice("Proximity Alert");
        chime(ctx, 2, 0.05);
    }

    restore_after_notice(ctx, SecurityState::ArmedHome);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED_AWAY — everything armed, entry delay on the door
// ═══════════════════════════════════════════════════════════════════════════

fn armed_away_enter(ctx: &mut FsmContext) {
    ctx.entry_delay.cancel();
    ctx.announce(SecurityState::ArmedAway);
    info!("ARMED_AWAY: all sensors armed");
}

fn armed_away_update(ctx: &mut FsmContext) -> Option<SecurityState> {
    if panic_pressed(ctx) {
        return Some(SecurityState::Alarm);
    }

    if ctx.entry_delay.is_active() {
        if let Some(next) = entry_delay_key(ctx) {
            return Some(next);
        }
    } else if let Some(next) = handle_key(ctx) {
        return Some(next);
    }

    let findings = ctx.findings;

    // The door edge is taken first so an occupant walking in is covered by
    // the entry delay before the interior PIR sees them.
    if findings.door_opened && !ctx.entry_delay.is_active() {
        info!("ARMED_AWAY: door opened, entry delay started");
        ctx.journal("Entry Started");
        ctx.clear_episode();
        ctx.notice_until_ms = None;
        ctx.entry_delay.start(ctx.now_ms);
    }

    if !ctx.entry_delay.is_active() {
        if findings.snapshot.any_motion() {
            info!("ARMED_AWAY: motion");
            ctx.journal("Motion Detected!");
            return Some(SecurityState::Alarm);
        }
        if findings.proximity_alert {
            info!("ARMED_AWAY: window breach");
            ctx.journal("Window Breach!");
            return Some(SecurityState::Alarm);
        }
        restore_after_notice(ctx, SecurityState::ArmedAway);
        return None;
    }

    match ctx.entry_delay.poll(ctx.now_ms, ctx.config.entry_delay_secs) {
        Countdown::Expired => {
            info!("ARMED_AWAY: entry delay expired");
            ctx.entry_delay.cancel();
            ctx.journal("Entry Delay Expired");
            Some(SecurityState::Alarm)
        }
        Countdown::Running {
            remaining_secs,
            refresh: true,
        } => {
            show_countdown(ctx, remaining_secs);
            None
        }
        _ => None,
    }
}

/// Keys during the entry delay: digits collect the disarm code directly.
fn entry_delay_key(ctx: &mut FsmContext) -> Option<SecurityState> {
    let key = ctx.key?;
    ctx.click();
    match key {
        Key::Digit(d) => {
            ctx.entry.push_digit(d);
        }
        Key::Star => ctx.entry.backspace(),
        Key::Hash if ctx.entry.is_complete() => {
            if ctx.access_code.matches(&ctx.entry) {
                info!("ARMED_AWAY: disarmed during entry delay");
                ctx.entry_delay.cancel();
                ctx.journal("System Disarmed");
                ctx.tone(440.0, 0.1);
                return Some(SecurityState::Disarmed);
            }
            ctx.journal("Wrong Code Entered");
            ctx.tone(ERROR_HZ, 0.5);
            ctx.entry.clear();
            ctx.show("Wrong Code!");
            return None;
        }
        _ => return None,
    }
    if let Some(remaining) = ctx
        .entry_delay
        .remaining_secs(ctx.now_ms, ctx.config.entry_delay_secs)
    {
        show_countdown(ctx, remaining);
    }
    None
}

fn show_countdown(ctx: &mut FsmContext, remaining_secs: u32) {
    let progress = ctx.entry.progress();
    ctx.show_fmt(format_args!("Entry {remaining_secs}s {progress}"));
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALARM — siren until a valid code is entered after `C`
// ═══════════════════════════════════════════════════════════════════════════

fn alarm_enter(ctx: &mut FsmContext) {
    ctx.journal("ALARM TRIGGERED");
    ctx.clear_episode();
    ctx.entry_delay.cancel();
    ctx.alarm = Default::default();
    ctx.announce(SecurityState::Alarm);
    warn!("ALARM: siren active");
}

fn alarm_update(ctx: &mut FsmContext) -> Option<SecurityState> {
    // Flash toggles every half period; the siren sounds on the lit half.
    let half_period = u64::from(ctx.config.alarm_pattern_period_ms / 2);
    let due = ctx
        .alarm
        .last_toggle_ms
        .is_none_or(|last| ctx.now_ms.saturating_sub(last) >= half_period);
    if due {
        ctx.alarm.last_toggle_ms = Some(ctx.now_ms);
        ctx.alarm.flash_on = !ctx.alarm.flash_on;
        if ctx.alarm.flash_on {
            ctx.indicate(Indicator::Red);
            ctx.tone(SIREN_HZ, 0.1);
        } else {
            ctx.indicate(Indicator::Off);
        }
    }

    if let Some(key) = ctx.key {
        match (ctx.alarm.phase, key) {
            (_, Key::C) => {
                ctx.alarm.phase = AlarmPhase::CodeEntry;
                ctx.entry.clear();
                ctx.pending = Some(PendingCommand::Disarm);
                ctx.notice_until_ms = None;
                ctx.show_code_prompt();
            }
            (AlarmPhase::CodeEntry, Key::Digit(d)) => {
                ctx.click();
                if ctx.entry.push_digit(d) {
                    ctx.show_code_prompt();
                }
            }
            (AlarmPhase::CodeEntry, Key::Star) => {
                ctx.entry.backspace();
                ctx.show_code_prompt();
            }
            (AlarmPhase::CodeEntry, Key::Hash) if ctx.entry.is_complete() => {
                if ctx.access_code.matches(&ctx.entry) {
                    info!("ALARM: disarmed");
                    ctx.journal("Alarm Disarmed");
                    return Some(SecurityState::Disarmed);
                }
                warn!("ALARM: wrong code");
                ctx.journal("Wrong Code Entry During Alarm");
                ctx.clear_episode();
                ctx.alarm.phase = AlarmPhase::Sounding;
                ctx.notice("Wrong Code!");
            }
            // Everything else, including panic, is ignored while sounding.
            _ => {}
        }
    }

    if ctx.notice_expired() {
        ctx.show(SecurityState::Alarm.status_text());
    }
    None
}
