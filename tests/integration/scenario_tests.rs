//! End-to-end scenarios: keypad, sensors and time driven through the full
//! `AlarmService` pipeline with a fake clock.

use crate::mock_hw::Rig;
use homeguard::app::events::AppEvent;
use homeguard::fsm::SecurityState;

/// Arm away, then open the door.  Returns the tick time of the door edge.
fn away_with_door_open(rig: &mut Rig) -> u64 {
    rig.arm('B');
    assert_eq!(rig.state(), SecurityState::ArmedAway);
    rig.advance(1_000);
    rig.set(|i| i.door = true);
    rig.tick();
    assert_eq!(rig.journal_count("Entry Started"), 1);
    rig.now_ms()
}

// ── Entry delay ───────────────────────────────────────────────

#[test]
fn door_then_code_within_delay_disarms() {
    let mut rig = Rig::new();
    let t0 = away_with_door_open(&mut rig);

    rig.advance_to(t0 + 5_000 - 250);
    rig.press("2580#");
    assert_eq!(rig.now_ms(), t0 + 5_000);

    assert_eq!(rig.state(), SecurityState::Disarmed);
    assert_eq!(rig.journal_count("Entry Started"), 1);
    assert_eq!(rig.journal_count("System Disarmed"), 1);
    assert_eq!(rig.journal_count("ALARM TRIGGERED"), 0);
    assert!(
        !rig.sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::StateChanged { to: SecurityState::Alarm, .. }))
    );
}

#[test]
fn no_code_alarms_at_thirty_seconds_then_wrong_and_right_code() {
    let mut rig = Rig::new();
    let t0 = away_with_door_open(&mut rig);

    rig.advance_to(t0 + 29_950);
    assert_eq!(rig.state(), SecurityState::ArmedAway);
    rig.tick();
    assert_eq!(rig.state(), SecurityState::Alarm);
    assert_eq!(rig.journal_count("Entry Delay Expired"), 1);

    rig.advance_to(t0 + 31_000 - 300);
    rig.press("C1111#");
    assert_eq!(rig.state(), SecurityState::Alarm);
    assert_eq!(rig.journal_count("Wrong Code Entry During Alarm"), 1);

    rig.advance_to(t0 + 35_000 - 300);
    rig.press("C2580#");
    assert_eq!(rig.state(), SecurityState::Disarmed);
    assert_eq!(rig.journal_count("Alarm Disarmed"), 1);
    assert_eq!(rig.journal_count("ALARM TRIGGERED"), 1);
}

#[test]
fn code_at_last_second_wins_race() {
    let mut rig = Rig::new();
    let t0 = away_with_door_open(&mut rig);

    rig.advance_to(t0 + 29_700);
    rig.press("2580");
    assert!(
        rig.last_status().is_some_and(|s| s.starts_with("Entry 1s")),
        "countdown should read 1s, got {:?}",
        rig.last_status()
    );
    rig.press("#");
    assert_eq!(rig.now_ms(), t0 + 29_950);
    assert_eq!(rig.state(), SecurityState::Disarmed);
    assert!(!rig.service.context().entry_delay.is_active());

    // Well past the original deadline: nothing fires late.
    rig.advance(10_000);
    assert_eq!(rig.state(), SecurityState::Disarmed);
    assert_eq!(rig.journal_count("ALARM TRIGGERED"), 0);
    assert_eq!(rig.journal_count("Entry Delay Expired"), 0);
}

#[test]
fn expiry_fires_exactly_once() {
    let mut rig = Rig::new();
    let t0 = away_with_door_open(&mut rig);

    rig.advance_to(t0 + 60_000);
    assert_eq!(rig.state(), SecurityState::Alarm);
    assert_eq!(rig.journal_count("Entry Delay Expired"), 1);
    assert_eq!(rig.journal_count("ALARM TRIGGERED"), 1);
    let alarms = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::StateChanged { to: SecurityState::Alarm, .. }))
        .count();
    assert_eq!(alarms, 1);
}

#[test]
fn countdown_redraws_once_per_second() {
    let mut rig = Rig::new();
    let t0 = away_with_door_open(&mut rig);
    rig.clear_panel();

    rig.advance_to(t0 + 3_000);
    let countdown: Vec<_> = rig
        .statuses()
        .into_iter()
        .filter(|s| s.starts_with("Entry "))
        .collect();
    assert_eq!(countdown, ["Entry 29s ____", "Entry 28s ____", "Entry 27s ____"]);
}

#[test]
fn interior_motion_during_entry_delay_is_ignored() {
    let mut rig = Rig::new();
    let t0 = away_with_door_open(&mut rig);

    rig.set(|i| i.interior = true);
    rig.advance_to(t0 + 10_000);
    assert_eq!(rig.state(), SecurityState::ArmedAway);
    assert_eq!(rig.journal_count("Motion Detected!"), 0);
}

#[test]
fn rearming_gets_a_fresh_delay() {
    let mut rig = Rig::new();
    let t0 = away_with_door_open(&mut rig);
    rig.advance_to(t0 + 20_000);
    rig.press("2580#");
    assert_eq!(rig.state(), SecurityState::Disarmed);

    rig.set(|i| i.door = false);
    rig.tick();
    rig.arm('B');
    rig.set(|i| i.door = true);
    rig.tick();
    let t1 = rig.now_ms();

    // The first window's start must not carry over.
    rig.advance_to(t1 + 29_950);
    assert_eq!(rig.state(), SecurityState::ArmedAway);
    rig.tick();
    assert_eq!(rig.state(), SecurityState::Alarm);
}

// ── Disarmed idempotence ──────────────────────────────────────

#[test]
fn disarm_while_disarmed_stays_and_logs() {
    let mut rig = Rig::new();
    let events_before = rig.sink.events.len();

    rig.press("C2580#");
    assert_eq!(rig.state(), SecurityState::Disarmed);
    assert_eq!(rig.journal_count("System Disarmed"), 1);
    assert_eq!(rig.last_status().as_deref(), Some("DISARMED"));
    // Same state: no StateChanged event.
    assert_eq!(rig.sink.events.len(), events_before);
}

// ── Proximity ─────────────────────────────────────────────────

#[test]
fn hysteresis_sequence_yields_two_alerts_in_home_mode() {
    let mut rig = Rig::new();
    rig.arm('A');
    assert_eq!(rig.state(), SecurityState::ArmedHome);

    for cm in [15.0, 9.0, 11.0, 13.0, 8.0] {
        rig.set(|i| i.distance_cm = cm);
        rig.advance(1_000);
    }

    assert_eq!(rig.journal_count("Proximity Alert"), 2);
    assert_eq!(rig.state(), SecurityState::ArmedHome);
}

#[test]
fn proximity_alerts_are_rate_limited() {
    let mut rig = Rig::new();
    rig.arm('A');

    // In, out, in again within 200 ms: the second entry is suppressed.
    rig.set(|i| i.distance_cm = 5.0);
    rig.advance(100);
    rig.set(|i| i.distance_cm = 50.0);
    rig.advance(100);
    rig.set(|i| i.distance_cm = 5.0);
    rig.advance(100);
    assert_eq!(rig.journal_count("Proximity Alert"), 1);
}

#[test]
fn window_breach_alarms_in_away_mode() {
    let mut rig = Rig::new();
    rig.arm('B');
    rig.set(|i| i.distance_cm = 6.0);
    rig.advance(200);
    assert_eq!(rig.state(), SecurityState::Alarm);
    assert_eq!(rig.journal_count("Window Breach!"), 1);
}

// ── Home / away asymmetry ─────────────────────────────────────

#[test]
fn home_mode_ignores_interior_motion() {
    let mut rig = Rig::new();
    rig.arm('A');
    rig.set(|i| i.interior = true);
    rig.advance(2_000);
    assert_eq!(rig.state(), SecurityState::ArmedHome);

    rig.set(|i| i.exterior = true);
    rig.tick();
    assert_eq!(rig.state(), SecurityState::Alarm);
    assert_eq!(rig.journal_count("Outside Motion!"), 1);
}

#[test]
fn away_mode_alarms_on_interior_motion() {
    let mut rig = Rig::new();
    rig.arm('B');
    rig.set(|i| i.interior = true);
    rig.tick();
    assert_eq!(rig.state(), SecurityState::Alarm);
    assert_eq!(rig.journal_count("Motion Detected!"), 1);
}

#[test]
fn home_mode_door_chimes_without_alarm() {
    let mut rig = Rig::new();
    rig.arm('A');
    rig.set(|i| i.door = true);
    rig.tick();
    assert_eq!(rig.state(), SecurityState::ArmedHome);
    assert_eq!(rig.journal_count("Door Opened"), 1);

    // Held open: no repeat.
    rig.advance(3_000);
    assert_eq!(rig.journal_count("Door Opened"), 1);
}

// ── Panic ─────────────────────────────────────────────────────

#[test]
fn panic_from_every_non_alarm_state_clears_buffer() {
    for arm in [None, Some('A'), Some('B')] {
        let mut rig = Rig::new();
        if let Some(command) = arm {
            rig.arm(command);
        }
        let from = rig.state();

        rig.press("C25");
        assert_eq!(rig.service.context().entry.len(), 2);
        rig.press("D");

        assert_eq!(rig.state(), SecurityState::Alarm, "panic from {from:?}");
        let ctx = rig.service.context();
        assert!(ctx.entry.is_empty());
        assert!(ctx.pending.is_none());
        assert_eq!(rig.journal_count("Panic Button Pressed"), 1);
    }
}

#[test]
fn alarm_ignores_everything_but_c() {
    let mut rig = Rig::new();
    rig.press("D");
    rig.press("2580#D");
    assert_eq!(rig.state(), SecurityState::Alarm);
    assert!(rig.service.context().entry.is_empty());
    assert_eq!(rig.journal_count("ALARM TRIGGERED"), 1);
}

// ── Wrong codes ───────────────────────────────────────────────

#[test]
fn wrong_code_keeps_command_pending() {
    let mut rig = Rig::new();
    rig.press("B1234#");
    assert_eq!(rig.state(), SecurityState::Disarmed);
    assert_eq!(rig.journal_count("Wrong Code Entered"), 1);

    // No need to press B again.
    rig.press("2580#");
    assert_eq!(rig.state(), SecurityState::ArmedAway);
}

#[test]
fn repeated_wrong_codes_never_lock_out() {
    let mut rig = Rig::new();
    rig.press("D");
    for _ in 0..10 {
        rig.press("C9999#");
    }
    assert_eq!(rig.journal_count("Wrong Code Entry During Alarm"), 10);
    rig.press("C2580#");
    assert_eq!(rig.state(), SecurityState::Disarmed);
}
