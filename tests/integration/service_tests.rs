//! `AlarmService` plumbing: startup, journal, annunciator timing and the
//! sensor sampling gates.

use crate::mock_hw::{PanelCall, Rig};
use homeguard::app::events::AppEvent;
use homeguard::error::LogError;
use homeguard::fsm::SecurityState;
use homeguard::fsm::context::Indicator;

fn tone(freq_hz: f32, duration_secs: f32) -> PanelCall {
    PanelCall::Tone {
        freq_hz,
        duration_secs,
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_self_test_then_disarmed() {
    let rig = Rig::new();
    let panel = rig.panel();

    assert_eq!(
        panel[..6],
        [
            PanelCall::Indicator(Indicator::Red),
            PanelCall::Indicator(Indicator::Green),
            PanelCall::Indicator(Indicator::Blue),
            tone(440.0, 0.1),
            tone(880.0, 0.1),
            PanelCall::Status("Ready".into()),
        ]
    );
    assert_eq!(panel[6], PanelCall::Status("DISARMED".into()));
    assert_eq!(panel[7], PanelCall::Indicator(Indicator::Green));

    assert_eq!(rig.state(), SecurityState::Disarmed);
    assert_eq!(
        rig.sink.events,
        [AppEvent::Started(SecurityState::Disarmed)]
    );
    assert_eq!(rig.journal(), ["System Started"]);
}

#[test]
fn log_init_failure_degrades_but_runs() {
    let mut rig = Rig::with_failing_log();

    assert_eq!(
        rig.statuses().first().map(String::as_str),
        Some("Log Init Failed!")
    );
    assert_eq!(
        rig.sink.events,
        [
            AppEvent::JournalDegraded(LogError::OpenFailed),
            AppEvent::Started(SecurityState::Disarmed),
        ]
    );
    assert!(rig.service.journal().is_degraded());

    rig.arm('A');
    assert_eq!(rig.state(), SecurityState::ArmedHome);
    assert!(rig.lines().is_empty());
    assert_eq!(rig.service.journal().skipped(), 1);
}

// ── Journal ───────────────────────────────────────────────────

#[test]
fn journal_lines_are_timestamped() {
    let mut rig = Rig::new();
    rig.advance(61_950);
    rig.arm('B');

    let lines = rig.lines();
    assert_eq!(lines[0], "2025-01-01 00:00:00 - System Started\n");
    assert_eq!(
        lines[1],
        "2025-01-01 00:01:02 - System Armed - Away Mode\n"
    );
    assert_eq!(rig.service.journal().written(), 2);
}

#[test]
fn transitions_emit_state_changed() {
    let mut rig = Rig::new();
    rig.arm('A');
    rig.press("D");
    rig.press("C2580#");

    let changes: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        [
            (SecurityState::Disarmed, SecurityState::ArmedHome),
            (SecurityState::ArmedHome, SecurityState::Alarm),
            (SecurityState::Alarm, SecurityState::Disarmed),
        ]
    );
}

// ── Annunciator timing ────────────────────────────────────────

#[test]
fn clock_line_refreshes_once_per_second() {
    let mut rig = Rig::new();
    let clocks = |rig: &Rig| {
        rig.panel()
            .iter()
            .filter(|c| matches!(c, PanelCall::Clock(_)))
            .count()
    };
    assert_eq!(clocks(&rig), 1);
    rig.advance(3_000);
    assert_eq!(clocks(&rig), 4);
}

#[test]
fn siren_flashes_on_half_period() {
    let mut rig = Rig::new();
    rig.press("D");
    rig.clear_panel();
    rig.advance(1_000);

    let panel = rig.panel();
    let flashes: Vec<_> = panel
        .iter()
        .filter_map(|c| match c {
            PanelCall::Indicator(i) => Some(*i),
            _ => None,
        })
        .collect();
    // 200 ms period: a toggle every 100 ms.
    assert_eq!(flashes.len(), 10);
    assert!(
        flashes
            .windows(2)
            .all(|w| (w[0] == Indicator::Red) != (w[1] == Indicator::Red))
    );
    let sirens = panel
        .iter()
        .filter(|c| **c == tone(1760.0, 0.1))
        .count();
    assert_eq!(sirens, 5);
}

#[test]
fn door_notice_gives_way_to_status() {
    let mut rig = Rig::new();
    // The first reading only seeds the door memory.
    rig.tick();
    rig.set(|i| i.door = true);
    rig.tick();
    assert_eq!(rig.last_status().as_deref(), Some("Door Opened"));
    assert_eq!(rig.journal_count("Door Opened"), 1);

    rig.advance(1_000);
    assert_eq!(rig.last_status().as_deref(), Some("DISARMED"));
    assert_eq!(rig.state(), SecurityState::Disarmed);
}

#[test]
fn key_press_clicks_and_shows_prompt() {
    let mut rig = Rig::new();
    rig.clear_panel();
    rig.press("A2");
    let panel = rig.panel();
    assert!(panel.contains(&tone(1000.0, 0.05)));
    assert_eq!(rig.last_status().as_deref(), Some("Enter Code: *___"));
}

#[test]
fn wrong_code_notice_gives_way_to_armed_status() {
    let mut rig = Rig::new();
    rig.arm('A');
    assert_eq!(rig.state(), SecurityState::ArmedHome);

    rig.press("C0000#");
    assert_eq!(rig.last_status().as_deref(), Some("Wrong Code!"));
    rig.advance(1_500);
    assert_eq!(rig.last_status().as_deref(), Some("ARMED HOME"));

    // The disarm request is still pending.
    rig.press("2580#");
    assert_eq!(rig.state(), SecurityState::Disarmed);
}

// ── Sensor gates ──────────────────────────────────────────────

#[test]
fn distance_only_measured_while_armed_without_delay() {
    let mut rig = Rig::new();
    rig.advance(1_000);
    assert_eq!(rig.measurements(), 0);

    rig.arm('B');
    rig.advance(1_000);
    let armed = rig.measurements();
    // Every other 50 ms tick clears the 60 ms spacing.
    assert!((9..=11).contains(&armed), "got {armed}");

    rig.set(|i| i.door = true);
    rig.tick();
    let at_delay = rig.measurements();
    rig.advance(2_000);
    assert_eq!(rig.measurements(), at_delay);
}

#[test]
fn motion_while_disarmed_is_ignored() {
    let mut rig = Rig::new();
    rig.set(|i| {
        i.exterior = true;
        i.interior = true;
        i.distance_cm = 3.0;
    });
    rig.advance(2_000);
    assert_eq!(rig.state(), SecurityState::Disarmed);
    assert_eq!(rig.journal(), ["System Started"]);
}
