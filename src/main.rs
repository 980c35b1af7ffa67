//! HomeGuard — host simulator entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimKeypad   GpioSensorBank   HostClock   ConsoleAnnunciator   │
//! │  (Keypad)    (Sensor)         (Clock)     (Annunciator)        │
//! │  FileEventLog   JsonConfigFile   LogEventSink                  │
//! │  (EventLog)     (Config)         (EventSink)                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            AlarmService (pure logic)                   │    │
//! │  │  Monitor · FSM · Journal                               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Console lines drive the simulated board: keypad strings such as
//! `B2580#`, or `door open`, `pir ext on`, `dist 8`, `dist none`, `quit`.
//!
//! `homeguard check-config` validates the stored configuration, checks that
//! the configured event log can be opened, and exits.

use std::io::BufRead;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use homeguard::adapters::config_store::{JsonConfigFile, load_or_default};
use homeguard::adapters::console::ConsoleAnnunciator;
use homeguard::adapters::event_file::FileEventLog;
use homeguard::adapters::log_sink::LogEventSink;
use homeguard::adapters::sim::{SimCommand, SimHandles, sim_board};
use homeguard::adapters::time::HostClock;
use homeguard::app::ports::{ConfigPort, EventLogPort};
use homeguard::app::service::{AlarmService, Ports};
use homeguard::config::SystemConfig;

const DEFAULT_CONFIG_PATH: &str = "homeguard.json";

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

/// Strict load: any missing, corrupt or invalid config is an error, and so
/// is an event log path that cannot be opened for append.
fn check_config(store: &JsonConfigFile) -> homeguard::Result<SystemConfig> {
    let config = store.load()?;
    FileEventLog::new(&config.event_log_path).init()?;
    Ok(config)
}

/// Feed console lines into the simulated board until EOF or `quit`.
fn spawn_console(handles: SimHandles) -> Result<()> {
    thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match SimCommand::parse(&line) {
                    Some(cmd) => handles.apply(&cmd),
                    None => warn!("unrecognised input: {line:?}"),
                }
                if handles.quit_requested() {
                    break;
                }
            }
        })
        .context("spawning console thread")?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    info!("HomeGuard v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration ──────────────────────────────────────
    let config_path =
        std::env::var("HOMEGUARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let store = JsonConfigFile::new(&config_path);

    if std::env::args().nth(1).as_deref() == Some("check-config") {
        let config = check_config(&store)
            .with_context(|| format!("checking {config_path}"))?;
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let config = load_or_default(&store);

    // ── 2. Simulated board ────────────────────────────────────
    let (handles, keypad, sensors) = sim_board();
    spawn_console(handles.clone())?;

    let ports = Ports {
        keypad,
        sensors,
        clock: HostClock::new(),
        annunciator: ConsoleAnnunciator::stdout(),
        event_log: FileEventLog::new(&config.event_log_path),
    };

    // ── 3. Run ────────────────────────────────────────────────
    let poll = Duration::from_millis(u64::from(config.poll_interval_ms));
    let mut service = AlarmService::new(config, ports);
    let mut sink = LogEventSink::new();
    service.start(&mut sink);

    while !handles.quit_requested() {
        service.tick(&mut sink);
        thread::sleep(poll);
    }

    info!(
        "shutting down in {:?} after {} ticks",
        service.state(),
        service.tick_count()
    );
    Ok(())
}
