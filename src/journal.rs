//! Timestamped event journal on top of [`EventLogPort`].
//!
//! Each entry is one line, `YYYY-MM-DD HH:MM:SS - <text>\n`.  If the log
//! cannot be initialised the journal degrades: every later write is
//! skipped, and the alarm keeps running.

use core::fmt::Write as _;

use heapless::String;
use log::{debug, warn};

use crate::app::ports::{EventLogPort, WallTime};
use crate::error::LogError;

/// Longest journal line, newline included.
pub const LINE_CAPACITY: usize = 128;

pub type JournalLine = String<LINE_CAPACITY>;

/// Format one journal line.
pub fn format_line(at: &WallTime, text: &str) -> Result<JournalLine, LogError> {
    let mut line = JournalLine::new();
    writeln!(line, "{at} - {text}").map_err(|_| LogError::LineTooLong)?;
    Ok(line)
}

#[derive(Debug, Default)]
pub struct Journal {
    degraded: bool,
    written: u32,
    skipped: u32,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialise the backing log.  On failure the journal is degraded for
    /// the rest of the run and the error is returned once.
    pub fn init(&mut self, log: &mut impl EventLogPort) -> Result<(), LogError> {
        log.init().inspect_err(|e| {
            warn!("event log init failed ({e}); journal disabled");
            self.degraded = true;
        })
    }

    /// Append `text` stamped with `at`.  Failures are skipped.
    pub fn record(&mut self, log: &mut impl EventLogPort, at: &WallTime, text: &str) {
        if self.degraded {
            self.skipped += 1;
            return;
        }
        let result = format_line(at, text).and_then(|line| log.append(&line));
        match result {
            Ok(()) => self.written += 1,
            Err(e) => {
                debug!("journal write skipped: {e}");
                self.skipped += 1;
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Lines successfully appended.
    pub fn written(&self) -> u32 {
        self.written
    }

    /// Lines dropped (degraded or write error).
    pub fn skipped(&self) -> u32 {
        self.skipped
    }
}
