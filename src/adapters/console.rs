//! Console annunciator: the LCD, RGB LED and buzzer rendered as text.
//!
//! ```text
//! [LCD ] ARMED AWAY
//! [TIME] 2025-03-09 22:05:01
//! [LED ] Blue
//! [TONE] 880 Hz for 0.10 s
//! ```
//!
//! Writes are fire-and-forget; a broken output stream is only debug-logged.

use std::io::Write;

use log::debug;

use crate::app::ports::{AnnunciatorPort, WallTime};
use crate::fsm::context::Indicator;

pub struct ConsoleAnnunciator<W: Write> {
    out: W,
    /// Print clock refreshes.  Off by default.
    verbose_clock: bool,
}

impl ConsoleAnnunciator<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleAnnunciator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            verbose_clock: false,
        }
    }

    /// Print every clock refresh instead of dropping them.
    pub fn with_clock(mut self, verbose: bool) -> Self {
        self.verbose_clock = verbose;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, tag: &str, args: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "[{tag:<4}] {args}") {
            debug!("console: write failed: {e}");
        }
    }
}

impl<W: Write> AnnunciatorPort for ConsoleAnnunciator<W> {
    fn show_status(&mut self, text: &str) {
        self.line("LCD", format_args!("{text}"));
    }

    fn show_clock(&mut self, time: &WallTime) {
        if self.verbose_clock {
            self.line("TIME", format_args!("{time}"));
        }
    }

    fn set_indicator(&mut self, indicator: Indicator) {
        self.line("LED", format_args!("{indicator:?}"));
    }

    fn tone(&mut self, freq_hz: f32, duration_secs: f32) {
        self.line(
            "TONE",
            format_args!("{freq_hz:.0} Hz for {duration_secs:.2} s"),
        );
    }
}
