//! 4×4 matrix keypad scanner.
//!
//! ## Hardware
//!
//! Rows are outputs driven low one at a time; columns are inputs with
//! pull-ups, so a pressed key pulls its column low while its row is
//! selected.
//!
//! ## Debounce
//!
//! Non-blocking: every [`poll`](MatrixKeypad::poll) does one full matrix
//! sweep.  A key is reported once, after it has been seen on
//! `DEBOUNCE_SCANS` consecutive sweeps, and not again until every key
//! has been released.
//!
//! | State      | Condition                          | Next          |
//! |------------|------------------------------------|---------------|
//! | `Idle`     | key seen                           | `Settling`    |
//! | `Settling` | same key for `DEBOUNCE_SCANS`      | `Held` (emit) |
//! | `Settling` | different / no key                 | `Idle`        |
//! | `Held`     | no key                             | `Idle`        |

use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use crate::keypad::Key;

const DEBOUNCE_SCANS: u8 = 2;

/// Keycap layout, `[row][col]`.
const LAYOUT: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    Settling { key: Key, seen: u8 },
    Held,
}

pub struct MatrixKeypad<R, C> {
    rows: [R; 4],
    cols: [C; 4],
    state: ScanState,
}

impl<R, C> MatrixKeypad<R, C>
where
    R: OutputPin,
    C: InputPin,
{
    pub fn new(rows: [R; 4], cols: [C; 4]) -> Self {
        let mut keypad = Self {
            rows,
            cols,
            state: ScanState::Idle,
        };
        keypad.release_rows();
        keypad
    }

    /// One sweep.  Returns a key on its debounced press edge only.
    pub fn poll(&mut self) -> Option<Key> {
        let raw = self.sweep();
        match (self.state, raw) {
            (ScanState::Idle, Some(key)) => {
                self.state = ScanState::Settling { key, seen: 1 };
                self.settle()
            }
            (ScanState::Settling { key, seen }, Some(now)) if now == key => {
                self.state = ScanState::Settling {
                    key,
                    seen: seen.saturating_add(1),
                };
                self.settle()
            }
            (ScanState::Held, Some(_)) => None,
            (_, _) => {
                self.state = ScanState::Idle;
                None
            }
        }
    }

    fn settle(&mut self) -> Option<Key> {
        if let ScanState::Settling { key, seen } = self.state {
            if seen >= DEBOUNCE_SCANS {
                self.state = ScanState::Held;
                return Some(key);
            }
        }
        None
    }

    /// First pressed key in row-major order, if any.
    fn sweep(&mut self) -> Option<Key> {
        for row in 0..4 {
            if self.rows[row].set_low().is_err() {
                debug!("keypad: row {row} write failed");
                continue;
            }
            let hit = self
                .cols
                .iter_mut()
                .position(|col| col.is_low().unwrap_or(false));
            let _ = self.rows[row].set_high();
            if let Some(col) = hit {
                return Key::from_char(LAYOUT[row][col]);
            }
        }
        None
    }

    fn release_rows(&mut self) {
        for row in &mut self.rows {
            let _ = row.set_high();
        }
    }
}
