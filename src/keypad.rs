//! Keypad key identities.
//!
//! The 4×4 membrane keypad produces one of `[0-9A-D*#]`.  Matrix scanning
//! and debounce live behind [`KeypadPort`](crate::app::ports::KeypadPort);
//! this module only names the keys and their roles.
//!
//! ```text
//!   1 2 3 A     A = arm home     * = backspace
//!   4 5 6 B     B = arm away     # = confirm
//!   7 8 9 C     C = disarm
//!   * 0 # D     D = panic
//! ```

/// One debounced key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Numeric key; the payload is the ASCII digit (`b'0'..=b'9'`).
    Digit(u8),
    /// Arm home.
    A,
    /// Arm away.
    B,
    /// Disarm.
    C,
    /// Panic.
    D,
    /// Backspace.
    Star,
    /// Confirm.
    Hash,
}

impl Key {
    /// Parse a keypad character.  Anything outside `[0-9A-D*#]` is `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c as u8)),
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            '*' => Some(Self::Star),
            '#' => Some(Self::Hash),
            _ => None,
        }
    }

    /// The character printed on the keycap.
    pub fn as_char(self) -> char {
        match self {
            Self::Digit(d) => d as char,
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::Star => '*',
            Self::Hash => '#',
        }
    }

    /// The arm/disarm intent this key opens a code-entry episode for.
    pub fn command(self) -> Option<PendingCommand> {
        match self {
            Self::A => Some(PendingCommand::ArmHome),
            Self::B => Some(PendingCommand::ArmAway),
            Self::C => Some(PendingCommand::Disarm),
            _ => None,
        }
    }
}

/// Arm/disarm intent captured when the user starts entering a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCommand {
    ArmHome,
    ArmAway,
    Disarm,
}
