//! Access code entry and validation.
//!
//! [`CodeEntry`] is the fixed-capacity digit buffer the user types into;
//! [`AccessCode`] is the provisioned reference value.  Validation is a
//! pure function of the two: no attempt counting, no lockout.

use heapless::{String, Vec};

use crate::config::CODE_LEN;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Code entry buffer
// ---------------------------------------------------------------------------

/// Ordered sequence of up to [`CODE_LEN`] ASCII digits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeEntry {
    digits: Vec<u8, CODE_LEN>,
}

impl CodeEntry {
    pub fn new() -> Self {
        Self { digits: Vec::new() }
    }

    /// Append an ASCII digit.  Returns `false` (and leaves the buffer
    /// untouched) for non-digits or when the buffer is already full.
    pub fn push_digit(&mut self, digit: u8) -> bool {
        if !digit.is_ascii_digit() {
            return false;
        }
        self.digits.push(digit).is_ok()
    }

    /// Remove the last digit.  No-op on an empty buffer.
    pub fn backspace(&mut self) {
        self.digits.pop();
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// True once exactly [`CODE_LEN`] digits are buffered.
    pub fn is_complete(&self) -> bool {
        self.digits.len() == CODE_LEN
    }

    /// Masked progress for the display: one `*` per typed digit, `_` for
    /// the rest (e.g. `"**__"`).
    pub fn progress(&self) -> String<CODE_LEN> {
        let mut s = String::new();
        for i in 0..CODE_LEN {
            let _ = s.push(if i < self.digits.len() { '*' } else { '_' });
        }
        s
    }

    fn as_bytes(&self) -> &[u8] {
        &self.digits
    }
}

// ---------------------------------------------------------------------------
// Provisioned code
// ---------------------------------------------------------------------------

/// The provisioned reference code.  Read-only once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessCode([u8; CODE_LEN]);

impl AccessCode {
    /// Parse a provisioned code; must be exactly four ASCII digits.
    pub fn parse(code: &str) -> Result<Self, ConfigError> {
        let bytes = code.as_bytes();
        if bytes.len() != CODE_LEN || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(ConfigError::ValidationFailed(
                "access_code must be exactly 4 ASCII digits",
            ));
        }
        let mut out = [0u8; CODE_LEN];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Exact-match check of a complete entry against this code.
    pub fn matches(&self, entry: &CodeEntry) -> bool {
        validate(entry, self)
    }
}

impl Default for AccessCode {
    fn default() -> Self {
        Self(*b"2580")
    }
}

// Never print the provisioned code.
impl core::fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AccessCode(****)")
    }
}

/// `true` iff `entry` holds exactly the provisioned digits.
///
/// Compares every byte without early exit so timing does not reveal how
/// many leading digits were right.
pub fn validate(entry: &CodeEntry, code: &AccessCode) -> bool {
    let typed = entry.as_bytes();
    if typed.len() != CODE_LEN {
        return false;
    }
    typed
        .iter()
        .zip(code.0.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
