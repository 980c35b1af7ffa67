//! Unified error types for the HomeGuard firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the top-level error handling uniform. All variants are `Copy` so they
//! can be passed through the monitor and FSM without allocation.
//!
//! None of these errors ever stops the poll loop: sensor errors become a
//! "no detection" reading inside the driver and never reach `Error`, log
//! errors degrade the journal, and config errors fall back to defaults.
//! `Error` itself is only returned by the binary's `check-config` path.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Failures surfaced to the operator by the host binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The event log could not be initialised or written.
    Log(LogError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Log(e) => write!(f, "event log: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// GPIO read returned an error.
    GpioReadFailed,
    /// GPIO write (ultrasonic trigger) returned an error.
    GpioWriteFailed,
    /// The echo pulse never started within the wait bound.
    EchoStartTimeout,
    /// The echo pulse did not end within the wait bound.
    EchoWidthTimeout,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::EchoStartTimeout => write!(f, "echo start timeout"),
            Self::EchoWidthTimeout => write!(f, "echo width timeout"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Event log errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogError {
    /// Storage medium missing or could not be mounted.
    Unavailable,
    /// The log file could not be opened for append.
    OpenFailed,
    /// Fewer bytes were written than requested.
    ShortWrite,
    /// The formatted line did not fit the line buffer.
    LineTooLong,
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::OpenFailed => write!(f, "open failed"),
            Self::ShortWrite => write!(f, "short write"),
            Self::LineTooLong => write!(f, "line too long"),
        }
    }
}

impl From<LogError> for Error {
    fn from(e: LogError) -> Self {
        Self::Log(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
