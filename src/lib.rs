//! HomeGuard alarm controller library.
//!
//! Exposes the pure-logic core (FSM, monitor, access code, entry delay,
//! journal) and the port adapters for integration testing and for the
//! host simulator binary.

#![deny(unused_must_use)]

pub mod access;
pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod entry_delay;
pub mod error;
pub mod fsm;
pub mod journal;
pub mod keypad;
pub mod monitor;
pub mod sensors;

pub use error::{Error, Result};
