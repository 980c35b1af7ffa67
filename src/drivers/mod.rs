//! Peripheral drivers that sit below the port adapters.

pub mod matrix_keypad;
