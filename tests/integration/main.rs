//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with a fake clock and
//! no real hardware required.

mod mock_hw;
mod scenario_tests;
mod service_tests;
