//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock collaborators.  All tests run on the host with no real
//! hardware required.

mod console_tests;
mod mock_hw;
