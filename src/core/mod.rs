//! Startup coordination with the emulator process.

pub mod readiness;
