//! # setup-pubsub-emulator
//!
//! One-shot provisioning for a local Pub/Sub emulator.
//!
//! Waits for the emulator port to open, then idempotently ensures a
//! dead-letter topic, a main topic, and a pull subscription with a
//! dead-letter policy exist. The subscription is always deleted and
//! recreated so its configuration is fresh.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod provision;
pub mod pubsub;
pub mod types;

pub use error::{Error, Result};
