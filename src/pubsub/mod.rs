//! Pub/Sub emulator client.
//!
//! This module covers the admin side of the Pub/Sub API needed to provision
//! a local environment:
//! - Topic existence checks and creation
//! - Pull subscription existence checks, deletion, and creation
//! - Dead letter policies

pub mod admin;
pub mod rest;

pub use admin::{PubsubAdmin, SubscriptionSpec};
pub use rest::RestAdmin;
