//! # Panel Logic
//!
//! Device-side behavior above the wire protocol.
//!
//! This module handles:
//! - The static button binding table (capability-gated)
//! - Edge detection and dispatch from polled button reports
//! - The simulation-value cache and its projection onto the displays
//! - The retry-on-failure write wrapper

pub mod bindings;
pub mod buttons;
pub mod projector;
pub mod writer;
