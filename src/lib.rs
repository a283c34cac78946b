//! # FCU Bridge Library
//!
//! Drive an Airbus-style FCU hardware panel from X-Plane autopilot state.
//!
//! This library provides the core functionality for mirroring autopilot
//! state onto the panel's LCDs and LEDs, and for feeding panel button
//! presses back into the simulation as dataref writes and commands.

pub mod config;
pub mod error;
pub mod panel;
pub mod protocol;
pub mod session;
pub mod sim;
pub mod transport;
