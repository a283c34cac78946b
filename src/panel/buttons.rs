//! # Button Event Detector
//!
//! Turns polled button-state reports into edge-triggered simulation
//! actions in three explicit stages: parse the report into a bitmask
//! snapshot, diff it against the previous snapshot into pending press /
//! release sets, then dispatch the pending edges in binding-table order.
//!
//! The poll is lossy by design: a malformed report (wrong length) discards
//! that cycle without touching the previous snapshot, so a short-lived bad
//! read cannot fabricate edges.

use tracing::{debug, warn};

use crate::error::{FcuBridgeError, Result};
use crate::panel::bindings::{ButtonAction, ButtonBinding, Target, BUTTON_BITS};
use crate::panel::projector::ValueCache;
use crate::sim::SimCommands;
use crate::transport::PanelCapabilities;

/// Valid button-state report length. Anything else is a malformed read.
pub const INPUT_REPORT_LEN: usize = 41;

/// 96 button bits in three 32-bit device sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMask([u32; 3]);

impl ButtonMask {
    pub fn bit(&self, index: usize) -> bool {
        self.0[index / 32] & (1 << (index % 32)) != 0
    }

    fn set(&mut self, index: usize) {
        self.0[index / 32] |= 1 << (index % 32);
    }

    fn clear(&mut self, index: usize) {
        self.0[index / 32] &= !(1 << (index % 32));
    }

    pub fn is_empty(&self) -> bool {
        self.0 == [0; 3]
    }
}

/// Parse a full-length input report into the 96-bit snapshot.
///
/// Sections of absent sub-panels stay zero, so their bindings can never
/// see an edge.
fn parse_report(report: &[u8], caps: PanelCapabilities) -> ButtonMask {
    let word = |offset: usize| {
        u32::from_le_bytes([
            report[offset],
            report[offset + 1],
            report[offset + 2],
            report[offset + 3],
        ])
    };

    let mut mask = ButtonMask::default();
    mask.0[0] = word(1);
    if caps.efis_right {
        mask.0[1] = word(9);
    }
    if caps.efis_left {
        mask.0[2] = word(5);
    }
    mask
}

/// Diffs successive snapshots and dispatches edges.
#[derive(Debug)]
pub struct ButtonEventDetector {
    caps: PanelCapabilities,
    last: ButtonMask,
    pending_press: ButtonMask,
    pending_release: ButtonMask,
}

impl ButtonEventDetector {
    pub fn new(caps: PanelCapabilities) -> Self {
        Self {
            caps,
            last: ButtonMask::default(),
            pending_press: ButtonMask::default(),
            pending_release: ButtonMask::default(),
        }
    }

    /// Stage 1 + 2: take a raw report, diff it against the last valid
    /// snapshot, and accumulate pending edges.
    ///
    /// # Errors
    ///
    /// Returns [`FcuBridgeError::MalformedReport`] for a wrong-length
    /// report. The previous snapshot is kept, so the next valid report is
    /// compared against the last *valid* state.
    pub fn observe(&mut self, report: &[u8]) -> Result<()> {
        if report.len() != INPUT_REPORT_LEN {
            return Err(FcuBridgeError::MalformedReport { len: report.len() });
        }

        let now = parse_report(report, self.caps);
        for bit in 0..BUTTON_BITS {
            match (self.last.bit(bit), now.bit(bit)) {
                (false, true) => self.pending_press.set(bit),
                (true, false) => self.pending_release.set(bit),
                _ => {}
            }
        }
        self.last = now;
        Ok(())
    }

    /// Stage 3: run every pending edge through its binding's action policy,
    /// in binding-table order, clearing each edge as it is consumed.
    ///
    /// Two buttons bound to mutually exclusive values can both fire in one
    /// poll cycle; table order decides who wins, so it must stay stable.
    ///
    /// Simulation write failures are logged and skipped; a lost button
    /// press is recoverable by pressing again, unlike a wedged poll loop.
    pub fn dispatch(
        &mut self,
        bindings: &[ButtonBinding],
        cache: &ValueCache,
        sim: &mut dyn SimCommands,
    ) {
        for binding in bindings {
            if self.pending_press.is_empty() && self.pending_release.is_empty() {
                break;
            }
            let Some(bit) = binding.bit else { continue };
            let bit = bit as usize;

            if self.pending_press.bit(bit) {
                self.pending_press.clear(bit);
                debug!(label = binding.label, "button pressed");
                if let Err(e) = press(binding, cache, sim) {
                    warn!(label = binding.label, error = %e, "press dispatch failed");
                }
            }
            if self.pending_release.bit(bit) {
                self.pending_release.clear(bit);
                debug!(label = binding.label, "button released");
                if let Err(e) = release(binding, sim) {
                    warn!(label = binding.label, error = %e, "release dispatch failed");
                }
            }
        }
    }
}

fn press(binding: &ButtonBinding, cache: &ValueCache, sim: &mut dyn SimCommands) -> Result<()> {
    match (binding.action, binding.target) {
        (ButtonAction::Toggle, Target::Value(key)) => {
            // invert whatever the simulation last reported; an unknown
            // value counts as off, so the first press turns it on
            let current = cache.value(key).unwrap_or(0) != 0;
            sim.write_value(key, if current { 0.0 } else { 1.0 })
        }
        (ButtonAction::Toggle, Target::Command(key)) => sim.send_command(key),
        (ButtonAction::Momentary, Target::Value(key)) => sim.write_value(key, 1.0),
        (ButtonAction::Momentary, Target::Command(key)) => sim.send_command(key),
        (ButtonAction::SetConstant(n), Target::Value(key)) => sim.write_value(key, n as f32),
        (ButtonAction::SetConstant(_), Target::Command(key)) => {
            warn!(label = binding.label, key, "constant action bound to a command, skipping edge");
            Ok(())
        }
        (ButtonAction::LedOnly, _) => {
            warn!(label = binding.label, "edge for an LED-only binding, skipping");
            Ok(())
        }
    }
}

fn release(binding: &ButtonBinding, sim: &mut dyn SimCommands) -> Result<()> {
    match (binding.action, binding.target) {
        (ButtonAction::Momentary, Target::Value(key)) => sim.write_value(key, 0.0),
        // only momentary switches carry release semantics
        _ => Ok(()),
    }
}
