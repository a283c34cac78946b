//! # Indicator Flag Register
//!
//! Named boolean indicators, each bound to one byte slot and bit mask
//! inside the display frame payload.
//!
//! Several LCD legend groups (SPD/MACH selector, HDG/TRK/LAT selector, the
//! vertical legend, managed-mode dots, decimal points) are spread across
//! bytes that also carry digit segments; [`FlagRegister::compose`] collapses
//! all active flags into one OR-mask per byte slot so the frame builder can
//! fold them into the payload in a single pass.
//!
//! The binding table is fixed, but it is still validated when the register
//! is constructed: two flags sharing mask bits within one slot would
//! silently light each other's segments, so overlap is rejected as a
//! startup-time defect.

use crate::error::{FcuBridgeError, Result};

/// Byte positions inside the display frames that carry indicator bits.
///
/// `H*` bytes sit in the heading group, `A*` in the altitude group, `V*` in
/// the vertical-speed group, `S1` in the speed group. The `EfisRight*` /
/// `EfisLeft*` slots live in the secondary-panel frame instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum ByteSlot {
    H0 = 0,
    H3 = 1,
    A0 = 2,
    A1 = 3,
    A2 = 4,
    A3 = 5,
    A4 = 6,
    A5 = 7,
    V0 = 8,
    V1 = 9,
    V2 = 10,
    V3 = 11,
    S1 = 12,
    EfisRightB0 = 13,
    EfisRightB2 = 14,
    EfisLeftB0 = 15,
    EfisLeftB2 = 16,
}

/// Number of distinct byte slots.
pub const SLOT_COUNT: usize = 17;

/// Indicator flags the projector drives.
///
/// Grouped by the physical legend they light. The discriminant doubles as
/// the index into the register's value array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum FlagId {
    /// "SPD" half of the speed-window legend
    SpdLabel = 0,
    /// "MACH" half of the speed-window legend
    MachLabel = 1,
    /// "HDG" in the lateral legend
    LatHdg = 2,
    /// "TRK" in the lateral legend
    LatTrk = 3,
    /// "LAT" in the lateral legend (always lit)
    LatLabel = 4,
    /// "HDG" in the vertical legend
    VertHdg = 5,
    /// "V/S" in the vertical legend
    VertVs = 6,
    /// "TRK" in the vertical legend
    VertTrk = 7,
    /// "FPA" in the vertical legend
    VertFpa = 8,
    /// "ALT" label (always lit)
    AltLabel = 9,
    /// Heading managed-mode dot
    HdgManaged = 10,
    /// Speed managed-mode dot
    SpdManaged = 11,
    /// Altitude managed-mode dot
    AltManaged = 12,
    /// Horizontal bar of the V/S plus sign (always lit)
    VsPlusHorizontal = 13,
    /// Vertical bar of the V/S plus sign (lit while climbing)
    VsPlusVertical = 14,
    /// "LVL/CH" group, center segment (always lit)
    LvlChange = 15,
    /// "LVL/CH" group, left bracket (always lit)
    LvlChangeLeft = 16,
    /// "LVL/CH" group, right bracket (always lit)
    LvlChangeRight = 17,
    /// "V/S" next to the vertical-speed digits
    VsFpaVs = 18,
    /// "FPA" next to the vertical-speed digits
    VsFpaFpa = 19,
    /// Decimal point shown in FPA mode
    FpaComma = 20,
    /// Decimal point shown in Mach mode
    MachComma = 21,
    /// "QFE" badge on the secondary baro display
    QfeBadge = 22,
    /// "QNH" badge on the secondary baro display
    QnhBadge = 23,
    /// Decimal point on the secondary baro display (inHg mode)
    BaroDecimal = 24,
}

/// Number of flags in the register.
pub const FLAG_COUNT: usize = 25;

/// One flag's binding: target slot, mask within that slot's byte, and
/// whether the flag starts active.
#[derive(Debug, Clone, Copy)]
struct FlagDef {
    slot: ByteSlot,
    mask: u8,
    default: bool,
}

/// Flag bindings, indexed by [`FlagId`] discriminant.
///
/// The always-lit entries are legend segments the airplane never turns off;
/// they default active so a freshly constructed register already renders
/// them.
const FLAG_DEFS: [FlagDef; FLAG_COUNT] = [
    FlagDef { slot: ByteSlot::H3, mask: 0x08, default: false }, // SpdLabel
    FlagDef { slot: ByteSlot::H3, mask: 0x04, default: false }, // MachLabel
    FlagDef { slot: ByteSlot::H0, mask: 0x80, default: false }, // LatHdg
    FlagDef { slot: ByteSlot::H0, mask: 0x40, default: false }, // LatTrk
    FlagDef { slot: ByteSlot::H0, mask: 0x20, default: true },  // LatLabel
    FlagDef { slot: ByteSlot::A5, mask: 0x08, default: false }, // VertHdg
    FlagDef { slot: ByteSlot::A5, mask: 0x04, default: false }, // VertVs
    FlagDef { slot: ByteSlot::A5, mask: 0x02, default: false }, // VertTrk
    FlagDef { slot: ByteSlot::A5, mask: 0x01, default: false }, // VertFpa
    FlagDef { slot: ByteSlot::A4, mask: 0x10, default: true },  // AltLabel
    FlagDef { slot: ByteSlot::H0, mask: 0x10, default: false }, // HdgManaged
    FlagDef { slot: ByteSlot::H3, mask: 0x02, default: false }, // SpdManaged
    FlagDef { slot: ByteSlot::V1, mask: 0x10, default: false }, // AltManaged
    FlagDef { slot: ByteSlot::A0, mask: 0x10, default: true },  // VsPlusHorizontal
    FlagDef { slot: ByteSlot::V2, mask: 0x10, default: false }, // VsPlusVertical
    FlagDef { slot: ByteSlot::A2, mask: 0x10, default: true },  // LvlChange
    FlagDef { slot: ByteSlot::A3, mask: 0x10, default: true },  // LvlChangeLeft
    FlagDef { slot: ByteSlot::A1, mask: 0x10, default: true },  // LvlChangeRight
    FlagDef { slot: ByteSlot::V0, mask: 0x40, default: false }, // VsFpaVs
    FlagDef { slot: ByteSlot::V0, mask: 0x80, default: false }, // VsFpaFpa
    FlagDef { slot: ByteSlot::V3, mask: 0x10, default: false }, // FpaComma
    FlagDef { slot: ByteSlot::S1, mask: 0x01, default: false }, // MachComma
    FlagDef { slot: ByteSlot::EfisRightB0, mask: 0x01, default: false }, // QfeBadge
    FlagDef { slot: ByteSlot::EfisRightB0, mask: 0x02, default: false }, // QnhBadge
    FlagDef { slot: ByteSlot::EfisRightB2, mask: 0x80, default: false }, // BaroDecimal
];

/// Holds the current value of every indicator flag and composes them into
/// per-slot OR masks for the frame builder.
#[derive(Debug, Clone)]
pub struct FlagRegister {
    values: [bool; FLAG_COUNT],
}

impl FlagRegister {
    /// Build the register with default flag values.
    ///
    /// # Errors
    ///
    /// Returns [`FcuBridgeError::PanelTable`] if two flags claim overlapping
    /// mask bits within one slot.
    pub fn new() -> Result<Self> {
        validate_defs(&FLAG_DEFS)?;
        let mut values = [false; FLAG_COUNT];
        for (i, def) in FLAG_DEFS.iter().enumerate() {
            values[i] = def.default;
        }
        Ok(Self { values })
    }

    /// Set one flag.
    pub fn set(&mut self, id: FlagId, value: bool) {
        self.values[id as usize] = value;
    }

    /// Read one flag back.
    pub fn get(&self, id: FlagId) -> bool {
        self.values[id as usize]
    }

    /// OR every active flag's mask into its byte slot.
    ///
    /// Slots with no active flags yield zero. Must run after all flags for
    /// the current telemetry batch have been set and immediately before the
    /// frame is built; a composition taken mid-batch renders half-updated
    /// legend groups.
    pub fn compose(&self) -> [u8; SLOT_COUNT] {
        let mut slots = [0u8; SLOT_COUNT];
        for (i, def) in FLAG_DEFS.iter().enumerate() {
            if self.values[i] {
                slots[def.slot as usize] |= def.mask;
            }
        }
        slots
    }
}

/// Reject flag tables where two flags share mask bits within one slot.
fn validate_defs(defs: &[FlagDef]) -> Result<()> {
    let mut seen = [0u8; SLOT_COUNT];
    for (i, def) in defs.iter().enumerate() {
        let slot = def.slot as usize;
        if seen[slot] & def.mask != 0 {
            return Err(FcuBridgeError::PanelTable(format!(
                "flag {} mask {:#04x} overlaps slot {:?}",
                i, def.mask, def.slot
            )));
        }
        seen[slot] |= def.mask;
    }
    Ok(())
}
