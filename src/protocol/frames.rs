//! # Frame Builder
//!
//! Assembles the fixed-layout USB frames the panel firmware understands.
//!
//! Three outgoing frame kinds exist:
//!
//! - **Display frame + commit frame** (64 bytes each): the four main LCD
//!   fields with indicator flags folded in, followed by a commit that makes
//!   the content visible. Both must be written, in order, for an update to
//!   take effect.
//! - **Secondary frame** (64 bytes): the right sub-panel's 4-digit baro
//!   field; carries its own embedded commit section.
//! - **LED frame** (14 bytes): one LED identifier plus an intensity byte.
//!
//! Every header constant below was captured from the device's own traffic;
//! none of it is negotiated. Payload offsets are fixed, so a length mismatch
//! between an encoded field and its slot in the frame cannot happen at
//! runtime: the encoders produce deterministic lengths per width and the
//! widths here are literals.

use super::flags::{ByteSlot, SLOT_COUNT};
use super::leds::{Led, LedPanel};
use super::segments;
use crate::error::Result;

/// Length of display, commit, secondary and init frames.
pub const DISPLAY_FRAME_LEN: usize = 64;

/// Length of an LED intensity frame.
pub const LED_FRAME_LEN: usize = 14;

/// Frame sequence byte. The firmware echoes but does not check it.
const SEQ: u8 = 0x01;

/// Device address of the main panel as it appears in frame headers.
const MAIN_ADDR: [u8; 2] = [0x10, 0xbb];

/// Device address of the right sub-panel.
const EFIS_RIGHT_ADDR: [u8; 2] = [0x0e, 0xbf];

/// The four main LCD fields, already formatted by the projector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFields {
    /// 3 digits, plain wiring
    pub speed: String,
    /// 3 digits, nibble-cascaded wiring
    pub heading: String,
    /// 5 digits, nibble-cascaded wiring
    pub altitude: String,
    /// 4 digits, nibble-cascaded wiring
    pub vertical_speed: String,
}

/// Build the display frame and its commit frame.
///
/// # Arguments
///
/// * `fields` - Formatted field strings
/// * `slots` - Composed flag masks from [`FlagRegister::compose`]
///
/// # Returns
///
/// * `Result<(Vec<u8>, Vec<u8>)>` - (content frame, commit frame), both 64
///   bytes; write them back to back
///
/// # Errors
///
/// Rejects the whole update if any field contains a character without a
/// segment pattern — a half-encoded frame is never produced.
///
/// [`FlagRegister::compose`]: super::flags::FlagRegister::compose
pub fn build_display_frames(
    fields: &DisplayFields,
    slots: &[u8; SLOT_COUNT],
) -> Result<(Vec<u8>, Vec<u8>)> {
    let s = segments::encode(3, &fields.speed)?;
    let h = segments::encode_swapped(3, &fields.heading)?;
    let a = segments::encode_swapped(5, &fields.altitude)?;
    let v = segments::encode_swapped(4, &fields.vertical_speed)?;
    debug_assert_eq!((s.len(), h.len(), a.len(), v.len()), (3, 4, 6, 5));

    let mut frame = vec![0u8; DISPLAY_FRAME_LEN];
    frame[..18].copy_from_slice(&[
        0xf0, 0x00, SEQ, 0x31, MAIN_ADDR[0], MAIN_ADDR[1], 0x00, 0x00, 0x02, 0x01, 0x00, 0x00,
        0xff, 0xff, 0x02, 0x00, 0x00, 0x20,
    ]);

    frame[25] = s[2];
    frame[26] = s[1] | slots[ByteSlot::S1 as usize];
    frame[27] = s[0];
    frame[28] = h[3] | slots[ByteSlot::H3 as usize];
    frame[29] = h[2];
    frame[30] = h[1];
    frame[31] = h[0] | slots[ByteSlot::H0 as usize];
    frame[32] = a[5] | slots[ByteSlot::A5 as usize];
    frame[33] = a[4] | slots[ByteSlot::A4 as usize];
    frame[34] = a[3] | slots[ByteSlot::A3 as usize];
    frame[35] = a[2] | slots[ByteSlot::A2 as usize];
    frame[36] = a[1] | slots[ByteSlot::A1 as usize];
    // the vertical-speed group's spill byte shares this position with the
    // altitude group's rightmost digit
    frame[37] = a[0] | v[4] | slots[ByteSlot::A0 as usize];
    frame[38] = v[3] | slots[ByteSlot::V3 as usize];
    frame[39] = v[2] | slots[ByteSlot::V2 as usize];
    frame[40] = v[1] | slots[ByteSlot::V1 as usize];
    frame[41] = v[0] | slots[ByteSlot::V0 as usize];

    Ok((frame, build_commit_frame()))
}

/// The commit frame that latches a previously written display frame.
fn build_commit_frame() -> Vec<u8> {
    let mut frame = vec![0u8; DISPLAY_FRAME_LEN];
    frame[..15].copy_from_slice(&[
        0xf0, 0x00, SEQ, 0x11, MAIN_ADDR[0], MAIN_ADDR[1], 0x00, 0x00, 0x03, 0x01, 0x00, 0x00,
        0xff, 0xff, 0x02,
    ]);
    frame
}

/// Build the secondary (right sub-panel) baro display frame.
///
/// Unlike the main display this frame carries its own commit section, so a
/// single write updates the sub-panel.
///
/// # Errors
///
/// Same glyph rejection as [`build_display_frames`].
pub fn build_secondary_frame(baro: &str, slots: &[u8; SLOT_COUNT]) -> Result<Vec<u8>> {
    let b = segments::encode_swapped_secondary(4, baro)?;
    debug_assert_eq!(b.len(), 4);

    let mut frame = vec![0u8; DISPLAY_FRAME_LEN];
    frame[..18].copy_from_slice(&[
        0xf0, 0x00, SEQ, 0x1a, EFIS_RIGHT_ADDR[0], EFIS_RIGHT_ADDR[1], 0x00, 0x00, 0x02, 0x01,
        0x00, 0x00, 0xff, 0xff, 0x1d, 0x00, 0x00, 0x09,
    ]);

    frame[25] = b[3];
    frame[26] = b[2] | slots[ByteSlot::EfisRightB2 as usize];
    frame[27] = b[1];
    frame[28] = b[0];
    frame[29] = slots[ByteSlot::EfisRightB0 as usize];

    // embedded commit section
    frame[30..41].copy_from_slice(&[
        EFIS_RIGHT_ADDR[0], EFIS_RIGHT_ADDR[1], 0x00, 0x00, 0x03, 0x01, 0x00, 0x00, 0x4c, 0x0c,
        0x1d,
    ]);

    Ok(frame)
}

/// Build a single-LED intensity frame.
///
/// # Returns
///
/// `None` for LEDs in the secondary-left partition — the firmware does not
/// implement that range, so there is nothing to send. Sub-panel LED ids are
/// carried minus their 100 offset.
pub fn build_led_frame(led: Led, value: u8) -> Option<Vec<u8>> {
    let (addr, id) = match led.panel() {
        LedPanel::Main => (MAIN_ADDR, led.id() as u8),
        LedPanel::EfisRight => (EFIS_RIGHT_ADDR, (led.id() - 100) as u8),
        LedPanel::EfisLeft => return None,
    };

    let mut frame = vec![0u8; LED_FRAME_LEN];
    frame[..9].copy_from_slice(&[0x02, addr[0], addr[1], 0x00, 0x00, 0x03, 0x49, id, value]);
    Some(frame)
}

/// The wake-up frame written once before the first display update.
pub fn build_init_frame() -> Vec<u8> {
    let mut frame = vec![0u8; DISPLAY_FRAME_LEN];
    frame[0] = 0xf0;
    frame[1] = 0x02;
    frame
}
