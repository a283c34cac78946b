//! # Button Binding Table
//!
//! The static mapping from hardware button bits to simulation actions,
//! built once from the attached panel's capabilities and then treated as
//! immutable.
//!
//! Bit index layout across the 96-bit button space:
//!
//! | Bits | Section |
//! |-------|---------|
//! | 0–31 | core panel |
//! | 32–63 | secondary right sub-panel |
//! | 64–95 | secondary left sub-panel |
//!
//! Entries without a bit index never receive edges; they exist to tie a
//! simulation variable to one or more LEDs (brightness rheostats,
//! annunciator state).

use crate::error::{FcuBridgeError, Result};
use crate::protocol::leds::Led;
use crate::sim::datarefs;
use crate::transport::PanelCapabilities;

/// Number of button bit positions across all sections.
pub const BUTTON_BITS: usize = 96;

/// What a dispatched edge acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A writable simulation variable
    Value(&'static str),
    /// A fire-once simulator command
    Command(&'static str),
}

impl Target {
    /// The dataref/command key regardless of kind.
    pub fn key(&self) -> &'static str {
        match self {
            Target::Value(key) | Target::Command(key) => key,
        }
    }
}

/// Per-button edge semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Press inverts the cached value (or fires the command); release ignored
    Toggle,
    /// Press writes 1 (or fires the command), release writes 0
    Momentary,
    /// Press writes the literal constant; release ignored
    SetConstant(u8),
    /// Never dispatched; the entry only feeds LEDs
    LedOnly,
}

/// One row of the binding table.
#[derive(Debug, Clone, Copy)]
pub struct ButtonBinding {
    /// Bit index in the 96-bit button space, absent for LED-only rows
    pub bit: Option<u8>,
    /// Panel silkscreen label
    pub label: &'static str,
    pub target: Target,
    pub action: ButtonAction,
    /// LEDs driven by the target value's telemetry
    pub leds: &'static [Led],
}

fn cmd_toggle(bit: u8, label: &'static str, command: &'static str) -> ButtonBinding {
    ButtonBinding {
        bit: Some(bit),
        label,
        target: Target::Command(command),
        action: ButtonAction::Toggle,
        leds: &[],
    }
}

fn value_toggle(
    bit: u8,
    label: &'static str,
    key: &'static str,
    leds: &'static [Led],
) -> ButtonBinding {
    ButtonBinding {
        bit: Some(bit),
        label,
        target: Target::Value(key),
        action: ButtonAction::Toggle,
        leds,
    }
}

fn value_set(bit: u8, label: &'static str, key: &'static str, n: u8) -> ButtonBinding {
    ButtonBinding {
        bit: Some(bit),
        label,
        target: Target::Value(key),
        action: ButtonAction::SetConstant(n),
        leds: &[],
    }
}

fn led_only(label: &'static str, key: &'static str, leds: &'static [Led]) -> ButtonBinding {
    ButtonBinding {
        bit: None,
        label,
        target: Target::Value(key),
        action: ButtonAction::LedOnly,
        leds,
    }
}

/// Build the binding table for the attached panel variant.
///
/// # Errors
///
/// Returns [`FcuBridgeError::PanelTable`] if a bit index repeats or falls
/// outside the 96-bit space — either would mean two buttons fighting over
/// one edge.
pub fn build_bindings(caps: PanelCapabilities) -> Result<Vec<ButtonBinding>> {
    let mut table = vec![
        cmd_toggle(0, "MACH", "toliss_airbus/ias_mach_button_push"),
        cmd_toggle(1, "LOC", "AirbusFBW/LOCbutton"),
        cmd_toggle(2, "TRK", "toliss_airbus/hdgtrk_button_push"),
        value_toggle(3, "AP1", "AirbusFBW/AP1Engage", &[Led::Ap1Green]),
        value_toggle(4, "AP2", "AirbusFBW/AP2Engage", &[Led::Ap2Green]),
        cmd_toggle(5, "A/THR", "AirbusFBW/ATHRbutton"),
        cmd_toggle(6, "EXPED", "AirbusFBW/EXPEDbutton"),
        cmd_toggle(7, "METRIC", "toliss_airbus/metric_alt_button_push"),
        cmd_toggle(8, "APPR", "AirbusFBW/APPRbutton"),
        cmd_toggle(9, "SPD DEC", "sim/autopilot/airspeed_down"),
        cmd_toggle(10, "SPD INC", "sim/autopilot/airspeed_up"),
        cmd_toggle(11, "SPD PUSH", "AirbusFBW/PushSPDSel"),
        cmd_toggle(12, "SPD PULL", "AirbusFBW/PullSPDSel"),
        cmd_toggle(13, "HDG DEC", "sim/autopilot/heading_down"),
        cmd_toggle(14, "HDG INC", "sim/autopilot/heading_up"),
        cmd_toggle(15, "HDG PUSH", "AirbusFBW/PushHDGSel"),
        cmd_toggle(16, "HDG PULL", "AirbusFBW/PullHDGSel"),
        cmd_toggle(17, "ALT DEC", "sim/autopilot/altitude_down"),
        cmd_toggle(18, "ALT INC", "sim/autopilot/altitude_up"),
        cmd_toggle(19, "ALT PUSH", "AirbusFBW/PushAltitude"),
        cmd_toggle(20, "ALT PULL", "AirbusFBW/PullAltitude"),
        cmd_toggle(21, "VS DEC", "sim/autopilot/vertical_speed_down"),
        cmd_toggle(22, "VS INC", "sim/autopilot/vertical_speed_up"),
        cmd_toggle(23, "VS PUSH", "AirbusFBW/PushVSSel"),
        cmd_toggle(24, "VS PULL", "AirbusFBW/PullVSSel"),
        value_set(25, "ALT 100", "AirbusFBW/ALT100_1000", 0),
        value_set(26, "ALT 1000", "AirbusFBW/ALT100_1000", 1),
        led_only(
            "BRIGHT",
            datarefs::RHEOSTAT_PANEL,
            &[
                Led::Backlight,
                Led::EfisRightBacklight,
                Led::FlagGreen,
                Led::EfisRightFlagGreen,
            ],
        ),
        led_only(
            "BRIGHT LCD",
            datarefs::RHEOSTAT_LCD,
            &[Led::ScreenBacklight, Led::EfisRightScreenBacklight],
        ),
        led_only("APPR LED", "AirbusFBW/APPRilluminated", &[Led::ApprGreen]),
        led_only("ATHR LED", "AirbusFBW/ATHRmode", &[Led::AthrGreen]),
        led_only("LOC LED", "AirbusFBW/LOCilluminated", &[Led::LocGreen]),
    ];

    if caps.efis_right {
        table.extend([
            cmd_toggle(32, "R FD", "toliss_airbus/fd2_push"),
            cmd_toggle(33, "R LS", "toliss_airbus/dispcommands/CoLSButtonPush"),
            cmd_toggle(34, "R CSTR", "toliss_airbus/dispcommands/CoCstrPushButton"),
            cmd_toggle(35, "R WPT", "toliss_airbus/dispcommands/CoWptPushButton"),
            cmd_toggle(36, "R VOR.D", "toliss_airbus/dispcommands/CoVorDPushButton"),
            cmd_toggle(37, "R NDB", "toliss_airbus/dispcommands/CoNdbPushButton"),
            cmd_toggle(38, "R ARPT", "toliss_airbus/dispcommands/CoArptPushButton"),
            cmd_toggle(39, "R STD PUSH", "toliss_airbus/copilot_baro_push"),
            cmd_toggle(40, "R STD PULL", "toliss_airbus/copilot_baro_pull"),
            cmd_toggle(41, "R PRESS DEC", "sim/instruments/barometer_copilot_down"),
            cmd_toggle(42, "R PRESS INC", "sim/instruments/barometer_copilot_up"),
            value_set(43, "R inHg", datarefs::BARO_UNIT_FO, 0),
            value_set(44, "R hPa", datarefs::BARO_UNIT_FO, 1),
            value_set(45, "R MODE LS", "AirbusFBW/NDmodeFO", 0),
            value_set(46, "R MODE VOR", "AirbusFBW/NDmodeFO", 1),
            value_set(47, "R MODE NAV", "AirbusFBW/NDmodeFO", 2),
            value_set(48, "R MODE ARC", "AirbusFBW/NDmodeFO", 3),
            value_set(49, "R MODE PLAN", "AirbusFBW/NDmodeFO", 4),
            value_set(50, "R RANGE 10", "AirbusFBW/NDrangeFO", 0),
            value_set(51, "R RANGE 20", "AirbusFBW/NDrangeFO", 1),
            value_set(52, "R RANGE 40", "AirbusFBW/NDrangeFO", 2),
            value_set(53, "R RANGE 80", "AirbusFBW/NDrangeFO", 3),
            value_set(54, "R RANGE 160", "AirbusFBW/NDrangeFO", 4),
            value_set(55, "R RANGE 320", "AirbusFBW/NDrangeFO", 5),
            value_set(56, "R 1 VOR", "sim/cockpit2/EFIS/EFIS_1_selection_copilot", 2),
            value_set(57, "R 1 OFF", "sim/cockpit2/EFIS/EFIS_1_selection_copilot", 1),
            value_set(58, "R 1 ADF", "sim/cockpit2/EFIS/EFIS_1_selection_copilot", 0),
            value_set(59, "R 2 VOR", "sim/cockpit2/EFIS/EFIS_2_selection_copilot", 2),
            value_set(60, "R 2 OFF", "sim/cockpit2/EFIS/EFIS_2_selection_copilot", 1),
            value_set(61, "R 2 ADF", "sim/cockpit2/EFIS/EFIS_2_selection_copilot", 0),
            led_only("R ARPT LED", "AirbusFBW/NDShowARPTFO", &[Led::EfisRightArptGreen]),
            led_only("R NDB LED", "AirbusFBW/NDShowNDBFO", &[Led::EfisRightNdbGreen]),
            led_only("R VOR.D LED", "AirbusFBW/NDShowVORDFO", &[Led::EfisRightVordGreen]),
            led_only("R WPT LED", "AirbusFBW/NDShowWPTFO", &[Led::EfisRightWptGreen]),
            led_only("R CSTR LED", "AirbusFBW/NDShowCSTRFO", &[Led::EfisRightCstrGreen]),
            led_only("R FD LED", "AirbusFBW/FD2Engage", &[Led::EfisRightFdGreen]),
            led_only("R LS LED", "AirbusFBW/ILSonFO", &[Led::EfisRightLsGreen]),
        ]);
    }

    if caps.efis_left {
        table.extend([
            cmd_toggle(64, "L FD", "toliss_airbus/fd1_push"),
            cmd_toggle(65, "L LS", "toliss_airbus/dispcommands/CaptLSButtonPush"),
            cmd_toggle(66, "L CSTR", "toliss_airbus/dispcommands/CaptCstrPushButton"),
            cmd_toggle(67, "L WPT", "toliss_airbus/dispcommands/CaptWptPushButton"),
            cmd_toggle(68, "L VOR.D", "toliss_airbus/dispcommands/CaptVorDPushButton"),
            cmd_toggle(69, "L NDB", "toliss_airbus/dispcommands/CaptNdbPushButton"),
            cmd_toggle(70, "L ARPT", "toliss_airbus/dispcommands/CaptArptPushButton"),
            cmd_toggle(71, "L STD PUSH", "toliss_airbus/capt_baro_push"),
            cmd_toggle(72, "L STD PULL", "toliss_airbus/capt_baro_pull"),
            cmd_toggle(73, "L PRESS DEC", "sim/instruments/barometer_down"),
            cmd_toggle(74, "L PRESS INC", "sim/instruments/barometer_up"),
            value_set(75, "L inHg", "AirbusFBW/BaroUnitCapt", 0),
            value_set(76, "L hPa", "AirbusFBW/BaroUnitCapt", 1),
            value_set(77, "L MODE LS", "AirbusFBW/NDmodeCapt", 0),
            value_set(78, "L MODE VOR", "AirbusFBW/NDmodeCapt", 1),
            value_set(79, "L MODE NAV", "AirbusFBW/NDmodeCapt", 2),
            value_set(80, "L MODE ARC", "AirbusFBW/NDmodeCapt", 3),
            value_set(81, "L MODE PLAN", "AirbusFBW/NDmodeCapt", 4),
            value_set(82, "L RANGE 10", "AirbusFBW/NDrangeCapt", 0),
            value_set(83, "L RANGE 20", "AirbusFBW/NDrangeCapt", 1),
            value_set(84, "L RANGE 40", "AirbusFBW/NDrangeCapt", 2),
            value_set(85, "L RANGE 80", "AirbusFBW/NDrangeCapt", 3),
            value_set(86, "L RANGE 160", "AirbusFBW/NDrangeCapt", 4),
            value_set(87, "L RANGE 320", "AirbusFBW/NDrangeCapt", 5),
            value_set(88, "L 1 ADF", "sim/cockpit2/EFIS/EFIS_1_selection_pilot", 0),
            value_set(89, "L 1 OFF", "sim/cockpit2/EFIS/EFIS_1_selection_pilot", 1),
            value_set(90, "L 1 VOR", "sim/cockpit2/EFIS/EFIS_1_selection_pilot", 2),
            value_set(91, "L 2 ADF", "sim/cockpit2/EFIS/EFIS_2_selection_pilot", 0),
            value_set(92, "L 2 OFF", "sim/cockpit2/EFIS/EFIS_2_selection_pilot", 1),
            value_set(93, "L 2 VOR", "sim/cockpit2/EFIS/EFIS_2_selection_pilot", 2),
        ]);
    }

    validate_bindings(&table)?;
    Ok(table)
}

/// Keys subscribed specifically because they drive an LED.
///
/// Command targets never stream values, so only value targets with at
/// least one bound LED are subscription-worthy.
pub fn led_bound_keys(bindings: &[ButtonBinding]) -> Vec<&'static str> {
    bindings
        .iter()
        .filter(|b| !b.leds.is_empty())
        .filter_map(|b| match b.target {
            Target::Value(key) => Some(key),
            Target::Command(_) => None,
        })
        .collect()
}

fn validate_bindings(table: &[ButtonBinding]) -> Result<()> {
    let mut seen = [false; BUTTON_BITS];
    for binding in table {
        let Some(bit) = binding.bit else { continue };
        let bit = bit as usize;
        if bit >= BUTTON_BITS {
            return Err(FcuBridgeError::PanelTable(format!(
                "button {:?} bit {} outside the {}-bit space",
                binding.label, bit, BUTTON_BITS
            )));
        }
        if seen[bit] {
            return Err(FcuBridgeError::PanelTable(format!(
                "button {:?} reuses bit {}",
                binding.label, bit
            )));
        }
        seen[bit] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_caps() -> PanelCapabilities {
        PanelCapabilities { efis_right: true, efis_left: true }
    }

    #[test]
    fn test_core_table_validates() {
        assert!(build_bindings(PanelCapabilities::default()).is_ok());
    }

    #[test]
    fn test_full_table_validates() {
        assert!(build_bindings(all_caps()).is_ok());
    }

    #[test]
    fn test_capability_gating() {
        let core = build_bindings(PanelCapabilities::default()).unwrap();
        let with_right = build_bindings(PanelCapabilities { efis_right: true, efis_left: false }).unwrap();
        let full = build_bindings(all_caps()).unwrap();

        assert!(with_right.len() > core.len());
        assert!(full.len() > with_right.len());

        // no secondary bits without the matching sub-panel
        assert!(core.iter().all(|b| b.bit.map_or(true, |bit| bit < 32)));
        assert!(with_right.iter().all(|b| b.bit.map_or(true, |bit| bit < 64)));
    }

    #[test]
    fn test_bit_sections() {
        let full = build_bindings(all_caps()).unwrap();
        for binding in &full {
            let Some(bit) = binding.bit else { continue };
            let section_ok = bit <= 26 || (32..=61).contains(&bit) || (64..=93).contains(&bit);
            assert!(section_ok, "{} at bit {}", binding.label, bit);
        }
    }

    #[test]
    fn test_led_only_rows_have_no_bit() {
        let full = build_bindings(all_caps()).unwrap();
        for binding in &full {
            if binding.action == ButtonAction::LedOnly {
                assert!(binding.bit.is_none(), "{}", binding.label);
            }
        }
    }

    #[test]
    fn test_duplicate_bit_rejected() {
        let table = [
            cmd_toggle(4, "A", "cmd/a"),
            cmd_toggle(4, "B", "cmd/b"),
        ];
        assert!(validate_bindings(&table).is_err());
    }

    #[test]
    fn test_out_of_range_bit_rejected() {
        let table = [cmd_toggle(96, "X", "cmd/x")];
        assert!(validate_bindings(&table).is_err());
    }

    #[test]
    fn test_led_bound_keys() {
        let core = build_bindings(PanelCapabilities::default()).unwrap();
        let keys = led_bound_keys(&core);
        assert!(keys.contains(&"AirbusFBW/AP1Engage"));
        assert!(keys.contains(&datarefs::RHEOSTAT_PANEL));
        assert!(keys.contains(&"AirbusFBW/LOCilluminated"));
        // command toggles never stream a value
        assert!(!keys.contains(&"AirbusFBW/LOCbutton"));
    }

    #[test]
    fn test_alt_scale_buttons_share_target() {
        let core = build_bindings(PanelCapabilities::default()).unwrap();
        let scale: Vec<_> = core
            .iter()
            .filter(|b| b.target.key() == "AirbusFBW/ALT100_1000")
            .collect();
        assert_eq!(scale.len(), 2);
        assert_eq!(scale[0].action, ButtonAction::SetConstant(0));
        assert_eq!(scale[1].action, ButtonAction::SetConstant(1));
    }
}
