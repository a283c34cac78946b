//! # Dataref Keys
//!
//! The simulation variables this bridge reads and writes, plus the static
//! subscription list with per-key refresh rates.
//!
//! Keys follow the ToLiss Airbus / X-Plane naming; the projector matches on
//! these constants, never on inline strings.

/// Autopilot speed window value (knots, or a Mach fraction in Mach mode).
pub const AIRSPEED_DIAL: &str = "sim/cockpit2/autopilot/airspeed_dial_kts_mach";

/// Non-zero while the speed window shows Mach.
pub const AIRSPEED_IS_MACH: &str = "sim/cockpit/autopilot/airspeed_is_mach";

/// Plain autopilot airspeed, kept subscribed for aircraft that need it.
pub const AIRSPEED_KTS: &str = "sim/cockpit/autopilot/airspeed";

/// Autopilot heading window, degrees magnetic.
pub const HEADING_MAG: &str = "sim/cockpit/autopilot/heading_mag";

/// Autopilot altitude window, feet.
pub const ALTITUDE: &str = "sim/cockpit/autopilot/altitude";

/// Autopilot vertical speed window, feet per minute, signed.
pub const VERTICAL_VELOCITY: &str = "sim/cockpit/autopilot/vertical_velocity";

/// Flight-path angle window, degrees.
pub const FPA: &str = "sim/cockpit2/autopilot/fpa";

/// 0 = HDG/V-S lateral-vertical pair, non-zero = TRK/FPA.
pub const HDG_TRK_MODE: &str = "AirbusFBW/HDGTRKmode";

/// Speed window dashed (managed speed).
pub const SPD_DASHED: &str = "AirbusFBW/SPDdashed";

/// Heading window dashed (managed heading).
pub const HDG_DASHED: &str = "AirbusFBW/HDGdashed";

/// Vertical-speed window dashed.
pub const VS_DASHED: &str = "AirbusFBW/VSdashed";

/// Managed-mode dots.
pub const SPD_MANAGED: &str = "AirbusFBW/SPDmanaged";
pub const HDG_MANAGED: &str = "AirbusFBW/HDGmanaged";
pub const ALT_MANAGED: &str = "AirbusFBW/ALTmanaged";

/// Autopilot vertical mode; EXPED engaged at values >= 112.
pub const AP_VERTICAL_MODE: &str = "AirbusFBW/APVerticalMode";

/// Copilot barometer setting, inHg.
pub const BARO_INHG_COPILOT: &str =
    "sim/cockpit2/gauges/actuators/barometer_setting_in_hg_copilot";

/// Copilot barometer standard-mode selector.
pub const BARO_STD_FO: &str = "AirbusFBW/BaroStdFO";

/// Copilot barometer unit selector: 0 = inHg, non-zero = hPa.
pub const BARO_UNIT_FO: &str = "AirbusFBW/BaroUnitFO";

/// Panel flood / integral light rheostat, 0..1.
pub const RHEOSTAT_PANEL: &str = "AirbusFBW/SupplLightLevelRehostats[0]";

/// LCD backlight rheostat, 0..1.
pub const RHEOSTAT_LCD: &str = "AirbusFBW/SupplLightLevelRehostats[1]";

/// Autopilot vertical-mode threshold at which the EXPED lamp lights.
pub const EXPED_MODE_THRESHOLD: i64 = 112;

/// Refresh rate (Hz) used for datarefs that drive an LED.
pub const LED_REFRESH_HZ: u16 = 3;

/// Datarefs subscribed regardless of the binding table, with refresh rates.
///
/// Display values refresh at 5 Hz, mode/selector booleans at 2 Hz.
pub const STATIC_DATAREFS: &[(&str, u16)] = &[
    (HDG_DASHED, 2),
    (SPD_DASHED, 2),
    (VS_DASHED, 2),
    (AIRSPEED_KTS, 2),
    (AIRSPEED_DIAL, 5),
    (SPD_MANAGED, 2),
    (AIRSPEED_IS_MACH, 2),
    (HEADING_MAG, 5),
    (HDG_MANAGED, 2),
    (HDG_TRK_MODE, 2),
    (ALTITUDE, 5),
    (ALT_MANAGED, 2),
    (VERTICAL_VELOCITY, 5),
    (FPA, 2),
    (AP_VERTICAL_MODE, 5),
    (BARO_INHG_COPILOT, 2),
    (BARO_STD_FO, 2),
    (BARO_UNIT_FO, 2),
];
