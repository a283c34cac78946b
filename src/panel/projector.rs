//! # State Projector
//!
//! Owns the authoritative cache of last-seen simulation values and projects
//! it onto the panel: display fields, indicator flags, LED intensities.
//!
//! Per telemetry batch the projector:
//!
//! 1. applies key-specific unit transforms, truncates to integer and diffs
//!    against the cache; every change marks the batch dirty and immediately
//!    drives any LEDs bound to that key
//! 2. re-evaluates the EXPED lamp rule
//! 3. if dirty (or a previous write still owes a resend), derives the four
//!    display fields, recomputes every dependent flag, composes the flag
//!    slots and writes the display + commit frame pair
//! 4. reformats the secondary baro field and writes it only when the
//!    formatted text actually changed
//!
//! Values that have not arrived yet are "unknown", never zero: dependent
//! computations are skipped for the pass and retried on the next batch.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::Result;
use crate::panel::bindings::ButtonBinding;
use crate::panel::writer::RetryableWriter;
use crate::protocol::flags::{FlagId, FlagRegister};
use crate::protocol::frames::{self, DisplayFields};
use crate::protocol::leds::{Led, LedPanel};
use crate::sim::datarefs;
use crate::transport::{PanelCapabilities, PanelTransport};

/// Fallback annunciator intensity until the cockpit rheostat is first seen.
const DEFAULT_LED_BRIGHTNESS: u8 = 180;

/// One cached simulation value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedValue {
    /// Unknown until the first telemetry batch carries the key
    pub value: Option<i64>,
    /// How many batches changed this value
    pub updates: u64,
}

/// The projector's value cache, keyed by dataref.
#[derive(Debug, Default)]
pub struct ValueCache {
    map: HashMap<String, NamedValue>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create an entry so "registered but never received" is
    /// distinguishable from "nobody asked".
    pub fn register(&mut self, key: &str) {
        self.map.entry(key.to_string()).or_default();
    }

    /// Last cached value, if the key has ever arrived.
    pub fn value(&self, key: &str) -> Option<i64> {
        self.map.get(key).and_then(|v| v.value)
    }

    /// Cached value interpreted as a boolean; unknown counts as inactive.
    pub fn truthy(&self, key: &str) -> bool {
        self.value(key).unwrap_or(0) != 0
    }

    /// Store a value; returns whether it differed from the cached one.
    pub fn store(&mut self, key: &str, value: i64) -> bool {
        let entry = self.map.entry(key.to_string()).or_default();
        if entry.value == Some(value) {
            return false;
        }
        entry.value = Some(value);
        entry.updates += 1;
        true
    }

    #[cfg(test)]
    pub fn updates(&self, key: &str) -> u64 {
        self.map.get(key).map_or(0, |v| v.updates)
    }
}

/// Projects telemetry batches onto the panel hardware.
#[derive(Debug)]
pub struct StateProjector {
    cache: ValueCache,
    flags: FlagRegister,
    caps: PanelCapabilities,
    /// A cache change happened and the display has not been rebuilt yet
    needs_display: bool,
    /// Current annunciator intensity, tracked from the panel rheostat
    led_brightness: u8,
    exped_lit: bool,
    /// Last formatted baro text actually written to the sub-panel
    last_baro: Option<String>,
}

impl StateProjector {
    pub fn new(caps: PanelCapabilities) -> Result<Self> {
        Ok(Self {
            cache: ValueCache::new(),
            flags: FlagRegister::new()?,
            caps,
            needs_display: false,
            led_brightness: DEFAULT_LED_BRIGHTNESS,
            exped_lit: false,
            last_baro: None,
        })
    }

    /// Read access for the button dispatcher's toggle policy.
    pub fn cache(&self) -> &ValueCache {
        &self.cache
    }

    /// Pre-register every subscribed key.
    pub fn register_keys<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        for key in keys {
            self.cache.register(key);
        }
    }

    /// Run one projection pass over a telemetry batch.
    ///
    /// # Errors
    ///
    /// Only a glyph rejection surfaces here (a display string that cannot
    /// be rendered); transport failures are absorbed by the writer's retry
    /// flag and never abort the pass.
    pub fn apply<T: PanelTransport>(
        &mut self,
        batch: &HashMap<String, f32>,
        bindings: &[ButtonBinding],
        writer: &mut RetryableWriter<T>,
    ) -> Result<()> {
        for (key, &raw) in batch {
            let transformed = self.transform(key, raw);
            let value = transformed as i64;
            if self.cache.store(key, value) {
                let updates = self.cache.map[key.as_str()].updates;
                debug!(key = key.as_str(), value, updates, "cache update");
                self.needs_display = true;
                self.drive_bound_leds(key, value, bindings, writer);
            }
        }

        self.update_exped_lamp(writer);

        if self.needs_display || writer.retry_pending() {
            self.refresh_display(writer)?;
        }

        if self.caps.efis_right {
            self.refresh_baro(writer)?;
        }

        Ok(())
    }

    /// Key-specific unit/domain transforms, applied before caching.
    fn transform(&self, key: &str, raw: f32) -> f32 {
        match key {
            // rheostats report 0..1; the hardware wants an 8-bit level
            datarefs::RHEOSTAT_PANEL if raw <= 1.0 => raw * 255.0,
            datarefs::RHEOSTAT_LCD if raw <= 1.0 => raw * 235.0 + 20.0,
            // in Mach mode the dial value is a fraction; shown as hundredths
            datarefs::AIRSPEED_DIAL
                if raw < 1.0 && self.cache.truthy(datarefs::AIRSPEED_IS_MACH) =>
            {
                (raw + 0.005) * 100.0
            }
            // inHg arrives as e.g. 29.92; shown as a 4-digit integer
            datarefs::BARO_INHG_COPILOT if raw < 100.0 && self.caps.efis_right => {
                (raw + 0.005) * 100.0
            }
            _ => raw,
        }
    }

    /// Emit single-LED writes for every LED bound to a changed key.
    fn drive_bound_leds<T: PanelTransport>(
        &mut self,
        key: &str,
        value: i64,
        bindings: &[ButtonBinding],
        writer: &mut RetryableWriter<T>,
    ) {
        let Some(binding) = bindings.iter().find(|b| b.target.key() == key) else {
            return;
        };
        if binding.leds.is_empty() {
            return;
        }

        let level = value.clamp(0, 255) as u8;
        for &led in binding.leds {
            self.write_led(led, level, writer);
        }

        // the panel rheostat doubles as the EXPED yellow floor and the
        // reference intensity for later annunciator writes
        if binding.leds.contains(&Led::Backlight) {
            self.write_led(Led::ExpedYellow, level, writer);
            self.led_brightness = level;
            info!(level, "panel brightness updated");
        }
    }

    /// The EXPED lamp follows the autopilot vertical mode, re-emitted only
    /// on state change.
    fn update_exped_lamp<T: PanelTransport>(&mut self, writer: &mut RetryableWriter<T>) {
        let desired = self
            .cache
            .value(datarefs::AP_VERTICAL_MODE)
            .map_or(false, |mode| mode >= datarefs::EXPED_MODE_THRESHOLD);

        if desired != self.exped_lit {
            self.exped_lit = desired;
            let level = if desired { self.led_brightness } else { 0 };
            self.write_led(Led::ExpedGreen, level, writer);
        }
    }

    fn write_led<T: PanelTransport>(
        &self,
        led: Led,
        level: u8,
        writer: &mut RetryableWriter<T>,
    ) {
        match led.panel() {
            LedPanel::Main => {}
            LedPanel::EfisRight if !self.caps.efis_right => return,
            LedPanel::EfisRight => {}
            LedPanel::EfisLeft => {
                debug!(?led, "secondary-left LEDs not implemented in firmware, skipping");
                return;
            }
        }
        if let Some(frame) = frames::build_led_frame(led, level) {
            let _ = writer.write(&frame);
        }
    }

    /// Rebuild the four display fields and all dependent flags, then write
    /// the display + commit pair.
    fn refresh_display<T: PanelTransport>(
        &mut self,
        writer: &mut RetryableWriter<T>,
    ) -> Result<()> {
        let (Some(speed), Some(heading), Some(altitude), Some(vs_raw), Some(lateral)) = (
            self.cache.value(datarefs::AIRSPEED_DIAL),
            self.cache.value(datarefs::HEADING_MAG),
            self.cache.value(datarefs::ALTITUDE),
            self.cache.value(datarefs::VERTICAL_VELOCITY),
            self.cache.value(datarefs::HDG_TRK_MODE),
        ) else {
            // not all core values have arrived; keep the dirty mark and
            // try again on the next batch
            debug!("core display values incomplete, deferring refresh");
            return Ok(());
        };

        let track_mode = lateral != 0;
        let mut vs_up = vs_raw >= 0;
        let vs_magnitude = vs_raw.abs();
        let mut fpa_comma = false;

        let speed_text = if self.cache.truthy(datarefs::SPD_DASHED) {
            "---".to_string()
        } else {
            speed.to_string()
        };
        let heading_text = if self.cache.truthy(datarefs::HDG_DASHED) {
            "---".to_string()
        } else {
            heading.to_string()
        };
        let vs_text = if self.cache.truthy(datarefs::VS_DASHED) {
            vs_up = false;
            "----".to_string()
        } else if !track_mode {
            // hundreds of feet, left-justified; '#' renders the small
            // raised zeros of V/S mode
            left_justify(vs_magnitude / 100, '#')
        } else {
            fpa_comma = true;
            left_justify(vs_magnitude / 100, ' ')
        };

        let mach = self.cache.truthy(datarefs::AIRSPEED_IS_MACH);

        self.flags.set(FlagId::VsPlusVertical, vs_up);
        self.flags.set(FlagId::FpaComma, fpa_comma);
        self.flags.set(FlagId::SpdManaged, self.cache.truthy(datarefs::SPD_MANAGED));
        self.flags.set(FlagId::HdgManaged, self.cache.truthy(datarefs::HDG_MANAGED));
        self.flags.set(FlagId::AltManaged, self.cache.truthy(datarefs::ALT_MANAGED));
        self.flags.set(FlagId::SpdLabel, !mach);
        self.flags.set(FlagId::MachLabel, mach);
        self.flags.set(FlagId::MachComma, mach);
        self.flags.set(FlagId::LatHdg, !track_mode);
        self.flags.set(FlagId::LatTrk, track_mode);
        self.flags.set(FlagId::VsFpaVs, !track_mode);
        self.flags.set(FlagId::VertHdg, !track_mode);
        self.flags.set(FlagId::VertVs, !track_mode);
        self.flags.set(FlagId::VertTrk, track_mode);
        self.flags.set(FlagId::VertFpa, track_mode);
        self.flags.set(FlagId::VsFpaFpa, track_mode);

        let fields = DisplayFields {
            speed: speed_text,
            heading: heading_text,
            altitude: altitude.to_string(),
            vertical_speed: vs_text,
        };

        // compose only now, with every flag for this batch in place
        let slots = self.flags.compose();
        let (content, commit) = frames::build_display_frames(&fields, &slots)?;
        let _ = writer.write(&content);
        let _ = writer.write(&commit);

        self.needs_display = false;
        Ok(())
    }

    /// Reformat the secondary baro field; write only when the text changed.
    fn refresh_baro<T: PanelTransport>(&mut self, writer: &mut RetryableWriter<T>) -> Result<()> {
        let Some(std_mode) = self.cache.value(datarefs::BARO_STD_FO) else {
            return Ok(());
        };
        let std_mode = std_mode != 0;
        let unit_hpa = self.cache.truthy(datarefs::BARO_UNIT_FO);

        let text = if std_mode {
            "Std ".to_string()
        } else {
            let Some(baro) = self.cache.value(datarefs::BARO_INHG_COPILOT) else {
                return Ok(());
            };
            if unit_hpa {
                (((baro as f64) * 33.86388 + 50.0) / 100.0) as i64
            } else {
                baro
            }
            .to_string()
        };

        self.flags.set(FlagId::QnhBadge, !std_mode);
        self.flags.set(FlagId::BaroDecimal, !unit_hpa && !std_mode);

        if self.last_baro.as_deref() != Some(text.as_str()) {
            let slots = self.flags.compose();
            let frame = frames::build_secondary_frame(&text, &slots)?;
            if writer.write(&frame).is_ok() {
                self.last_baro = Some(text);
            }
        }
        Ok(())
    }
}

/// Two-digit value, left-justified in a 4-character field.
fn left_justify(value: i64, fill: char) -> String {
    let mut text = format!("{:02}", value);
    while text.len() < 4 {
        text.push(fill);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::bindings::build_bindings;
    use crate::protocol::frames::{build_display_frames, build_secondary_frame, LED_FRAME_LEN};
    use crate::transport::mocks::MockPanel;

    fn batch(entries: &[(&str, f32)]) -> HashMap<String, f32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn core_batch() -> HashMap<String, f32> {
        batch(&[
            (datarefs::AIRSPEED_DIAL, 250.0),
            (datarefs::HEADING_MAG, 180.0),
            (datarefs::ALTITUDE, 35000.0),
            (datarefs::VERTICAL_VELOCITY, -800.0),
            (datarefs::HDG_TRK_MODE, 0.0),
        ])
    }

    fn setup(caps: PanelCapabilities) -> (StateProjector, Vec<ButtonBinding>, MockPanel, RetryableWriter<MockPanel>) {
        let projector = StateProjector::new(caps).unwrap();
        let bindings = build_bindings(caps).unwrap();
        let mock = MockPanel::new();
        let writer = RetryableWriter::new(mock.clone());
        (projector, bindings, mock, writer)
    }

    #[test]
    fn test_cache_tracks_update_counts() {
        let mut cache = ValueCache::new();
        cache.register("a/b");
        assert_eq!(cache.value("a/b"), None);
        assert_eq!(cache.updates("a/b"), 0);

        assert!(cache.store("a/b", 5));
        assert!(!cache.store("a/b", 5));
        assert!(cache.store("a/b", 6));
        assert_eq!(cache.updates("a/b"), 2);
        assert_eq!(cache.value("a/b"), Some(6));
    }

    #[test]
    fn test_brightness_transforms() {
        let (projector, _, _, _) = setup(PanelCapabilities::default());
        assert_eq!(projector.transform(datarefs::RHEOSTAT_PANEL, 0.5) as i64, 127);
        assert_eq!(projector.transform(datarefs::RHEOSTAT_PANEL, 1.0) as i64, 255);
        assert_eq!(projector.transform(datarefs::RHEOSTAT_LCD, 0.0) as i64, 20);
        assert_eq!(projector.transform(datarefs::RHEOSTAT_LCD, 1.0) as i64, 255);
        // already-scaled values pass through
        assert_eq!(projector.transform(datarefs::RHEOSTAT_PANEL, 128.0) as i64, 128);
    }

    #[test]
    fn test_mach_fraction_transform_needs_mach_mode() {
        let (mut projector, _, _, _) = setup(PanelCapabilities::default());

        // not in Mach mode: a fraction passes through untouched
        assert_eq!(projector.transform(datarefs::AIRSPEED_DIAL, 0.78) as i64, 0);

        projector.cache.store(datarefs::AIRSPEED_IS_MACH, 1);
        assert_eq!(projector.transform(datarefs::AIRSPEED_DIAL, 0.78) as i64, 78);
        // knots values stay as-is even in Mach mode
        assert_eq!(projector.transform(datarefs::AIRSPEED_DIAL, 250.0) as i64, 250);
    }

    #[test]
    fn test_baro_transform_gated_on_subpanel() {
        let caps = PanelCapabilities { efis_right: true, efis_left: false };
        let (projector, _, _, _) = setup(caps);
        assert_eq!(projector.transform(datarefs::BARO_INHG_COPILOT, 29.92) as i64, 2992);

        let (bare, _, _, _) = setup(PanelCapabilities::default());
        assert_eq!(bare.transform(datarefs::BARO_INHG_COPILOT, 29.92) as i64, 29);
    }

    #[test]
    fn test_end_to_end_display_frame() {
        let (mut projector, bindings, mock, mut writer) = setup(PanelCapabilities::default());

        projector.apply(&core_batch(), &bindings, &mut writer).unwrap();

        let written = mock.written_frames();
        assert_eq!(written.len(), 2, "content + commit");

        // expected frame: speed 250, heading 180, altitude 35000,
        // vertical speed 08## (descending, heading mode), flags to match
        let mut flags = FlagRegister::new().unwrap();
        flags.set(FlagId::SpdLabel, true); // not Mach
        flags.set(FlagId::LatHdg, true);
        flags.set(FlagId::VsFpaVs, true);
        flags.set(FlagId::VertHdg, true);
        flags.set(FlagId::VertVs, true);
        // VsPlusVertical stays clear: descending
        let fields = DisplayFields {
            speed: "250".into(),
            heading: "180".into(),
            altitude: "35000".into(),
            vertical_speed: "08##".into(),
        };
        let (expected_content, expected_commit) =
            build_display_frames(&fields, &flags.compose()).unwrap();

        assert_eq!(written[0], expected_content);
        assert_eq!(written[1], expected_commit);
    }

    #[test]
    fn test_track_mode_vertical_speed_format() {
        let (mut projector, bindings, mock, mut writer) = setup(PanelCapabilities::default());

        let mut b = core_batch();
        b.insert(datarefs::HDG_TRK_MODE.to_string(), 1.0);
        b.insert(datarefs::VERTICAL_VELOCITY.to_string(), 1200.0);
        projector.apply(&b, &bindings, &mut writer).unwrap();

        let mut flags = FlagRegister::new().unwrap();
        flags.set(FlagId::SpdLabel, true);
        flags.set(FlagId::LatTrk, true);
        flags.set(FlagId::VertTrk, true);
        flags.set(FlagId::VertFpa, true);
        flags.set(FlagId::VsFpaFpa, true);
        flags.set(FlagId::VsPlusVertical, true); // climbing
        flags.set(FlagId::FpaComma, true);
        let fields = DisplayFields {
            speed: "250".into(),
            heading: "180".into(),
            altitude: "35000".into(),
            vertical_speed: "12  ".into(),
        };
        let (expected_content, _) = build_display_frames(&fields, &flags.compose()).unwrap();
        assert_eq!(mock.written_frames()[0], expected_content);
    }

    #[test]
    fn test_dashed_fields() {
        let (mut projector, bindings, mock, mut writer) = setup(PanelCapabilities::default());

        let mut b = core_batch();
        b.insert(datarefs::SPD_DASHED.to_string(), 1.0);
        b.insert(datarefs::HDG_DASHED.to_string(), 1.0);
        b.insert(datarefs::VS_DASHED.to_string(), 1.0);
        projector.apply(&b, &bindings, &mut writer).unwrap();

        let mut flags = FlagRegister::new().unwrap();
        flags.set(FlagId::SpdLabel, true);
        flags.set(FlagId::LatHdg, true);
        flags.set(FlagId::VsFpaVs, true);
        flags.set(FlagId::VertHdg, true);
        flags.set(FlagId::VertVs, true);
        // dashed vertical speed forces the climb bar off
        let fields = DisplayFields {
            speed: "---".into(),
            heading: "---".into(),
            altitude: "35000".into(),
            vertical_speed: "----".into(),
        };
        let (expected_content, _) = build_display_frames(&fields, &flags.compose()).unwrap();
        assert_eq!(mock.written_frames()[0], expected_content);
    }

    #[test]
    fn test_unchanged_batch_writes_nothing() {
        let (mut projector, bindings, mock, mut writer) = setup(PanelCapabilities::default());

        projector.apply(&core_batch(), &bindings, &mut writer).unwrap();
        let count = mock.written_frames().len();

        projector.apply(&core_batch(), &bindings, &mut writer).unwrap();
        assert_eq!(mock.written_frames().len(), count);
    }

    #[test]
    fn test_retry_resends_unchanged_content() {
        let (mut projector, bindings, mock, mut writer) = setup(PanelCapabilities::default());

        mock.set_fail_writes(true);
        projector.apply(&core_batch(), &bindings, &mut writer).unwrap();
        assert!(writer.retry_pending());
        assert!(mock.written_frames().is_empty());

        // same batch, cache unchanged: the armed retry flag still forces a
        // full resend, which now succeeds and disarms the flag
        mock.set_fail_writes(false);
        projector.apply(&core_batch(), &bindings, &mut writer).unwrap();
        assert_eq!(mock.written_frames().len(), 2);
        assert!(!writer.retry_pending());

        let fields = DisplayFields {
            speed: "250".into(),
            heading: "180".into(),
            altitude: "35000".into(),
            vertical_speed: "08##".into(),
        };
        let mut flags = FlagRegister::new().unwrap();
        flags.set(FlagId::SpdLabel, true);
        flags.set(FlagId::LatHdg, true);
        flags.set(FlagId::VsFpaVs, true);
        flags.set(FlagId::VertHdg, true);
        flags.set(FlagId::VertVs, true);
        let (expected_content, _) = build_display_frames(&fields, &flags.compose()).unwrap();
        assert_eq!(mock.written_frames()[0], expected_content);
    }

    #[test]
    fn test_missing_core_value_defers_display() {
        let (mut projector, bindings, mock, mut writer) = setup(PanelCapabilities::default());

        let mut partial = core_batch();
        partial.remove(datarefs::ALTITUDE);
        projector.apply(&partial, &bindings, &mut writer).unwrap();
        assert!(mock.written_frames().is_empty());

        // the missing key arrives alone; the kept dirty mark triggers the
        // full refresh even though only one key changed
        projector
            .apply(&batch(&[(datarefs::ALTITUDE, 35000.0)]), &bindings, &mut writer)
            .unwrap();
        assert_eq!(mock.written_frames().len(), 2);
    }

    #[test]
    fn test_led_bound_value_change_emits_led_frame() {
        let (mut projector, bindings, mock, mut writer) = setup(PanelCapabilities::default());

        projector
            .apply(&batch(&[("AirbusFBW/AP1Engage", 1.0)]), &bindings, &mut writer)
            .unwrap();

        let written = mock.written_frames();
        // one LED frame; display still deferred (core values unknown)
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].len(), LED_FRAME_LEN);
        assert_eq!(
            written[0],
            vec![0x02, 0x10, 0xbb, 0x00, 0x00, 0x03, 0x49, 5, 1, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_brightness_fanout() {
        let caps = PanelCapabilities { efis_right: true, efis_left: false };
        let (mut projector, bindings, mock, mut writer) = setup(caps);

        projector
            .apply(&batch(&[(datarefs::RHEOSTAT_PANEL, 0.5)]), &bindings, &mut writer)
            .unwrap();

        // Backlight, EfisRightBacklight, FlagGreen, EfisRightFlagGreen,
        // plus the ExpedYellow follower
        let led_ids: Vec<u8> = mock
            .written_frames()
            .iter()
            .filter(|f| f.len() == LED_FRAME_LEN)
            .map(|f| f[7])
            .collect();
        assert_eq!(led_ids, vec![0, 0, 17, 2, 30]);
        assert_eq!(projector.led_brightness, 127);
    }

    #[test]
    fn test_brightness_fanout_skips_absent_subpanel() {
        let (mut projector, bindings, mock, mut writer) = setup(PanelCapabilities::default());

        projector
            .apply(&batch(&[(datarefs::RHEOSTAT_PANEL, 1.0)]), &bindings, &mut writer)
            .unwrap();

        let led_ids: Vec<u8> = mock.written_frames().iter().map(|f| f[7]).collect();
        // only main-panel LEDs: Backlight, FlagGreen, ExpedYellow
        assert_eq!(led_ids, vec![0, 17, 30]);
    }

    #[test]
    fn test_exped_lamp_follows_vertical_mode() {
        let (mut projector, bindings, mock, mut writer) = setup(PanelCapabilities::default());

        projector
            .apply(&batch(&[(datarefs::AP_VERTICAL_MODE, 113.0)]), &bindings, &mut writer)
            .unwrap();
        let written = mock.written_frames();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0][7], Led::ExpedGreen.id() as u8);
        assert_eq!(written[0][8], DEFAULT_LED_BRIGHTNESS);

        // mode drops below the threshold: lamp re-emitted once, off
        projector
            .apply(&batch(&[(datarefs::AP_VERTICAL_MODE, 100.0)]), &bindings, &mut writer)
            .unwrap();
        let written = mock.written_frames();
        assert_eq!(written.len(), 2);
        assert_eq!(written[1][8], 0);

        // unchanged mode: nothing re-emitted
        projector
            .apply(&batch(&[(datarefs::AP_VERTICAL_MODE, 100.0)]), &bindings, &mut writer)
            .unwrap();
        assert_eq!(mock.written_frames().len(), 2);
    }

    #[test]
    fn test_baro_written_on_formatted_change_only() {
        let caps = PanelCapabilities { efis_right: true, efis_left: false };
        let (mut projector, bindings, mock, mut writer) = setup(caps);

        let b = batch(&[
            (datarefs::BARO_STD_FO, 0.0),
            (datarefs::BARO_UNIT_FO, 0.0),
            (datarefs::BARO_INHG_COPILOT, 29.92),
        ]);
        projector.apply(&b, &bindings, &mut writer).unwrap();

        let mut flags = FlagRegister::new().unwrap();
        flags.set(FlagId::QnhBadge, true);
        flags.set(FlagId::BaroDecimal, true);
        let expected = build_secondary_frame("2992", &flags.compose()).unwrap();
        assert_eq!(mock.written_frames(), vec![expected]);

        // identical batch: formatted text unchanged, nothing written
        projector.apply(&b, &bindings, &mut writer).unwrap();
        assert_eq!(mock.written_frames().len(), 1);
    }

    #[test]
    fn test_baro_hectopascal_conversion() {
        let caps = PanelCapabilities { efis_right: true, efis_left: false };
        let (mut projector, bindings, mock, mut writer) = setup(caps);

        let b = batch(&[
            (datarefs::BARO_STD_FO, 0.0),
            (datarefs::BARO_UNIT_FO, 1.0),
            (datarefs::BARO_INHG_COPILOT, 29.92),
        ]);
        projector.apply(&b, &bindings, &mut writer).unwrap();

        let mut flags = FlagRegister::new().unwrap();
        flags.set(FlagId::QnhBadge, true);
        // no decimal point in hPa mode
        let expected = build_secondary_frame("1013", &flags.compose()).unwrap();
        assert_eq!(mock.written_frames(), vec![expected]);
    }

    #[test]
    fn test_baro_standard_mode() {
        let caps = PanelCapabilities { efis_right: true, efis_left: false };
        let (mut projector, bindings, mock, mut writer) = setup(caps);

        projector
            .apply(&batch(&[(datarefs::BARO_STD_FO, 1.0)]), &bindings, &mut writer)
            .unwrap();

        let flags = FlagRegister::new().unwrap();
        let expected = build_secondary_frame("Std ", &flags.compose()).unwrap();
        assert_eq!(mock.written_frames(), vec![expected]);
    }

    #[test]
    fn test_left_justify() {
        assert_eq!(left_justify(8, '#'), "08##");
        assert_eq!(left_justify(12, ' '), "12  ");
        assert_eq!(left_justify(0, '#'), "00##");
        assert_eq!(left_justify(118, ' '), "118 ");
    }
}
