//! # LED Identifier Space
//!
//! Flat numeric enumeration of every indicator and backlight channel the
//! panel family exposes, partitioned by range:
//!
//! | Range | Panel |
//! |---------|-------|
//! | 0–99 | main panel |
//! | 100–199 | secondary right sub-panel |
//! | 200–299 | secondary left sub-panel (not implemented in firmware) |
//!
//! Backlight channels take a 0–255 intensity; the green/yellow annunciators
//! treat the value byte as on/off intensity the same way, so one write path
//! covers both.

/// Every addressable LED channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Led {
    /// Panel flood backlight, 0-255
    Backlight = 0,
    /// LCD backlight, 0-255
    ScreenBacklight = 1,
    LocGreen = 3,
    Ap1Green = 5,
    Ap2Green = 7,
    AthrGreen = 9,
    ExpedGreen = 11,
    ApprGreen = 13,
    /// Annunciator flood, 0-255
    FlagGreen = 17,
    ExpedYellow = 30,
    EfisRightBacklight = 100,
    EfisRightScreenBacklight = 101,
    EfisRightFlagGreen = 102,
    EfisRightFdGreen = 103,
    EfisRightLsGreen = 104,
    EfisRightCstrGreen = 105,
    EfisRightWptGreen = 106,
    EfisRightVordGreen = 107,
    EfisRightNdbGreen = 108,
    EfisRightArptGreen = 109,
    EfisLeftBacklight = 200,
    EfisLeftScreenBacklight = 201,
    EfisLeftFlagGreen = 202,
    EfisLeftFdGreen = 203,
    EfisLeftLsGreen = 204,
    EfisLeftCstrGreen = 205,
    EfisLeftWptGreen = 206,
    EfisLeftVordGreen = 207,
    EfisLeftNdbGreen = 208,
    EfisLeftArptGreen = 209,
}

/// Which physical sub-panel owns an LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPanel {
    Main,
    EfisRight,
    /// Present in the id space but the firmware does not drive it yet
    EfisLeft,
}

impl Led {
    /// Raw identifier as carried in the LED frame.
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Partition lookup by identifier range.
    pub fn panel(self) -> LedPanel {
        match self.id() {
            0..=99 => LedPanel::Main,
            100..=199 => LedPanel::EfisRight,
            _ => LedPanel::EfisLeft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_match_firmware_values() {
        assert_eq!(Led::Backlight.id(), 0);
        assert_eq!(Led::ScreenBacklight.id(), 1);
        assert_eq!(Led::ExpedGreen.id(), 11);
        assert_eq!(Led::ExpedYellow.id(), 30);
        assert_eq!(Led::EfisRightBacklight.id(), 100);
        assert_eq!(Led::EfisLeftArptGreen.id(), 209);
    }

    #[test]
    fn test_panel_partition() {
        assert_eq!(Led::Backlight.panel(), LedPanel::Main);
        assert_eq!(Led::ExpedYellow.panel(), LedPanel::Main);
        assert_eq!(Led::EfisRightFdGreen.panel(), LedPanel::EfisRight);
        assert_eq!(Led::EfisLeftBacklight.panel(), LedPanel::EfisLeft);
    }
}
