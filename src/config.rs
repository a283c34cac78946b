//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working local setup: simulator on localhost, variant auto-detected,
//! moderate startup brightness.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::transport::PanelCapabilities;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub brightness: BrightnessConfig,
}

/// Simulator link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    /// Host running the simulator
    #[serde(default = "default_host")]
    pub host: String,

    /// Simulator UDP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Round-trip budget for one value batch
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,

    /// Pause between reconnection attempts while the simulator is away
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

/// Hardware poll configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PanelConfig {
    /// Button-report read timeout per poll cycle
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Variant override: "auto" probes the device table
    #[serde(default = "default_variant")]
    pub variant: String,
}

/// Startup backlight levels, applied once before the first telemetry batch
#[derive(Debug, Deserialize, Clone)]
pub struct BrightnessConfig {
    #[serde(default = "default_screen_brightness")]
    pub screen: u8,

    #[serde(default = "default_panel_brightness")]
    pub panel: u8,
}

// Default value functions
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 49000 }
fn default_receive_timeout_ms() -> u64 { 2000 }
fn default_reconnect_interval_ms() -> u64 { 2000 }

fn default_poll_timeout_ms() -> u64 { 50 }
fn default_variant() -> String { "auto".to_string() }

fn default_screen_brightness() -> u8 { 180 }
fn default_panel_brightness() -> u8 { 80 }

const VARIANTS: &[&str] = &["auto", "fcu", "fcu-efis-right", "fcu-efis-left", "fcu-efis-both"];

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            receive_timeout_ms: default_receive_timeout_ms(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout_ms(),
            variant: default_variant(),
        }
    }
}

impl Default for BrightnessConfig {
    fn default() -> Self {
        Self {
            screen: default_screen_brightness(),
            panel: default_panel_brightness(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulator: SimulatorConfig::default(),
            panel: PanelConfig::default(),
            brightness: BrightnessConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Forced panel capabilities, or `None` for device-table auto-detection.
    pub fn capability_override(&self) -> Option<PanelCapabilities> {
        match self.panel.variant.as_str() {
            "fcu" => Some(PanelCapabilities { efis_right: false, efis_left: false }),
            "fcu-efis-right" => Some(PanelCapabilities { efis_right: true, efis_left: false }),
            "fcu-efis-left" => Some(PanelCapabilities { efis_right: false, efis_left: true }),
            "fcu-efis-both" => Some(PanelCapabilities { efis_right: true, efis_left: true }),
            _ => None,
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.simulator.host.is_empty() {
            return Err(crate::error::FcuBridgeError::Config(
                toml::de::Error::custom("simulator host cannot be empty"),
            ));
        }

        if self.simulator.port == 0 {
            return Err(crate::error::FcuBridgeError::Config(
                toml::de::Error::custom("simulator port cannot be 0"),
            ));
        }

        if self.simulator.receive_timeout_ms == 0 || self.simulator.receive_timeout_ms > 30000 {
            return Err(crate::error::FcuBridgeError::Config(
                toml::de::Error::custom("receive_timeout_ms must be between 1 and 30000"),
            ));
        }

        if self.simulator.reconnect_interval_ms == 0 || self.simulator.reconnect_interval_ms > 60000
        {
            return Err(crate::error::FcuBridgeError::Config(
                toml::de::Error::custom("reconnect_interval_ms must be between 1 and 60000"),
            ));
        }

        if self.panel.poll_timeout_ms == 0 || self.panel.poll_timeout_ms > 1000 {
            return Err(crate::error::FcuBridgeError::Config(
                toml::de::Error::custom("poll_timeout_ms must be between 1 and 1000"),
            ));
        }

        if !VARIANTS.contains(&self.panel.variant.as_str()) {
            return Err(crate::error::FcuBridgeError::Config(toml::de::Error::custom(
                format!("variant must be one of: {}", VARIANTS.join(", ")),
            )));
        }

        Ok(())
    }
}
