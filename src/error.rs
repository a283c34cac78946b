//! # Error Types
//!
//! Custom error types for FCU Bridge using `thiserror`.
//!
//! Every condition in here is recoverable at some level: transport errors
//! trigger the resend path, malformed reports are discarded, telemetry
//! timeouts drop the session back to "not connected". Nothing terminates
//! the process except a failed bootstrap.

use thiserror::Error;

/// Main error type for FCU Bridge
#[derive(Debug, Error)]
pub enum FcuBridgeError {
    /// A display string contained a character with no segment pattern.
    /// The whole field update is rejected so a corrupt frame is never written.
    #[error("no segment pattern for character {0:?}")]
    Glyph(char),

    /// A statically constructed table (flag slots, button bindings) is
    /// inconsistent. Detected at startup, never at runtime.
    #[error("invalid panel table: {0}")]
    PanelTable(String),

    /// USB transport write/read failures
    #[error("transport error: {0}")]
    Transport(String),

    /// No supported panel attached
    #[error("no supported panel device found ({0})")]
    DeviceNotFound(String),

    /// Button-state report had an unexpected length; the poll cycle is discarded
    #[error("malformed input report: {len} bytes")]
    MalformedReport { len: usize },

    /// The simulator did not answer within the receive timeout
    #[error("simulator timeout")]
    SimTimeout,

    /// Simulator link errors other than timeout
    #[error("simulator link error: {0}")]
    SimLink(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FCU Bridge
pub type Result<T> = std::result::Result<T, FcuBridgeError>;
