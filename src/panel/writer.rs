//! # Retryable Writer
//!
//! Wraps the transport with the one-shot resend policy: a failed write
//! arms the retry flag, a successful write disarms it. The projector
//! consults the flag each cycle, so a transient USB hiccup forces one full
//! recompute-and-resend on the next telemetry batch and then self-heals.

use std::time::Duration;

use tracing::warn;

use crate::error::Result;
use crate::transport::PanelTransport;

/// Owns the transport handle and the retry flag.
#[derive(Debug)]
pub struct RetryableWriter<T: PanelTransport> {
    transport: T,
    retry_pending: bool,
}

impl<T: PanelTransport> RetryableWriter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            retry_pending: false,
        }
    }

    /// Write one frame; arm the retry flag on failure, disarm on success.
    ///
    /// Failures are logged here and still returned; callers in the update
    /// path treat them as non-fatal because the retry flag already
    /// guarantees a resend.
    pub fn write(&mut self, frame: &[u8]) -> Result<()> {
        match self.transport.write(frame) {
            Ok(()) => {
                self.retry_pending = false;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, len = frame.len(), "frame write failed, will resend");
                self.retry_pending = true;
                Err(e)
            }
        }
    }

    /// True when the most recent write failed and a resend is owed.
    pub fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    /// Timed input-report read on the same device handle.
    pub fn read_input(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        self.transport.read_input(buf, timeout)
    }
}
