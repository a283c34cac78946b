//! # Bridge Session
//!
//! Wires the pieces into the two concurrent activities:
//!
//! - the **telemetry loop** subscribes every needed dataref, fetches value
//!   batches from the simulator and publishes each one whole into a
//!   single-slot [`watch`] channel; a receive timeout drops the session to
//!   not-connected and it keeps retrying
//! - the **hardware poll loop** takes the latest published batch, runs the
//!   projector pass, then reads the button report with a short timeout and
//!   dispatches any edges
//!
//! The poll loop is the only writer of the value cache and the only writer
//! to the USB transport; the telemetry loop only replaces the batch slot.
//! Both loops observe a shared shutdown flag and exit within one blocking
//! timeout of it being set.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::BrightnessConfig;
use crate::error::{FcuBridgeError, Result};
use crate::panel::bindings::{self, ButtonBinding};
use crate::panel::buttons::ButtonEventDetector;
use crate::panel::projector::StateProjector;
use crate::panel::writer::RetryableWriter;
use crate::protocol::frames::{self, DisplayFields};
use crate::protocol::flags::FlagRegister;
use crate::protocol::leds::Led;
use crate::sim::datarefs;
use crate::sim::xplane::XPlaneLink;
use crate::sim::SimCommands;
use crate::transport::{PanelCapabilities, PanelTransport};

/// Input-report read buffer size; the device may queue more than one report.
const READ_BUF_LEN: usize = 105;

/// Poll-loop idle pause while the simulator is away.
const DISCONNECTED_PAUSE: Duration = Duration::from_millis(200);

/// What the telemetry loop last published.
#[derive(Debug, Clone, Default)]
pub enum TelemetryState {
    /// No simulator, or it stopped answering; hardware updates suppressed
    #[default]
    Disconnected,
    /// Latest complete value batch
    Batch(HashMap<String, f32>),
}

/// Every dataref the session subscribes, with its refresh rate.
///
/// LED-bound keys from the binding table come first, then the static
/// display/mode list; the first occurrence of a key wins.
pub fn subscription_keys(table: &[ButtonBinding]) -> Vec<(&'static str, u16)> {
    let mut subs: Vec<(&'static str, u16)> = bindings::led_bound_keys(table)
        .into_iter()
        .map(|key| (key, datarefs::LED_REFRESH_HZ))
        .collect();

    for &(key, rate) in datarefs::STATIC_DATAREFS {
        if !subs.iter().any(|(k, _)| *k == key) {
            subs.push((key, rate));
        }
    }
    subs
}

/// The hardware side of one bridge session: cache, detector, writer and
/// binding table, owned together by the poll loop.
pub struct PanelSession<T: PanelTransport> {
    pub projector: StateProjector,
    pub detector: ButtonEventDetector,
    pub writer: RetryableWriter<T>,
    pub bindings: Vec<ButtonBinding>,
    caps: PanelCapabilities,
    poll_timeout: Duration,
}

impl<T: PanelTransport> PanelSession<T> {
    pub fn new(transport: T, caps: PanelCapabilities, poll_timeout: Duration) -> Result<Self> {
        let table = bindings::build_bindings(caps)?;
        let mut projector = StateProjector::new(caps)?;
        projector.register_keys(subscription_keys(&table).iter().map(|(k, _)| *k));

        Ok(Self {
            projector,
            detector: ButtonEventDetector::new(caps),
            writer: RetryableWriter::new(transport),
            bindings: table,
            caps,
            poll_timeout,
        })
    }

    /// Wake the hardware and bring it to a defined idle state: configured
    /// backlight levels, blanked displays.
    pub fn startup(&mut self, brightness: &BrightnessConfig) -> Result<()> {
        let _ = self.writer.write(&frames::build_init_frame());

        for led in [Led::ScreenBacklight, Led::EfisRightScreenBacklight] {
            self.set_led(led, brightness.screen);
        }
        for led in [Led::Backlight, Led::EfisRightBacklight] {
            self.set_led(led, brightness.panel);
        }

        let blank = DisplayFields {
            speed: "   ".into(),
            heading: "   ".into(),
            altitude: "     ".into(),
            vertical_speed: "    ".into(),
        };
        let slots = FlagRegister::new()?.compose();
        let (content, commit) = frames::build_display_frames(&blank, &slots)?;
        let _ = self.writer.write(&content);
        let _ = self.writer.write(&commit);

        if self.caps.efis_right {
            let frame = frames::build_secondary_frame("----", &slots)?;
            let _ = self.writer.write(&frame);
        }
        Ok(())
    }

    fn set_led(&mut self, led: Led, level: u8) {
        if led.panel() == crate::protocol::leds::LedPanel::EfisRight && !self.caps.efis_right {
            return;
        }
        if let Some(frame) = frames::build_led_frame(led, level) {
            let _ = self.writer.write(&frame);
        }
    }

    /// One poll cycle: projector pass over the latest batch, then a timed
    /// button read, edge computation and dispatch.
    pub fn cycle(&mut self, batch: &HashMap<String, f32>, sim: &mut dyn SimCommands) -> Result<()> {
        self.projector.apply(batch, &self.bindings, &mut self.writer)?;

        let mut buf = [0u8; READ_BUF_LEN];
        let n = self.writer.read_input(&mut buf, self.poll_timeout)?;
        if n == 0 {
            // poll timeout, no report pending
            return Ok(());
        }

        match self.detector.observe(&buf[..n]) {
            Ok(()) => self.detector.dispatch(&self.bindings, self.projector.cache(), sim),
            Err(e @ FcuBridgeError::MalformedReport { .. }) => {
                // discard this cycle; the snapshot is untouched, so the
                // next valid report produces correct edges
                debug!(error = %e, "discarding poll cycle");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

/// Telemetry fetch loop; runs on a blocking task until shutdown.
///
/// Connection state machine: subscribe all keys, then fetch until a
/// timeout; on timeout fall back to not-connected, publish that, pause and
/// re-subscribe.
pub fn run_telemetry_loop(
    mut link: XPlaneLink,
    subs: Vec<(&'static str, u16)>,
    tx: watch::Sender<TelemetryState>,
    shutdown: Arc<AtomicBool>,
    reconnect_interval: Duration,
) {
    let mut connected = false;
    let mut ever_subscribed = false;

    while !shutdown.load(Ordering::Relaxed) {
        if !connected {
            let subscribed = if ever_subscribed {
                link.resubscribe()
            } else {
                subscribe_all(&mut link, &subs)
            };
            if let Err(e) = subscribed {
                warn!(error = %e, "subscription failed, retrying");
                std::thread::sleep(reconnect_interval);
                continue;
            }
            ever_subscribed = true;

            match link.get_values() {
                Ok(batch) => {
                    info!("simulator connected");
                    connected = true;
                    tx.send_replace(TelemetryState::Batch(batch));
                }
                Err(FcuBridgeError::SimTimeout) => {
                    debug!("waiting for simulator");
                    std::thread::sleep(reconnect_interval);
                }
                Err(e) => {
                    warn!(error = %e, "simulator link error while connecting");
                    std::thread::sleep(reconnect_interval);
                }
            }
            continue;
        }

        match link.get_values() {
            Ok(batch) => {
                tx.send_replace(TelemetryState::Batch(batch));
            }
            Err(e) => {
                warn!(error = %e, "simulator lost, reconnecting");
                connected = false;
                tx.send_replace(TelemetryState::Disconnected);
                std::thread::sleep(reconnect_interval);
            }
        }
    }
    info!("telemetry loop stopped");
}

fn subscribe_all(link: &mut XPlaneLink, subs: &[(&'static str, u16)]) -> Result<()> {
    for &(key, rate) in subs {
        link.subscribe(key, rate)?;
    }
    Ok(())
}

/// Hardware poll loop; runs on a blocking task until shutdown.
pub fn run_panel_loop<T: PanelTransport, S: SimCommands>(
    mut session: PanelSession<T>,
    mut rx: watch::Receiver<TelemetryState>,
    mut sim: S,
    shutdown: Arc<AtomicBool>,
) {
    while !shutdown.load(Ordering::Relaxed) {
        let state = rx.borrow_and_update().clone();
        match state {
            TelemetryState::Disconnected => {
                std::thread::sleep(DISCONNECTED_PAUSE);
            }
            TelemetryState::Batch(batch) => {
                if let Err(e) = session.cycle(&batch, &mut sim) {
                    warn!(error = %e, "poll cycle failed");
                    std::thread::sleep(DISCONNECTED_PAUSE);
                }
            }
        }
    }
    info!("hardware poll loop stopped");
}
