//! # X-Plane UDP Client
//!
//! Implements the subset of X-Plane's UDP interface the bridge needs:
//!
//! - `RREF` subscriptions: the simulator streams (index, value) pairs for
//!   each registered dataref at a requested per-key rate
//! - `DREF` writes: push a float into a writable dataref
//! - `CMND` sends: fire a simulator command once
//!
//! All three are fixed-layout little-endian datagrams. Receives block with
//! a configured timeout; a timeout surfaces as [`FcuBridgeError::SimTimeout`]
//! so the session can drop to its not-connected state and retry.

use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{FcuBridgeError, Result};
use crate::sim::SimCommands;

/// `RREF` request: 5-byte tag + u32 rate + u32 index + padded name.
const RREF_REQUEST_LEN: usize = 413;

/// `DREF` write: 5-byte tag + f32 value + padded name.
const DREF_REQUEST_LEN: usize = 509;

/// `CMND` send: 5-byte tag + padded name.
const CMND_REQUEST_LEN: usize = 505;

/// Dataref name field width in `RREF` requests.
const RREF_NAME_LEN: usize = 400;

/// Name field width in `DREF`/`CMND` requests.
const WRITE_NAME_LEN: usize = 500;

/// Subscription stream client. One per session; owns the receive socket.
pub struct XPlaneLink {
    socket: UdpSocket,
    remote: SocketAddr,
    /// Subscription order doubles as the RREF index space.
    subscriptions: Vec<(String, u16)>,
    /// Latest value per key, merged across received datagrams.
    values: HashMap<String, f32>,
}

impl std::fmt::Debug for XPlaneLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XPlaneLink")
            .field("remote", &self.remote)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl XPlaneLink {
    /// Bind a local socket and point it at the simulator.
    ///
    /// # Arguments
    ///
    /// * `remote` - Simulator address (usually `127.0.0.1:49000`)
    /// * `receive_timeout` - Round-trip budget for one `get_values` call
    ///
    /// # Errors
    ///
    /// Returns [`FcuBridgeError::SimLink`] if the socket cannot be bound or
    /// configured.
    pub fn connect(remote: SocketAddr, receive_timeout: Duration) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))
            .map_err(|e| FcuBridgeError::SimLink(format!("bind failed: {}", e)))?;
        socket
            .set_read_timeout(Some(receive_timeout))
            .map_err(|e| FcuBridgeError::SimLink(format!("set timeout failed: {}", e)))?;

        Ok(Self {
            socket,
            remote,
            subscriptions: Vec::new(),
            values: HashMap::new(),
        })
    }

    /// Register a dataref subscription at `rate_hz`.
    ///
    /// Idempotent per key; re-subscribing an existing key only refreshes the
    /// request on the wire.
    pub fn subscribe(&mut self, key: &str, rate_hz: u16) -> Result<()> {
        let index = match self.subscriptions.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.subscriptions.push((key.to_string(), rate_hz));
                self.subscriptions.len() - 1
            }
        };
        debug!(key, rate_hz, index, "subscribing dataref");
        self.send(&rref_message(rate_hz, index as u32, key))
    }

    /// Re-issue every subscription request.
    ///
    /// Needed after the simulator restarts or the session reconnects; the
    /// simulator forgets subscribers it has not heard from.
    pub fn resubscribe(&mut self) -> Result<()> {
        for (index, (key, rate_hz)) in self.subscriptions.clone().iter().enumerate() {
            self.send(&rref_message(*rate_hz, index as u32, key))?;
        }
        Ok(())
    }

    /// Receive one datagram and return the full value map.
    ///
    /// The returned batch always contains every key seen so far, so the
    /// consumer can treat it as a whole-state replacement.
    ///
    /// # Errors
    ///
    /// * [`FcuBridgeError::SimTimeout`] - nothing arrived within the
    ///   receive timeout
    /// * [`FcuBridgeError::SimLink`] - socket failure or malformed datagram
    pub fn get_values(&mut self) -> Result<HashMap<String, f32>> {
        let mut buf = [0u8; 2048];
        let len = self.socket.recv(&mut buf).map_err(|e| {
            if matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ) {
                FcuBridgeError::SimTimeout
            } else {
                FcuBridgeError::SimLink(format!("recv failed: {}", e))
            }
        })?;

        for (index, value) in parse_rref_payload(&buf[..len])? {
            match self.subscriptions.get(index as usize) {
                Some((key, _)) => {
                    self.values.insert(key.clone(), value);
                }
                None => warn!(index, "value for unknown subscription index"),
            }
        }

        Ok(self.values.clone())
    }

    /// Clone the socket into a standalone command sink.
    ///
    /// The sink shares the underlying socket but keeps no subscription
    /// state, so the poll loop can fire writes while this side blocks in
    /// `get_values`.
    pub fn commands(&self) -> Result<XPlaneCommands> {
        let socket = self
            .socket
            .try_clone()
            .map_err(|e| FcuBridgeError::SimLink(format!("socket clone failed: {}", e)))?;
        Ok(XPlaneCommands {
            socket,
            remote: self.remote,
        })
    }

    fn send(&self, message: &[u8]) -> Result<()> {
        self.socket
            .send_to(message, self.remote)
            .map_err(|e| FcuBridgeError::SimLink(format!("send failed: {}", e)))?;
        Ok(())
    }
}

/// Write-only handle used from the hardware poll loop.
pub struct XPlaneCommands {
    socket: UdpSocket,
    remote: SocketAddr,
}

impl std::fmt::Debug for XPlaneCommands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XPlaneCommands")
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

impl SimCommands for XPlaneCommands {
    fn write_value(&mut self, key: &str, value: f32) -> Result<()> {
        debug!(key, value, "dataref write");
        self.socket
            .send_to(&dref_message(value, key), self.remote)
            .map_err(|e| FcuBridgeError::SimLink(format!("send failed: {}", e)))?;
        Ok(())
    }

    fn send_command(&mut self, key: &str) -> Result<()> {
        debug!(key, "command send");
        self.socket
            .send_to(&cmnd_message(key), self.remote)
            .map_err(|e| FcuBridgeError::SimLink(format!("send failed: {}", e)))?;
        Ok(())
    }
}

/// Build an `RREF` subscription request.
fn rref_message(rate_hz: u16, index: u32, key: &str) -> Vec<u8> {
    let mut message = Vec::with_capacity(RREF_REQUEST_LEN);
    message.extend_from_slice(b"RREF\0");
    message.extend_from_slice(&(rate_hz as u32).to_le_bytes());
    message.extend_from_slice(&index.to_le_bytes());
    message.extend_from_slice(&padded_name(key, RREF_NAME_LEN));
    message
}

/// Build a `DREF` value-write request.
fn dref_message(value: f32, key: &str) -> Vec<u8> {
    let mut message = Vec::with_capacity(DREF_REQUEST_LEN);
    message.extend_from_slice(b"DREF\0");
    message.extend_from_slice(&value.to_le_bytes());
    message.extend_from_slice(&padded_name(key, WRITE_NAME_LEN));
    message
}

/// Build a `CMND` command request.
fn cmnd_message(key: &str) -> Vec<u8> {
    let mut message = Vec::with_capacity(CMND_REQUEST_LEN);
    message.extend_from_slice(b"CMND\0");
    message.extend_from_slice(&padded_name(key, WRITE_NAME_LEN));
    message
}

/// Zero-pad a name to the fixed field width; overlong names truncate.
fn padded_name(key: &str, width: usize) -> Vec<u8> {
    let mut field = vec![0u8; width];
    let bytes = key.as_bytes();
    let n = bytes.len().min(width);
    field[..n].copy_from_slice(&bytes[..n]);
    field
}

/// Parse an `RREF,` response into (index, value) pairs.
fn parse_rref_payload(data: &[u8]) -> Result<Vec<(u32, f32)>> {
    if data.len() < 5 || &data[..5] != b"RREF," {
        return Err(FcuBridgeError::SimLink(format!(
            "unexpected datagram header ({} bytes)",
            data.len()
        )));
    }

    let mut pairs = Vec::new();
    for chunk in data[5..].chunks_exact(8) {
        let index = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let value = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
        pairs.push((index, value));
    }
    Ok(pairs)
}
