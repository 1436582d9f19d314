//! DongleLink: request/response access to the dongle's serial link.
//!
//! The link carries one command at a time.  [`DongleLink`] owns the stream
//! behind a single async mutex, so a command, its purge, and its response
//! read always run as one unit.
//!
//! # Exchange shape (for beginners)
//!
//! ```text
//! text command:  purge stale bytes → write command → read reply until quiet
//! report frame:  write tag + payload (no reply expected)
//! ```
//!
//! The dongle never answers report frames or unknown commands, and replies
//! to text commands have no length prefix.  A reply is therefore read until
//! the link has been quiet for the settle gap, or until the response timeout
//! if nothing arrives at all.  An empty reply is not an error.
//!
//! While the dongle's verbose mode is on it also writes `log: ` lines, even
//! after report frames.  The purge before each text command discards them.

pub mod port;

use std::time::Duration;

use async_trait::async_trait;
use hydra_core::protocol::parse_listing;
use hydra_core::report::{KeyboardReport, MouseReport};
use hydra_core::{
    BdAddr, Command, DashboardAction, DeliveryCounters, HidReport, PeerRow, ProtocolError,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};
use tracing::{debug, trace, warn};

use crate::application::forward_input::ReportSink;
use crate::application::manage_peers::PeerLink;

const READ_CHUNK: usize = 256;

/// Error type for link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected reply from dongle: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("the dongle closed the link")]
    Closed,

    #[error("no dongle serial port found (looking for USB product {0:?})")]
    PortNotFound(String),

    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
}

/// Timing of a request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTimings {
    /// Longest wait for the first byte of a reply.
    pub response_timeout: Duration,
    /// A reply is complete once the link has been quiet this long.
    pub settle: Duration,
    /// Quiet time that ends the purge of stale bytes.
    pub purge_window: Duration,
}

impl Default for LinkTimings {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_millis(1000),
            settle: Duration::from_millis(100),
            purge_window: Duration::from_millis(10),
        }
    }
}

/// The dongle's serial link.  `S` is the serial stream, or any in-memory
/// stream in tests.
pub struct DongleLink<S> {
    stream: Mutex<S>,
    timings: LinkTimings,
}

impl<S> DongleLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, timings: LinkTimings) -> Self {
        Self {
            stream: Mutex::new(stream),
            timings,
        }
    }

    /// Sends a report frame.  The dongle does not reply.
    pub async fn send_report(&self, report: HidReport) -> Result<(), LinkError> {
        let frame = Command::Report(report).encode();
        trace!(kind = %report.kind(), len = frame.len(), "report frame");
        let mut stream = self.stream.lock().await;
        stream.write_all(&frame).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Sends an all-zero keyboard report and an all-zero mouse report.
    pub async fn flush(&self) -> Result<(), LinkError> {
        self.send_report(KeyboardReport::default().into()).await?;
        self.send_report(MouseReport::default().into()).await
    }

    /// Sends a text command and returns its reply as text.
    ///
    /// Commands that get no reply (`u`, `r`) return as soon as they are
    /// written.
    pub async fn request(&self, command: Command) -> Result<String, LinkError> {
        let bytes = command.encode();
        let mut stream = self.stream.lock().await;

        let stale = purge(&mut *stream, self.timings.purge_window).await?;
        if stale > 0 {
            debug!(bytes = stale, "discarded stale link bytes");
        }

        stream.write_all(&bytes).await?;
        stream.flush().await?;
        if !command.expects_response() {
            return Ok(String::new());
        }

        let reply = read_reply(&mut *stream, self.timings).await?;
        if reply.is_empty() {
            let lead = char::from(bytes[0]);
            warn!(command = %lead, "no reply from dongle");
        }
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }

    /// Rows of the dongle's central listing.
    pub async fn list_peers(&self) -> Result<Vec<PeerRow>, LinkError> {
        let reply = self.request(Command::ListPeers).await?;
        Ok(parse_listing(&reply)?)
    }

    /// Asks the dongle to switch to the central with `address`.
    pub async fn select_peer(&self, address: BdAddr) -> Result<String, LinkError> {
        self.request(Command::SelectPeer(address)).await
    }

    pub async fn set_advertising(&self, enabled: bool) -> Result<String, LinkError> {
        self.request(Command::Advertise(enabled)).await
    }

    /// Reads the delivery counters.
    pub async fn dashboard_show(&self) -> Result<DeliveryCounters, LinkError> {
        let reply = self.request(Command::Dashboard(DashboardAction::Show)).await?;
        Ok(DeliveryCounters::parse(&reply)?)
    }

    /// Zeroes the delivery counters and returns the zeroed table.
    pub async fn dashboard_reset(&self) -> Result<DeliveryCounters, LinkError> {
        let reply = self.request(Command::Dashboard(DashboardAction::Reset)).await?;
        Ok(DeliveryCounters::parse(&reply)?)
    }

    pub async fn toggle_verbose(&self) -> Result<String, LinkError> {
        self.request(Command::ToggleVerbose).await
    }

    pub async fn help(&self) -> Result<String, LinkError> {
        self.request(Command::Help).await
    }

    pub async fn restart(&self) -> Result<(), LinkError> {
        self.request(Command::Restart).await.map(drop)
    }

    /// Removes every bond on the dongle; the dongle restarts afterwards.
    pub async fn unpair(&self) -> Result<(), LinkError> {
        self.request(Command::UnpairAll).await.map(drop)
    }
}

/// Discards bytes until the link has been quiet for `window`.
async fn purge<S>(stream: &mut S, window: Duration) -> Result<usize, LinkError>
where
    S: AsyncRead + Unpin,
{
    let mut discarded = 0;
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match timeout(window, stream.read(&mut buf)).await {
            Err(_) | Ok(Ok(0)) => return Ok(discarded),
            Ok(Ok(n)) => discarded += n,
            Ok(Err(e)) => return Err(e.into()),
        }
    }
}

/// Reads a reply until the link settles or the response timeout expires.
async fn read_reply<S>(stream: &mut S, timings: LinkTimings) -> Result<Vec<u8>, LinkError>
where
    S: AsyncRead + Unpin,
{
    let deadline = Instant::now() + timings.response_timeout;
    let mut reply = Vec::new();
    let mut buf = [0u8; READ_CHUNK];
    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let left = deadline - now;
        let wait = if reply.is_empty() {
            left
        } else {
            timings.settle.min(left)
        };
        match timeout(wait, stream.read(&mut buf)).await {
            Err(_) => break,
            Ok(Ok(0)) if reply.is_empty() => return Err(LinkError::Closed),
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => reply.extend_from_slice(&buf[..n]),
            Ok(Err(e)) => return Err(e.into()),
        }
    }
    Ok(reply)
}

#[async_trait]
impl<S> ReportSink for DongleLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_report(&self, report: HidReport) -> Result<(), String> {
        DongleLink::send_report(self, report)
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl<S> PeerLink for DongleLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn list_peers(&self) -> Result<Vec<PeerRow>, String> {
        DongleLink::list_peers(self).await.map_err(|e| e.to_string())
    }

    async fn select_peer(&self, address: BdAddr) -> Result<(), String> {
        DongleLink::select_peer(self, address)
            .await
            .map(drop)
            .map_err(|e| e.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
