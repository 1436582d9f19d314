//! DeliveryEngine: sends one report at a time against the stack's send credit.
//!
//! # State machine
//!
//! ```text
//!            submit                 CanSendNow
//!   Idle ─────────────► AwaitingSendCredit ─────────► Sending ──► Idle
//!    ▲                        │                         │  ▲
//!    │      credit timeout    │              BuffersFull│  │resend
//!    └────────────────────────┘                         ▼  │
//!                                                     Retrying
//! ```
//!
//! The wireless stack hands out a single "can send now" credit per request,
//! not a counter, so at most one report is ever in flight.  A submission that
//! arrives while the engine is busy is rejected and counted as dropped; every
//! submission therefore ends in exactly one terminal outcome (sent or dropped)
//! and `DeliveryCounters::total_outcomes` equals the number of submissions.
//!
//! The active peer is looked up in the registry both when the credit is
//! requested and again when it arrives: the operator may have switched
//! centrals, or the central may have gone, in between.

use std::collections::HashMap;
use std::fmt;

use hydra_core::{DeliveryCounters, HidReport, ReportKind, SessionHandle};
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::central_registry::CentralRegistry;
use super::stack::{HidTransport, ProtocolMode, SendStatus};

/// Where the engine is in delivering the current report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    Idle,
    AwaitingSendCredit,
    Sending,
    Retrying,
}

/// Why a report was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NoActivePeer,
    UnsupportedInBootMode,
    /// The stack returned this status code.
    SendFailed(u8),
    /// Buffers stayed full past the configured retry cap.
    RetryLimit,
    CreditTimeout,
    CreditRequestFailed,
    /// Another report was still in flight.
    Busy,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NoActivePeer => f.write_str("no active central"),
            DropReason::UnsupportedInBootMode => f.write_str("unsupported in boot mode"),
            DropReason::SendFailed(code) => write!(f, "send failed with status 0x{code:02X}"),
            DropReason::RetryLimit => f.write_str("buffers stayed full"),
            DropReason::CreditTimeout => f.write_str("send credit never arrived"),
            DropReason::CreditRequestFailed => f.write_str("send credit request refused"),
            DropReason::Busy => f.write_str("another report is in flight"),
        }
    }
}

/// Terminal outcome of one submitted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent { kind: ReportKind, retries: u32 },
    Dropped { kind: ReportKind, reason: DropReason },
}

/// Returned by [`DeliveryEngine::submit`] when the engine is not idle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("a {in_flight} report is still in flight; {rejected} report dropped")]
    Busy {
        in_flight: ReportKind,
        rejected: ReportKind,
    },
}

#[derive(Debug)]
struct PendingReport {
    report: HidReport,
    retries: u32,
}

/// The report delivery state machine and its counters.
#[derive(Debug)]
pub struct DeliveryEngine {
    state: DeliveryState,
    pending: Option<PendingReport>,
    counters: DeliveryCounters,
    protocol_modes: HashMap<SessionHandle, ProtocolMode>,
    /// `None` retries buffer-full sends without limit.
    max_buffer_full_retries: Option<u32>,
}

impl DeliveryEngine {
    pub fn new(max_buffer_full_retries: Option<u32>) -> Self {
        Self {
            state: DeliveryState::Idle,
            pending: None,
            counters: DeliveryCounters::default(),
            protocol_modes: HashMap::new(),
            max_buffer_full_retries,
        }
    }

    pub fn state(&self) -> DeliveryState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DeliveryState::Idle
    }

    pub fn counters(&self) -> &DeliveryCounters {
        &self.counters
    }

    pub fn reset_counters(&mut self) {
        self.counters.reset();
    }

    /// Records the protocol mode a central negotiated.
    pub fn set_protocol_mode(&mut self, handle: SessionHandle, mode: ProtocolMode) {
        self.protocol_modes.insert(handle, mode);
    }

    /// The mode negotiated by `handle`; report mode until told otherwise.
    pub fn protocol_mode(&self, handle: SessionHandle) -> ProtocolMode {
        self.protocol_modes.get(&handle).copied().unwrap_or_default()
    }

    /// Drops per-connection state for a closed connection.
    pub fn forget(&mut self, handle: SessionHandle) {
        self.protocol_modes.remove(&handle);
    }

    /// Starts delivering `report` to the active peer.
    ///
    /// Returns `Ok(None)` once the send credit has been requested; the outcome
    /// arrives later through [`DeliveryEngine::on_send_credit`] or
    /// [`DeliveryEngine::credit_timed_out`].  Returns `Ok(Some(outcome))` when
    /// the report was dropped straight away.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::Busy`] when a report is already in flight.  The
    /// rejected report is counted as dropped.
    pub fn submit(
        &mut self,
        report: HidReport,
        registry: &CentralRegistry,
        transport: &mut dyn HidTransport,
    ) -> Result<Option<DeliveryOutcome>, DeliveryError> {
        let kind = report.kind();
        if let Some(in_flight) = self.pending.as_ref().map(|p| p.report.kind()) {
            self.counters.record_dropped(kind);
            warn!(%kind, %in_flight, "report submitted while another is in flight; dropped");
            return Err(DeliveryError::Busy {
                in_flight,
                rejected: kind,
            });
        }

        let Some(peer) = registry.active() else {
            return Ok(Some(self.drop_report(kind, DropReason::NoActivePeer)));
        };

        match transport.request_can_send_now(peer.session_handle) {
            Ok(()) => {
                trace!(%kind, handle = %peer.session_handle, "send credit requested");
                self.pending = Some(PendingReport { report, retries: 0 });
                self.state = DeliveryState::AwaitingSendCredit;
                Ok(None)
            }
            Err(e) => {
                warn!(%kind, handle = %peer.session_handle, "send credit request failed: {e}");
                Ok(Some(self.drop_report(kind, DropReason::CreditRequestFailed)))
            }
        }
    }

    /// Handles the stack's "can send now" credit.
    ///
    /// Returns the outcome of the pending report, or `None` when no report was
    /// waiting for a credit.
    pub fn on_send_credit(
        &mut self,
        registry: &CentralRegistry,
        transport: &mut dyn HidTransport,
    ) -> Option<DeliveryOutcome> {
        if self.state != DeliveryState::AwaitingSendCredit {
            debug!(state = ?self.state, "send credit with nothing pending ignored");
            return None;
        }
        let mut pending = self.pending.take()?;
        let kind = pending.report.kind();
        self.state = DeliveryState::Sending;

        let Some(peer) = registry.active() else {
            return Some(self.drop_report(kind, DropReason::NoActivePeer));
        };
        let handle = peer.session_handle;
        let mode = self.protocol_mode(handle);
        if mode == ProtocolMode::Boot && !kind.has_boot_report() {
            warn!(%kind, %handle, "report kind unsupported in boot mode; dropped");
            return Some(self.drop_report(kind, DropReason::UnsupportedInBootMode));
        }

        loop {
            let payload = pending.report.payload();
            let status = match (mode, kind) {
                (ProtocolMode::Boot, ReportKind::Keyboard) => {
                    transport.send_boot_keyboard(handle, payload)
                }
                (ProtocolMode::Boot, _) => transport.send_boot_mouse(handle, payload),
                (ProtocolMode::Report, _) => {
                    transport.send_input_report(handle, kind.report_id(), payload)
                }
            };

            match status {
                SendStatus::Success => {
                    self.counters.record_sent(kind);
                    self.state = DeliveryState::Idle;
                    trace!(%kind, %handle, retries = pending.retries, "report sent");
                    return Some(DeliveryOutcome::Sent {
                        kind,
                        retries: pending.retries,
                    });
                }
                SendStatus::BuffersFull => {
                    self.counters.record_retry(kind);
                    self.state = DeliveryState::Retrying;
                    pending.retries += 1;
                    if self
                        .max_buffer_full_retries
                        .is_some_and(|cap| pending.retries > cap)
                    {
                        warn!(%kind, %handle, retries = pending.retries, "buffers still full; giving up");
                        return Some(self.drop_report(kind, DropReason::RetryLimit));
                    }
                    debug!(%kind, %handle, "buffers full, retrying");
                    self.state = DeliveryState::Sending;
                }
                SendStatus::Failed(code) => {
                    warn!(%kind, %handle, "send failed with status 0x{code:02X}; dropped");
                    return Some(self.drop_report(kind, DropReason::SendFailed(code)));
                }
            }
        }
    }

    /// Abandons a report whose send credit never arrived.
    pub fn credit_timed_out(&mut self) -> Option<DeliveryOutcome> {
        if self.state != DeliveryState::AwaitingSendCredit {
            return None;
        }
        let pending = self.pending.take()?;
        let kind = pending.report.kind();
        warn!(%kind, "send credit did not arrive in time; dropped");
        Some(self.drop_report(kind, DropReason::CreditTimeout))
    }

    /// Discards any in-flight report without counting it.  Used on restart.
    pub fn abort(&mut self) {
        self.pending = None;
        self.state = DeliveryState::Idle;
        self.protocol_modes.clear();
    }

    fn drop_report(&mut self, kind: ReportKind, reason: DropReason) -> DeliveryOutcome {
        self.counters.record_dropped(kind);
        self.pending = None;
        self.state = DeliveryState::Idle;
        debug!(%kind, %reason, "report dropped");
        DeliveryOutcome::Dropped { kind, reason }
    }
}

impl Default for DeliveryEngine {
    fn default() -> Self {
        Self::new(None)
    }
}
