//! Ports to the wireless stack and the bonded-device store.
//!
//! The dongle's logic never talks to a radio directly.  It consumes
//! [`StackEvent`]s delivered by the stack's event loop and calls back into the
//! stack through [`HidTransport`].  Pairing records live behind [`BondStore`].
//! Implementations are in the infrastructure layer; unit tests use the
//! `mockall` doubles generated here.

use hydra_core::{AddressKind, BdAddr, SessionHandle};
use thiserror::Error;

/// Errors reported synchronously by the wireless stack.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    /// The stack refused the request with a status code.
    #[error("stack rejected request: status 0x{0:02X}")]
    Rejected(u8),

    /// The handle does not name a live connection.
    #[error("no connection with handle {0}")]
    UnknownHandle(SessionHandle),
}

/// Result of one attempt to hand a report to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Success,
    /// The controller's outgoing buffers are saturated; the same send may be
    /// retried straight away.
    BuffersFull,
    /// Any other stack status code.  Not retried.
    Failed(u8),
}

/// HID protocol mode negotiated by a central.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolMode {
    /// Legacy fixed keyboard and mouse reports only.
    Boot,
    #[default]
    Report,
}

/// Notifications delivered by the wireless stack's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEvent {
    ConnectionComplete {
        handle: SessionHandle,
        address: BdAddr,
        address_kind: AddressKind,
    },
    DisconnectionComplete {
        handle: SessionHandle,
    },
    /// The stack matched a peer's address against a bonded identity.  May
    /// arrive before or after the matching connection.
    IdentityResolved {
        address: BdAddr,
        address_kind: AddressKind,
        identity_address: BdAddr,
        identity_kind: AddressKind,
    },
    ProtocolModeChanged {
        handle: SessionHandle,
        mode: ProtocolMode,
    },
    /// The single-use send credit requested for `handle` is available.
    CanSendNow {
        handle: SessionHandle,
    },
}

/// The HID service and GAP controls of the wireless stack.
#[cfg_attr(test, mockall::automock)]
pub trait HidTransport {
    /// Asks for one [`StackEvent::CanSendNow`] for `handle`.
    fn request_can_send_now(&mut self, handle: SessionHandle) -> Result<(), StackError>;

    fn send_boot_keyboard(&mut self, handle: SessionHandle, payload: &[u8]) -> SendStatus;

    fn send_boot_mouse(&mut self, handle: SessionHandle, payload: &[u8]) -> SendStatus;

    /// Sends a report-mode input report tagged with `report_id`.
    fn send_input_report(
        &mut self,
        handle: SessionHandle,
        report_id: u8,
        payload: &[u8],
    ) -> SendStatus;

    fn set_advertising(&mut self, enabled: bool);

    /// Reboots the device.  Connections are torn down.
    fn restart(&mut self);
}

/// One pairing record in the persistent bonded-device store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondEntry {
    pub address: BdAddr,
    pub address_kind: AddressKind,
    pub identity_key: [u8; 16],
}

/// Slot-indexed persistent store of bonded devices.
#[cfg_attr(test, mockall::automock)]
pub trait BondStore {
    /// Number of slots; some may be empty.
    fn max_count(&self) -> usize;

    /// The record in slot `index`, or `None` for an empty slot.
    fn entry(&self, index: usize) -> Option<BondEntry>;

    fn remove(&mut self, index: usize);
}
