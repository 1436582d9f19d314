//! In-process stand-ins for the wireless stack and the bonded-device store.
//!
//! [`LoopbackTransport`] answers every send-credit request by queuing a
//! [`StackEvent::CanSendNow`] on the same channel the command processor
//! drains, records every report it is asked to send, and can be told to
//! report full buffers a number of times first.  A connection event can be
//! registered to replay after every restart, standing in for a central that
//! reconnects on its own.  It lets the dongle binary and
//! the integration tests run the complete delivery path without a radio.

use std::sync::mpsc::{self, Receiver, Sender};

use hydra_core::SessionHandle;
use tracing::debug;

use crate::application::stack::{
    BondEntry, BondStore, HidTransport, SendStatus, StackError, StackEvent,
};

/// Which send primitive a report went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPath {
    BootKeyboard,
    BootMouse,
    /// Report mode with this report ID.
    Report(u8),
}

/// One report that reached the loopback stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReport {
    pub handle: SessionHandle,
    pub path: SendPath,
    pub payload: Vec<u8>,
}

pub struct LoopbackTransport {
    events: Sender<StackEvent>,
    grant_credits: bool,
    buffers_full_budget: u32,
    advertising: bool,
    restarts: u32,
    reconnect: Option<StackEvent>,
    sent: Vec<SentReport>,
}

impl LoopbackTransport {
    /// Creates the transport and the receiving end of its event channel.
    pub fn new() -> (Self, Receiver<StackEvent>) {
        let (tx, rx) = mpsc::channel();
        let transport = Self {
            events: tx,
            grant_credits: true,
            buffers_full_budget: 0,
            advertising: false,
            restarts: 0,
            reconnect: None,
            sent: Vec::new(),
        };
        (transport, rx)
    }

    /// A sender for injecting connection and identity events.
    pub fn event_sender(&self) -> Sender<StackEvent> {
        self.events.clone()
    }

    /// When `false`, credit requests succeed but the credit never arrives.
    pub fn set_grant_credits(&mut self, grant: bool) {
        self.grant_credits = grant;
    }

    /// Queues `event` again after every restart.
    pub fn reconnect_on_restart(&mut self, event: StackEvent) {
        self.reconnect = Some(event);
    }

    /// Makes the next `count` send attempts report full buffers.
    pub fn fill_buffers(&mut self, count: u32) {
        self.buffers_full_budget = count;
    }

    pub fn advertising(&self) -> bool {
        self.advertising
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn sent(&self) -> &[SentReport] {
        &self.sent
    }

    fn record(&mut self, handle: SessionHandle, path: SendPath, payload: &[u8]) -> SendStatus {
        if self.buffers_full_budget > 0 {
            self.buffers_full_budget -= 1;
            return SendStatus::BuffersFull;
        }
        self.sent.push(SentReport {
            handle,
            path,
            payload: payload.to_vec(),
        });
        SendStatus::Success
    }
}

impl HidTransport for LoopbackTransport {
    fn request_can_send_now(&mut self, handle: SessionHandle) -> Result<(), StackError> {
        if self.grant_credits {
            // The receiver lives as long as the processor; a closed channel
            // means shutdown, when nobody is waiting for the credit anyway.
            let _ = self.events.send(StackEvent::CanSendNow { handle });
        }
        Ok(())
    }

    fn send_boot_keyboard(&mut self, handle: SessionHandle, payload: &[u8]) -> SendStatus {
        self.record(handle, SendPath::BootKeyboard, payload)
    }

    fn send_boot_mouse(&mut self, handle: SessionHandle, payload: &[u8]) -> SendStatus {
        self.record(handle, SendPath::BootMouse, payload)
    }

    fn send_input_report(
        &mut self,
        handle: SessionHandle,
        report_id: u8,
        payload: &[u8],
    ) -> SendStatus {
        self.record(handle, SendPath::Report(report_id), payload)
    }

    fn set_advertising(&mut self, enabled: bool) {
        self.advertising = enabled;
    }

    fn restart(&mut self) {
        debug!("loopback stack restarted");
        self.restarts += 1;
        self.advertising = true;
        if let Some(event) = self.reconnect.clone() {
            let _ = self.events.send(event);
        }
    }
}

/// Bonded-device store held in memory.
#[derive(Debug, Clone)]
pub struct MemoryBondStore {
    slots: Vec<Option<BondEntry>>,
}

impl MemoryBondStore {
    pub fn with_capacity(slots: usize) -> Self {
        Self {
            slots: vec![None; slots],
        }
    }

    /// Stores `entry` in the first free slot and returns its index.
    pub fn insert(&mut self, entry: BondEntry) -> Option<usize> {
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(entry);
        Some(index)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BondStore for MemoryBondStore {
    fn max_count(&self) -> usize {
        self.slots.len()
    }

    fn entry(&self, index: usize) -> Option<BondEntry> {
        self.slots.get(index).cloned().flatten()
    }

    fn remove(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = None;
        }
    }
}
