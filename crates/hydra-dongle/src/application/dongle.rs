//! Dongle: the registry, the delivery engine, and their stack collaborators.
//!
//! One `Dongle` lives for the whole process.  It is driven from a single
//! thread: stack events come in through [`Dongle::handle_event`], link
//! commands through the other methods, and each call runs to completion
//! before the next, so no locking is involved.

use std::time::Duration;

use hydra_core::{BdAddr, ConnectedPeer, DeliveryCounters, HidReport, SessionHandle};
use tracing::{debug, info};

use super::central_registry::CentralRegistry;
use super::delivery::{DeliveryEngine, DeliveryError, DeliveryOutcome, DeliveryState};
use super::stack::{BondStore, HidTransport, StackEvent};

/// Runtime limits of the dongle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DongleConfig {
    /// Advertising is turned back on after a connection while fewer than this
    /// many centrals are connected.
    pub max_connections: usize,
    /// How long a submitted report waits for the send credit before it is
    /// dropped.
    pub credit_wait: Duration,
    /// Cap on immediate resends after a buffer-full status; `None` retries
    /// until the buffers drain.
    pub max_buffer_full_retries: Option<u32>,
}

impl Default for DongleConfig {
    fn default() -> Self {
        Self {
            max_connections: 4,
            credit_wait: Duration::from_secs(1),
            max_buffer_full_retries: None,
        }
    }
}

pub struct Dongle<T, B> {
    config: DongleConfig,
    registry: CentralRegistry,
    engine: DeliveryEngine,
    transport: T,
    bonds: B,
}

impl<T: HidTransport, B: BondStore> Dongle<T, B> {
    pub fn new(config: DongleConfig, transport: T, bonds: B) -> Self {
        let engine = DeliveryEngine::new(config.max_buffer_full_retries);
        Self {
            config,
            registry: CentralRegistry::new(),
            engine,
            transport,
            bonds,
        }
    }

    pub fn config(&self) -> &DongleConfig {
        &self.config
    }

    /// Applies one stack notification.
    ///
    /// Returns the delivery outcome when the event completed a pending report.
    pub fn handle_event(&mut self, event: StackEvent) -> Option<DeliveryOutcome> {
        match event {
            StackEvent::ConnectionComplete {
                handle,
                address,
                address_kind,
            } => {
                self.registry.connect(handle, address, address_kind);
                if self.registry.len() < self.config.max_connections {
                    debug!(connected = self.registry.len(), "room for more centrals; advertising");
                    self.transport.set_advertising(true);
                }
                None
            }
            StackEvent::DisconnectionComplete { handle } => {
                self.registry.disconnect(handle);
                self.engine.forget(handle);
                None
            }
            StackEvent::IdentityResolved {
                address,
                address_kind,
                identity_address,
                identity_kind,
            } => {
                self.registry.record_identity_resolution(
                    address,
                    address_kind,
                    identity_address,
                    identity_kind,
                );
                None
            }
            StackEvent::ProtocolModeChanged { handle, mode } => {
                info!(%handle, ?mode, "protocol mode changed");
                self.engine.set_protocol_mode(handle, mode);
                None
            }
            StackEvent::CanSendNow { .. } => {
                self.engine.on_send_credit(&self.registry, &mut self.transport)
            }
        }
    }

    /// Hands a report to the delivery engine.  See [`DeliveryEngine::submit`].
    pub fn submit(
        &mut self,
        report: HidReport,
    ) -> Result<Option<DeliveryOutcome>, DeliveryError> {
        self.engine.submit(report, &self.registry, &mut self.transport)
    }

    /// Gives up on the report waiting for a send credit, if any.
    pub fn credit_timed_out(&mut self) -> Option<DeliveryOutcome> {
        self.engine.credit_timed_out()
    }

    pub fn delivery_state(&self) -> DeliveryState {
        self.engine.state()
    }

    pub fn is_idle(&self) -> bool {
        self.engine.is_idle()
    }

    pub fn has_peers(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn active_peer(&self) -> Option<ConnectedPeer> {
        self.registry.active()
    }

    /// Connected peers with fresh identity key digests.
    pub fn list_peers(&mut self) -> Vec<ConnectedPeer> {
        self.registry.list(&self.bonds)
    }

    /// Activates the connected central with `address`.
    pub fn select_peer(&mut self, address: BdAddr) -> Option<SessionHandle> {
        self.registry.select_by_address(address)
    }

    pub fn set_advertising(&mut self, enabled: bool) {
        info!(enabled, "advertising");
        self.transport.set_advertising(enabled);
    }

    pub fn counters(&self) -> &DeliveryCounters {
        self.engine.counters()
    }

    pub fn reset_counters(&mut self) {
        self.engine.reset_counters();
    }

    /// Removes every bonded-store record, then restarts.
    pub fn unpair_all(&mut self) {
        for index in 0..self.bonds.max_count() {
            debug!(index, "removing bonded device");
            self.bonds.remove(index);
        }
        self.restart();
    }

    /// Restarts the device.  Connections and any in-flight report are gone
    /// afterwards; delivery counters survive.
    pub fn restart(&mut self) {
        info!("restarting");
        self.transport.restart();
        self.registry.clear_connections();
        self.engine.abort();
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn bonds(&self) -> &B {
        &self.bonds
    }
}
