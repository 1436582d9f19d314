//! CentralRegistry: connected centrals, identity resolution, and the active peer.
//!
//! The registry is the only owner of session handles.  Every other component
//! asks it for "the active peer" at the moment it needs one and never keeps a
//! handle across events, so a disconnect can never leave a stale handle in use.
//!
//! # Identity resolution (for beginners)
//!
//! Phones and laptops usually connect from a *random* address that rotates
//! every few minutes.  Once bonded, the wireless stack can map such an
//! address back to the device's stable *public* identity address, and it
//! reports that mapping through [`StackEvent::IdentityResolved`].  The registry
//! remembers every random → public mapping it has seen, independently of the
//! peer set, because the mapping can arrive before the connection it belongs
//! to.  On connect, a known random address is replaced by its public identity.
//!
//! # Active peer
//!
//! The first central to connect becomes active.  When the active central
//! disconnects nothing is promoted in its place: input would otherwise start
//! flowing to a machine the operator did not pick.
//!
//! [`StackEvent::IdentityResolved`]: super::stack::StackEvent::IdentityResolved

use std::collections::HashMap;

use hydra_core::domain::peer::key_digest;
use hydra_core::{AddressKind, BdAddr, ConnectedPeer, PeerIdentity, SessionHandle};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::stack::BondStore;

/// Errors returned by registry lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no connected central with handle {0}")]
    NotFound(SessionHandle),
}

/// In-memory set of connected centrals plus the address resolution cache.
#[derive(Debug, Default)]
pub struct CentralRegistry {
    /// Connected peers in connection order.  `is_active` is not stored here;
    /// it is derived from `active` whenever a snapshot is handed out.
    peers: Vec<ConnectedPeer>,
    active: Option<SessionHandle>,
    /// Random address → resolved public identity address.
    resolved: HashMap<BdAddr, BdAddr>,
}

impl CentralRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection and returns a snapshot of the stored peer.
    ///
    /// A random address with a known public identity is stored as that
    /// identity.  The first peer in an empty registry becomes active.
    pub fn connect(
        &mut self,
        handle: SessionHandle,
        raw_address: BdAddr,
        address_kind: AddressKind,
    ) -> ConnectedPeer {
        let identity = match (address_kind, self.resolved.get(&raw_address)) {
            (AddressKind::Random, Some(&public)) => {
                debug!(%handle, %raw_address, %public, "random address resolved at connect");
                PeerIdentity::new(public, AddressKind::Public)
            }
            _ => PeerIdentity::new(raw_address, address_kind),
        };

        if let Some(stale) = self.peers.iter().position(|p| p.session_handle == handle) {
            warn!(%handle, "connection reported for a handle already in use; replacing it");
            self.peers.remove(stale);
        }

        self.peers.push(ConnectedPeer {
            session_handle: handle,
            identity,
            is_active: false,
        });
        if self.peers.len() == 1 {
            self.active = Some(handle);
        }

        info!(%handle, address = %self.peers[self.peers.len() - 1].identity.canonical_address, "central connected");
        self.snapshot(self.peers.len() - 1)
    }

    /// Removes the peer with `handle`.  Unknown handles are ignored.
    ///
    /// Disconnecting the active peer leaves no peer active.
    pub fn disconnect(&mut self, handle: SessionHandle) {
        let Some(index) = self.peers.iter().position(|p| p.session_handle == handle) else {
            debug!(%handle, "disconnect for unknown handle ignored");
            return;
        };
        let peer = self.peers.remove(index);
        if self.active == Some(handle) {
            self.active = None;
            info!(%handle, address = %peer.identity.canonical_address, "active central disconnected; no central is active");
        } else {
            info!(%handle, address = %peer.identity.canonical_address, "central disconnected");
        }
    }

    /// The active peer, if one is selected and still connected.
    pub fn active(&self) -> Option<ConnectedPeer> {
        let handle = self.active?;
        self.index_of(handle).map(|i| self.snapshot(i))
    }

    /// Makes the peer with `handle` the only active one.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] when no connected peer has `handle`.
    pub fn set_active(&mut self, handle: SessionHandle) -> Result<(), RegistryError> {
        if self.index_of(handle).is_none() {
            return Err(RegistryError::NotFound(handle));
        }
        self.active = Some(handle);
        Ok(())
    }

    /// Activates the connected peer whose canonical address is `address`.
    ///
    /// Returns the handle that became active, or `None` when no connected peer
    /// has that address.
    pub fn select_by_address(&mut self, address: BdAddr) -> Option<SessionHandle> {
        let handle = self
            .peers
            .iter()
            .find(|p| p.identity.canonical_address == address)?
            .session_handle;
        self.set_active(handle).ok()?;
        Some(handle)
    }

    /// Records a random → public identity mapping reported by the stack.
    ///
    /// Only a random address resolved to a public identity is cached; every
    /// other combination is ignored.  A repeated mapping overwrites the old one.
    pub fn record_identity_resolution(
        &mut self,
        raw_address: BdAddr,
        address_kind: AddressKind,
        resolved_address: BdAddr,
        resolved_kind: AddressKind,
    ) {
        if address_kind == AddressKind::Random && resolved_kind == AddressKind::Public {
            debug!(%raw_address, %resolved_address, "identity resolution cached");
            self.resolved.insert(raw_address, resolved_address);
        }
    }

    /// Looks up each peer's identity resolving key in the bonded store and
    /// records its digest.  The first store entry whose address equals the
    /// peer's canonical address wins.
    pub fn refresh_identity_keys(&mut self, store: &dyn BondStore) {
        let slots = store.max_count();
        for peer in &mut self.peers {
            let found = (0..slots)
                .filter_map(|i| store.entry(i))
                .find(|entry| entry.address == peer.identity.canonical_address);
            if let Some(entry) = found {
                peer.identity.resolved_key_digest = Some(key_digest(&entry.identity_key));
            }
        }
    }

    /// All connected peers in connection order.
    ///
    /// Refreshes identity key digests first, every time, so listings always
    /// show what the bonded store currently holds.
    pub fn list(&mut self, store: &dyn BondStore) -> Vec<ConnectedPeer> {
        self.refresh_identity_keys(store);
        (0..self.peers.len()).map(|i| self.snapshot(i)).collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Forgets every peer and the active selection.  The resolution cache
    /// is kept.
    pub fn clear_connections(&mut self) {
        self.peers.clear();
        self.active = None;
    }

    fn index_of(&self, handle: SessionHandle) -> Option<usize> {
        self.peers.iter().position(|p| p.session_handle == handle)
    }

    fn snapshot(&self, index: usize) -> ConnectedPeer {
        let mut peer = self.peers[index].clone();
        peer.is_active = self.active == Some(peer.session_handle);
        peer
    }
}
