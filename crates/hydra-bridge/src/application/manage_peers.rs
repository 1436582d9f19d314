//! PeerDirectory: the dongle's centrals, with operator nicknames.
//!
//! The dongle knows centrals only by address.  The directory merges its
//! listing with the nicknames kept in the bridge configuration, and routes
//! selection requests back to the dongle.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use hydra_core::{BdAddr, PeerRow};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("dongle link error: {0}")]
    Link(String),
    #[error("no connected central with address {0}")]
    NotConnected(BdAddr),
}

/// The dongle commands the directory needs.
#[async_trait]
pub trait PeerLink: Send + Sync {
    /// Rows of the dongle's current listing.
    async fn list_peers(&self) -> Result<Vec<PeerRow>, String>;

    /// Asks the dongle to make `address` the active central.
    async fn select_peer(&self, address: BdAddr) -> Result<(), String>;
}

/// A listing row plus its nickname, if one is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPeer {
    pub row: PeerRow,
    pub name: Option<String>,
}

impl NamedPeer {
    /// Nickname if set, otherwise the address.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.row.address.to_string())
    }
}

pub struct PeerDirectory {
    link: Arc<dyn PeerLink>,
    names: BTreeMap<BdAddr, String>,
}

impl PeerDirectory {
    pub fn new(link: Arc<dyn PeerLink>, names: BTreeMap<BdAddr, String>) -> Self {
        Self { link, names }
    }

    /// Lists connected centrals with their nicknames.
    pub async fn list(&self) -> Result<Vec<NamedPeer>, PeerError> {
        let rows = self.link.list_peers().await.map_err(PeerError::Link)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let name = self.names.get(&row.address).cloned();
                NamedPeer { row, name }
            })
            .collect())
    }

    /// Makes `address` the active central.
    ///
    /// The listing is read back afterwards; an address the dongle does not
    /// know is reported as [`PeerError::NotConnected`].
    pub async fn select(&self, address: BdAddr) -> Result<NamedPeer, PeerError> {
        self.link
            .select_peer(address)
            .await
            .map_err(PeerError::Link)?;

        let peers = self.list().await?;
        match peers.into_iter().find(|p| p.row.address == address) {
            Some(peer) if peer.row.is_active => {
                info!(%address, name = %peer.display_name(), "active central switched");
                Ok(peer)
            }
            _ => {
                warn!(%address, "dongle did not switch to the requested central");
                Err(PeerError::NotConnected(address))
            }
        }
    }

    /// Sets the nickname for `address`.  An empty name removes it.
    pub fn rename(&mut self, address: BdAddr, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            self.names.remove(&address);
        } else {
            self.names.insert(address, name.to_string());
        }
    }

    pub fn names(&self) -> &BTreeMap<BdAddr, String> {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydra_core::{AddressKind, SessionHandle};
    use std::sync::Mutex;

    const LAPTOP: BdAddr = BdAddr::new([0xC0, 0xFF, 0xEE, 0x00, 0x00, 0x01]);
    const PHONE: BdAddr = BdAddr::new([0xF0, 0xCD, 0x31, 0xB0, 0x4F, 0x75]);

    /// Pretends to be a dongle with a fixed set of connected centrals.
    struct FakeLink {
        connected: Vec<BdAddr>,
        active: Mutex<Option<BdAddr>>,
        fail: bool,
    }

    impl FakeLink {
        fn with(connected: Vec<BdAddr>) -> Self {
            let active = connected.first().copied();
            Self {
                connected,
                active: Mutex::new(active),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl PeerLink for FakeLink {
        async fn list_peers(&self) -> Result<Vec<PeerRow>, String> {
            if self.fail {
                return Err("timed out".to_string());
            }
            let active = *self.active.lock().unwrap();
            Ok(self
                .connected
                .iter()
                .enumerate()
                .map(|(i, &address)| PeerRow {
                    index: i,
                    is_active: Some(address) == active,
                    handle: SessionHandle(64 + i as u16),
                    address,
                    address_kind: AddressKind::Public,
                    key_digest: None,
                })
                .collect())
        }

        async fn select_peer(&self, address: BdAddr) -> Result<(), String> {
            if self.connected.contains(&address) {
                *self.active.lock().unwrap() = Some(address);
            }
            Ok(())
        }
    }

    fn directory(link: FakeLink) -> PeerDirectory {
        PeerDirectory::new(Arc::new(link), BTreeMap::new())
    }

    #[tokio::test]
    async fn test_list_merges_nicknames_by_address() {
        // Arrange
        let mut dir = directory(FakeLink::with(vec![LAPTOP, PHONE]));
        dir.rename(PHONE, "pixel");

        // Act
        let peers = dir.list().await.unwrap();

        // Assert
        assert_eq!(peers[0].name, None);
        assert_eq!(peers[0].display_name(), "C0:FF:EE:00:00:01");
        assert_eq!(peers[1].name.as_deref(), Some("pixel"));
    }

    #[tokio::test]
    async fn test_select_returns_the_now_active_peer() {
        // Arrange
        let dir = directory(FakeLink::with(vec![LAPTOP, PHONE]));

        // Act
        let peer = dir.select(PHONE).await.unwrap();

        // Assert
        assert_eq!(peer.row.address, PHONE);
        assert!(peer.row.is_active);
    }

    #[tokio::test]
    async fn test_select_unknown_address_is_not_connected() {
        // Arrange
        let dir = directory(FakeLink::with(vec![LAPTOP]));

        // Act
        let result = dir.select(PHONE).await;

        // Assert
        assert!(matches!(result, Err(PeerError::NotConnected(a)) if a == PHONE));
    }

    #[tokio::test]
    async fn test_link_failure_surfaces_as_peer_error() {
        // Arrange
        let mut link = FakeLink::with(vec![LAPTOP]);
        link.fail = true;
        let dir = directory(link);

        // Act
        let result = dir.list().await;

        // Assert
        assert!(matches!(result, Err(PeerError::Link(_))));
    }

    #[test]
    fn test_rename_with_blank_name_removes_the_nickname() {
        // Arrange
        let mut dir = directory(FakeLink::with(vec![]));
        dir.rename(LAPTOP, "work");

        // Act
        dir.rename(LAPTOP, "   ");

        // Assert
        assert!(dir.names().is_empty());
    }
}
