//! Connected wireless peers and their identities.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::address::{AddressKind, BdAddr};

/// Opaque connection handle assigned by the wireless stack.
///
/// Unique among currently connected peers and meaningless after the
/// connection it names has been torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionHandle(pub u16);

impl SessionHandle {
    /// The stack's "no connection" sentinel.
    pub const INVALID: SessionHandle = SessionHandle(0xFFFF);

    /// Returns `false` for the [`SessionHandle::INVALID`] sentinel.
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Best-known stable identity of a wireless central.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerIdentity {
    /// The public identity address when one is known, otherwise the address
    /// the peer connected with.
    pub canonical_address: BdAddr,
    pub address_kind: AddressKind,
    /// Hex digest of the peer's identity resolving key, once the bonded
    /// device store has been consulted.
    pub resolved_key_digest: Option<String>,
}

impl PeerIdentity {
    /// Creates an identity with no resolved key.
    pub fn new(canonical_address: BdAddr, address_kind: AddressKind) -> Self {
        Self {
            canonical_address,
            address_kind,
            resolved_key_digest: None,
        }
    }
}

/// Snapshot of one live wireless session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedPeer {
    pub session_handle: SessionHandle,
    pub identity: PeerIdentity,
    pub is_active: bool,
}

/// Encodes an identity resolving key as lower-case hex, two digits per byte.
pub fn key_digest(key: &[u8]) -> String {
    key.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handle_sentinel_is_not_valid() {
        assert!(!SessionHandle::INVALID.is_valid());
        assert!(SessionHandle(64).is_valid());
    }

    #[test]
    fn test_key_digest_is_lower_case_hex() {
        // Arrange
        let key = [0x00, 0x1F, 0xAB, 0xFF];

        // Act
        let digest = key_digest(&key);

        // Assert
        assert_eq!(digest, "001fabff");
    }

    #[test]
    fn test_new_identity_has_no_key_digest() {
        let id = PeerIdentity::new(BdAddr::new([1, 2, 3, 4, 5, 6]), AddressKind::Public);
        assert_eq!(id.resolved_key_digest, None);
    }
}
