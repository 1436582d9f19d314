//! Domain entities shared by the dongle and the bridge.
//!
//! # What lives here? (for beginners)
//!
//! Every wireless central that connects to the dongle is identified by a
//! 6-byte hardware address.  Phones and laptops often use *random* addresses
//! that rotate for privacy; once the two devices are bonded, the dongle's
//! wireless stack can resolve a random address back to the central's stable
//! *public* identity address.
//!
//! - **`address`** – [`BdAddr`](address::BdAddr) (the 6-byte address and its
//!   `XX:XX:XX:XX:XX:XX` text form) and [`AddressKind`](address::AddressKind).
//!
//! - **`peer`** – [`PeerIdentity`](peer::PeerIdentity),
//!   [`ConnectedPeer`](peer::ConnectedPeer) and the opaque
//!   [`SessionHandle`](peer::SessionHandle) the stack assigns to a connection.

pub mod address;
pub mod peer;
