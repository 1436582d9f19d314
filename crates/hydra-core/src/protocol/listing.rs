//! The peer table printed in answer to `l`.
//!
//! ```text
//! #	HANDLE	ADDRESS			AT	IRK
//! 0 *	64	F0:CD:31:B0:4F:75	public	a44c2c2fa394e5f046613381d132816a
//! 1  	65	C0:FF:EE:00:00:01	random
//! ```
//!
//! Every peer row has exactly five tab-separated fields: index and active
//! marker, session handle, address, address kind, and the identity key digest
//! (empty until resolved).  Lines that do not start with a digit (the header,
//! `log: ` lines) are not rows.

use crate::domain::address::{AddressKind, BdAddr};
use crate::domain::peer::{ConnectedPeer, SessionHandle};

use super::frame::ProtocolError;

pub const LISTING_HEADER: &str = "#\tHANDLE\tADDRESS\t\t\tAT\tIRK";

const ROW_FIELDS: usize = 5;
const ACTIVE_MARKER: char = '*';

/// One row of the peer listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRow {
    pub index: usize,
    pub is_active: bool,
    pub handle: SessionHandle,
    pub address: BdAddr,
    pub address_kind: AddressKind,
    pub key_digest: Option<String>,
}

impl PeerRow {
    pub fn from_peer(index: usize, peer: &ConnectedPeer) -> Self {
        Self {
            index,
            is_active: peer.is_active,
            handle: peer.session_handle,
            address: peer.identity.canonical_address,
            address_kind: peer.identity.address_kind,
            key_digest: peer.identity.resolved_key_digest.clone(),
        }
    }

    /// Formats the row without a trailing newline.
    pub fn format(&self) -> String {
        let marker = if self.is_active { ACTIVE_MARKER } else { ' ' };
        format!(
            "{} {}\t{}\t{}\t{}\t{}",
            self.index,
            marker,
            self.handle,
            self.address,
            self.address_kind,
            self.key_digest.as_deref().unwrap_or("")
        )
    }

    /// Parses one row line.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::MalformedListingRow`] when the line does not have
    /// exactly five fields or a field does not parse.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::MalformedListingRow(line.to_string());

        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() != ROW_FIELDS {
            return Err(malformed());
        }

        let first = fields[0].trim_end();
        let is_active = first.ends_with(ACTIVE_MARKER);
        let index = first
            .trim_end_matches(ACTIVE_MARKER)
            .trim_end()
            .parse::<usize>()
            .map_err(|_| malformed())?;
        let handle = fields[1]
            .trim()
            .parse::<u16>()
            .map(SessionHandle)
            .map_err(|_| malformed())?;
        let address = fields[2].trim().parse::<BdAddr>().map_err(|_| malformed())?;
        let address_kind = fields[3]
            .trim()
            .parse::<AddressKind>()
            .map_err(|_| malformed())?;
        let digest = fields[4].trim();
        let key_digest = (!digest.is_empty()).then(|| digest.to_string());

        Ok(Self {
            index,
            is_active,
            handle,
            address,
            address_kind,
            key_digest,
        })
    }
}

/// Formats the full listing (header plus one row per peer), each line
/// newline-terminated.
pub fn format_listing(peers: &[ConnectedPeer]) -> String {
    let mut out = String::from(LISTING_HEADER);
    out.push('\n');
    for (index, peer) in peers.iter().enumerate() {
        out.push_str(&PeerRow::from_peer(index, peer).format());
        out.push('\n');
    }
    out
}

/// Extracts the peer rows from a listing response.
///
/// Lines that do not start with an ASCII digit are skipped.  A line that does
/// start with a digit but is not a well-formed row is an error rather than
/// being silently dropped.
pub fn parse_listing(text: &str) -> Result<Vec<PeerRow>, ProtocolError> {
    text.lines()
        .filter(|line| line.as_bytes().first().is_some_and(u8::is_ascii_digit))
        .map(PeerRow::parse)
        .collect()
}
