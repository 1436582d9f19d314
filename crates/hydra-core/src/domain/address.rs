//! Wireless hardware addresses.
//!
//! The canonical text form is six upper-case hex octets separated by colons,
//! most significant octet first: `C0:FF:EE:00:00:01`.  That form is exactly
//! 17 ASCII bytes, which is what the `s` (select peer) link command carries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the canonical `XX:XX:XX:XX:XX:XX` text form.
pub const ADDRESS_TEXT_LEN: usize = 17;

/// Errors produced when parsing an address or address kind from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The text is not 17 characters long.
    #[error("address must be {ADDRESS_TEXT_LEN} characters, got {0}")]
    InvalidLength(usize),

    /// A separator position does not hold a colon.
    #[error("expected ':' at position {0}")]
    MissingSeparator(usize),

    /// An octet is not two hexadecimal digits.
    #[error("invalid hex octet {0:?}")]
    InvalidOctet(String),

    /// The address kind is neither `public` nor `random`.
    #[error("unknown address kind {0:?}")]
    UnknownKind(String),
}

/// A 6-byte wireless device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BdAddr(pub [u8; 6]);

impl BdAddr {
    /// Creates an address from its six octets, most significant first.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Returns the six octets, most significant first.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for BdAddr {
    type Err = AddressError;

    /// Parses `XX:XX:XX:XX:XX:XX`.  Hex digits may be either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_TEXT_LEN {
            return Err(AddressError::InvalidLength(s.len()));
        }
        let bytes = s.as_bytes();
        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            let start = i * 3;
            if i > 0 && bytes[start - 1] != b':' {
                return Err(AddressError::MissingSeparator(start - 1));
            }
            let pair = s
                .get(start..start + 2)
                .filter(|p| p.bytes().all(|b| b.is_ascii_hexdigit()))
                .ok_or_else(|| AddressError::InvalidOctet(s.to_string()))?;
            *octet = u8::from_str_radix(pair, 16)
                .map_err(|_| AddressError::InvalidOctet(pair.to_string()))?;
        }
        Ok(Self(octets))
    }
}

/// Whether an address is the device's fixed public address or a random one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    Public,
    Random,
}

impl AddressKind {
    /// The lower-case label printed in the peer listing (`public`/`random`).
    pub fn as_str(self) -> &'static str {
        match self {
            AddressKind::Public => "public",
            AddressKind::Random => "random",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressKind {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(AddressKind::Public),
            "random" => Ok(AddressKind::Random),
            other => Err(AddressError::UnknownKind(other.to_string())),
        }
    }
}
