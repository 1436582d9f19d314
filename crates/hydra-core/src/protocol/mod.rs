//! Serial link protocol between the bridge and the dongle.
//!
//! The link carries two shapes of traffic in one byte stream:
//!
//! - **Binary report frames**: a tag byte (`1`..=`4`) followed by exactly the
//!   fixed payload of that report kind.  No acknowledgement is written back.
//! - **Text commands**: one ASCII letter, optionally followed by a fixed-size
//!   argument.  The dongle answers with newline-terminated lines.
//!
//! Only one command is outstanding at a time; the bridge enforces that with a
//! request/response wrapper around the port.
//!
//! - [`frame`] – command framing ([`Command`]) and the lead-byte table.
//! - [`listing`] – the peer table printed for `l`.
//! - [`dashboard`] – the delivery counters table printed for `d`.

pub mod dashboard;
pub mod frame;
pub mod listing;

pub use dashboard::{DeliveryCounters, KindCounters};
pub use frame::{argument_len, decode_command, Command, DashboardAction, ProtocolError};
pub use listing::{format_listing, parse_listing, PeerRow, LISTING_HEADER};

/// Prefix of diagnostic lines the dongle mirrors onto the link in verbose mode.
pub const LOG_PREFIX: &str = "log: ";
