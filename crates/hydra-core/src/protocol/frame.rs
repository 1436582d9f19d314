//! Command framing for the serial link.
//!
//! Lead byte table (receiver's perspective):
//!
//! ```text
//! 1..=4  report frame      payload of ReportKind::payload_len bytes
//! '?'    help              -
//! 'l'    list peers        -
//! 's'    select peer       17 ASCII bytes, XX:XX:XX:XX:XX:XX
//! 'a'    advertising       1 byte, 'b' = begin, anything else = end
//! 'u'    unpair all        -
//! 'd'    dashboard         1 byte, 's' = show, 'r' = reset
//! 'v'    toggle verbose    -
//! 'r'    restart           -
//! 'e'    emulation mode    -
//! ```
//!
//! The receiver reads the lead byte, asks [`argument_len`] how many more bytes
//! belong to the command, reads exactly that many, then calls
//! [`decode_command`] on the whole frame.

use std::str;

use thiserror::Error;

use crate::domain::address::{AddressError, BdAddr, ADDRESS_TEXT_LEN};
use crate::report::{HidReport, ReportKind};

/// Errors produced while framing or parsing link traffic.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the command it starts.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The lead byte is neither a report tag nor a known text command.
    #[error("unknown command: 0x{0:02X}")]
    UnknownCommand(u8),

    /// The address argument of a select command did not parse.
    #[error("invalid address argument: {0}")]
    InvalidAddress(#[from] AddressError),

    /// The sub-command byte is not defined for this command.
    #[error("unknown sub-command {sub:?} for '{command}'")]
    UnknownSubcommand { command: char, sub: char },

    /// A peer listing line did not match the row schema.
    #[error("malformed listing row: {0}")]
    MalformedListingRow(String),

    /// The dashboard text did not match the counters table.
    #[error("malformed dashboard: {0}")]
    MalformedDashboard(String),
}

// ── Lead bytes ────────────────────────────────────────────────────────────────

pub const CMD_HELP: u8 = b'?';
pub const CMD_LIST: u8 = b'l';
pub const CMD_SELECT: u8 = b's';
pub const CMD_ADVERTISE: u8 = b'a';
pub const CMD_UNPAIR: u8 = b'u';
pub const CMD_DASHBOARD: u8 = b'd';
pub const CMD_VERBOSE: u8 = b'v';
pub const CMD_RESTART: u8 = b'r';
pub const CMD_EMULATE: u8 = b'e';

const ADVERTISE_BEGIN: u8 = b'b';
const ADVERTISE_END: u8 = b'e';

/// What the dashboard command should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    Show,
    /// Zero every counter, then show them.
    Reset,
}

impl DashboardAction {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b's' => Some(DashboardAction::Show),
            b'r' => Some(DashboardAction::Reset),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            DashboardAction::Show => b's',
            DashboardAction::Reset => b'r',
        }
    }
}

/// One command travelling from the bridge to the dongle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Report(HidReport),
    Help,
    ListPeers,
    SelectPeer(BdAddr),
    /// `true` begins advertising, `false` ends it.
    Advertise(bool),
    UnpairAll,
    Dashboard(DashboardAction),
    ToggleVerbose,
    Restart,
    Emulate,
}

impl Command {
    /// Serialises the command into the exact bytes written to the link.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Command::Report(report) => {
                let payload = report.payload();
                let mut buf = Vec::with_capacity(1 + payload.len());
                buf.push(report.kind().link_tag());
                buf.extend_from_slice(payload);
                buf
            }
            Command::Help => vec![CMD_HELP],
            Command::ListPeers => vec![CMD_LIST],
            Command::SelectPeer(addr) => {
                let mut buf = Vec::with_capacity(1 + ADDRESS_TEXT_LEN);
                buf.push(CMD_SELECT);
                buf.extend_from_slice(addr.to_string().as_bytes());
                buf
            }
            Command::Advertise(begin) => {
                let sub = if *begin { ADVERTISE_BEGIN } else { ADVERTISE_END };
                vec![CMD_ADVERTISE, sub]
            }
            Command::UnpairAll => vec![CMD_UNPAIR],
            Command::Dashboard(action) => vec![CMD_DASHBOARD, action.as_byte()],
            Command::ToggleVerbose => vec![CMD_VERBOSE],
            Command::Restart => vec![CMD_RESTART],
            Command::Emulate => vec![CMD_EMULATE],
        }
    }

    /// Whether the dongle writes text back for this command.
    ///
    /// Report frames are never acknowledged; restart and unpair reboot the
    /// device before it could answer.
    pub fn expects_response(&self) -> bool {
        !matches!(
            self,
            Command::Report(_) | Command::UnpairAll | Command::Restart
        )
    }
}

/// Number of bytes that follow `lead` in its command, or `None` when `lead`
/// starts no known command.
pub fn argument_len(lead: u8) -> Option<usize> {
    if let Some(kind) = ReportKind::from_link_tag(lead) {
        return Some(kind.payload_len());
    }
    match lead {
        CMD_SELECT => Some(ADDRESS_TEXT_LEN),
        CMD_ADVERTISE | CMD_DASHBOARD => Some(1),
        CMD_HELP | CMD_LIST | CMD_UNPAIR | CMD_VERBOSE | CMD_RESTART | CMD_EMULATE => Some(0),
        _ => None,
    }
}

/// Decodes one command from the start of `bytes`.
///
/// Returns the command and the number of bytes it occupied.
///
/// # Errors
///
/// - [`ProtocolError::UnknownCommand`] for an unassigned lead byte.
/// - [`ProtocolError::InsufficientData`] when the argument is truncated.
/// - [`ProtocolError::InvalidAddress`] / [`ProtocolError::UnknownSubcommand`]
///   when the argument is present but meaningless.
pub fn decode_command(bytes: &[u8]) -> Result<(Command, usize), ProtocolError> {
    let Some(&lead) = bytes.first() else {
        return Err(ProtocolError::InsufficientData {
            needed: 1,
            available: 0,
        });
    };
    let arg_len = argument_len(lead).ok_or(ProtocolError::UnknownCommand(lead))?;
    let needed = 1 + arg_len;
    if bytes.len() < needed {
        return Err(ProtocolError::InsufficientData {
            needed,
            available: bytes.len(),
        });
    }
    let arg = &bytes[1..needed];

    let command = if let Some(kind) = ReportKind::from_link_tag(lead) {
        // Length was checked above, so the payload always fits.
        let report = HidReport::from_payload(kind, arg).ok_or(ProtocolError::InsufficientData {
            needed,
            available: bytes.len(),
        })?;
        Command::Report(report)
    } else {
        match lead {
            CMD_HELP => Command::Help,
            CMD_LIST => Command::ListPeers,
            CMD_SELECT => Command::SelectPeer(parse_address_arg(arg)?),
            CMD_ADVERTISE => Command::Advertise(arg[0] == ADVERTISE_BEGIN),
            CMD_UNPAIR => Command::UnpairAll,
            CMD_DASHBOARD => {
                let action = DashboardAction::from_byte(arg[0]).ok_or(
                    ProtocolError::UnknownSubcommand {
                        command: CMD_DASHBOARD as char,
                        sub: arg[0] as char,
                    },
                )?;
                Command::Dashboard(action)
            }
            CMD_VERBOSE => Command::ToggleVerbose,
            CMD_RESTART => Command::Restart,
            CMD_EMULATE => Command::Emulate,
            other => return Err(ProtocolError::UnknownCommand(other)),
        }
    };
    Ok((command, needed))
}

fn parse_address_arg(arg: &[u8]) -> Result<BdAddr, ProtocolError> {
    let text = str::from_utf8(arg).map_err(|_| {
        AddressError::InvalidOctet(String::from_utf8_lossy(arg).into_owned())
    })?;
    Ok(text.parse::<BdAddr>()?)
}
