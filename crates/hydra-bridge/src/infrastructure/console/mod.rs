//! Operator console: one command per line on stdin.
//!
//! [`ConsoleCommand::parse`] turns a line into a command;
//! [`ConsoleSession`] runs it against the dongle link, the peer directory
//! and the forwarding use case.

use hydra_core::{AddressError, BdAddr};
use thiserror::Error;

pub mod session;

pub use session::{ConsoleSession, Reply, SessionError};

pub const CONSOLE_HELP: &str = "\
list                   list connected centrals
select <addr>          make the central with <addr> active
rename <addr> <name>   set a nickname (empty name removes it)
adv on|off             begin or end advertising
stats                  show delivery counters
reset-stats            zero delivery counters
verbose                toggle dongle log lines
type <text>            type text on the active central
flush                  leave capture and release every key and button
capture                toggle capture of events from the input backend
restart                restart the dongle
unpair                 remove every bond, then restart
help                   this text
dongle-help            the dongle's own command summary
quit                   exit
";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("unknown command {0:?}; type `help` for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid address: {0}")]
    Address(#[from] AddressError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    List,
    Select(BdAddr),
    Rename { address: BdAddr, name: String },
    Advertise(bool),
    Stats,
    ResetStats,
    Verbose,
    Type(String),
    Flush,
    Capture,
    Restart,
    Unpair,
    Help,
    DongleHelp,
    Quit,
}

impl ConsoleCommand {
    /// Parses one console line.  A blank line is `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, ConsoleError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.trim_end().is_empty() {
            return Ok(None);
        }
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (trimmed, ""),
        };

        let command = match word {
            "list" | "ls" => ConsoleCommand::List,
            "select" => ConsoleCommand::Select(parse_address(rest, "select <addr>")?),
            "rename" => {
                let rest = rest.trim_start();
                let (addr, name) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                ConsoleCommand::Rename {
                    address: parse_address(addr, "rename <addr> <name>")?,
                    name: name.trim().to_string(),
                }
            }
            "adv" => match rest.trim() {
                "on" => ConsoleCommand::Advertise(true),
                "off" => ConsoleCommand::Advertise(false),
                _ => return Err(ConsoleError::Usage("adv on|off")),
            },
            "stats" => ConsoleCommand::Stats,
            "reset-stats" => ConsoleCommand::ResetStats,
            "verbose" => ConsoleCommand::Verbose,
            // Everything after the single separating space is typed verbatim.
            "type" => {
                if rest.is_empty() {
                    return Err(ConsoleError::Usage("type <text>"));
                }
                ConsoleCommand::Type(rest.to_string())
            }
            "flush" => ConsoleCommand::Flush,
            "capture" => ConsoleCommand::Capture,
            "restart" => ConsoleCommand::Restart,
            "unpair" => ConsoleCommand::Unpair,
            "help" | "?" => ConsoleCommand::Help,
            "dongle-help" => ConsoleCommand::DongleHelp,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(ConsoleError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn parse_address(text: &str, usage: &'static str) -> Result<BdAddr, ConsoleError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ConsoleError::Usage(usage));
    }
    Ok(text.parse::<BdAddr>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHONE: BdAddr = BdAddr::new([0xF0, 0xCD, 0x31, 0xB0, 0x4F, 0x75]);

    #[test]
    fn test_blank_line_is_no_command() {
        assert_eq!(ConsoleCommand::parse("   \n"), Ok(None));
    }

    #[test]
    fn test_simple_commands_parse() {
        assert_eq!(ConsoleCommand::parse("list"), Ok(Some(ConsoleCommand::List)));
        assert_eq!(ConsoleCommand::parse("stats\r\n"), Ok(Some(ConsoleCommand::Stats)));
        assert_eq!(
            ConsoleCommand::parse("reset-stats"),
            Ok(Some(ConsoleCommand::ResetStats))
        );
        assert_eq!(ConsoleCommand::parse("quit"), Ok(Some(ConsoleCommand::Quit)));
    }

    #[test]
    fn test_select_parses_address() {
        assert_eq!(
            ConsoleCommand::parse("select F0:CD:31:B0:4F:75"),
            Ok(Some(ConsoleCommand::Select(PHONE)))
        );
    }

    #[test]
    fn test_select_without_address_prints_usage() {
        assert_eq!(
            ConsoleCommand::parse("select"),
            Err(ConsoleError::Usage("select <addr>"))
        );
    }

    #[test]
    fn test_select_with_bad_address_is_an_address_error() {
        assert!(matches!(
            ConsoleCommand::parse("select F0:CD"),
            Err(ConsoleError::Address(_))
        ));
    }

    #[test]
    fn test_rename_keeps_spaces_in_name() {
        // Act
        let command = ConsoleCommand::parse("rename F0:CD:31:B0:4F:75 work laptop ");

        // Assert
        assert_eq!(
            command,
            Ok(Some(ConsoleCommand::Rename {
                address: PHONE,
                name: "work laptop".to_string()
            }))
        );
    }

    #[test]
    fn test_rename_without_name_clears_it() {
        assert_eq!(
            ConsoleCommand::parse("rename F0:CD:31:B0:4F:75"),
            Ok(Some(ConsoleCommand::Rename {
                address: PHONE,
                name: String::new()
            }))
        );
    }

    #[test]
    fn test_adv_requires_on_or_off() {
        assert_eq!(
            ConsoleCommand::parse("adv on"),
            Ok(Some(ConsoleCommand::Advertise(true)))
        );
        assert_eq!(
            ConsoleCommand::parse("adv off"),
            Ok(Some(ConsoleCommand::Advertise(false)))
        );
        assert_eq!(
            ConsoleCommand::parse("adv maybe"),
            Err(ConsoleError::Usage("adv on|off"))
        );
    }

    #[test]
    fn test_type_keeps_text_verbatim() {
        assert_eq!(
            ConsoleCommand::parse("type  Hello, World!"),
            Ok(Some(ConsoleCommand::Type(" Hello, World!".to_string())))
        );
    }

    #[test]
    fn test_help_says_where_captured_input_comes_from() {
        let line = CONSOLE_HELP
            .lines()
            .find(|l| l.starts_with("capture "))
            .unwrap();
        assert!(line.contains("input backend"));
    }

    #[test]
    fn test_unknown_command_is_reported() {
        assert_eq!(
            ConsoleCommand::parse("frobnicate now"),
            Err(ConsoleError::Unknown("frobnicate".to_string()))
        );
    }
}
