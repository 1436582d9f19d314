//! CommandProcessor: reads link commands and answers them.
//!
//! The processor owns the link and the [`Dongle`].  For each command it reads
//! the lead byte, asks [`argument_len`] how many bytes follow, reads exactly
//! those, decodes, and executes.  Report frames block until the delivery
//! engine is idle again, draining stack events while they wait, so at most one
//! report is ever in flight.  Nothing is written back for a report frame.
//!
//! Unknown lead bytes produce no reply at all.  The bridge detects them only
//! by its read timeout, so the processor logs them and moves on.
//!
//! While verbose mode is on (`v`), diagnostic lines are also written to the
//! link as `log: ...` lines.  They never start with a digit, so listing
//! parsers skip them.

mod emulation;

use std::fmt::Display;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;

use hydra_core::protocol::frame::CMD_SELECT;
use hydra_core::protocol::{argument_len, decode_command, format_listing, LOG_PREFIX};
use hydra_core::{Command, DashboardAction, HidReport, ProtocolError};
use tracing::{debug, info, warn};

use crate::application::delivery::DeliveryOutcome;
use crate::application::dongle::Dongle;
use crate::application::stack::{BondStore, HidTransport, StackEvent};

pub const HELP_TEXT: &str = "\
available commands:
  l - list centrals
  s - switch central, followed by it's address
  u - unpair from all devices
  a - advertising, followed by 'b' to begin or 'e' to end
  e - emulation mode (for testing)
  d - dashboard, followed by 's' to show or 'r' to reset
  v - toggle verbosity (logging)
  r - restart the device
  ? - print this help
";

pub struct CommandProcessor<R, W, T, B> {
    reader: R,
    writer: W,
    dongle: Dongle<T, B>,
    events: Receiver<StackEvent>,
    verbose: bool,
}

impl<R, W, T, B> CommandProcessor<R, W, T, B>
where
    R: Read,
    W: Write,
    T: HidTransport,
    B: BondStore,
{
    pub fn new(reader: R, writer: W, dongle: Dongle<T, B>, events: Receiver<StackEvent>) -> Self {
        Self {
            reader,
            writer,
            dongle,
            events,
            verbose: false,
        }
    }

    pub fn dongle(&self) -> &Dongle<T, B> {
        &self.dongle
    }

    pub fn dongle_mut(&mut self) -> &mut Dongle<T, B> {
        &mut self.dongle
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Processes commands until the link reaches end of input.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error on the link other than end of input.
    pub fn run(&mut self) -> io::Result<()> {
        info!("command processor started");
        loop {
            self.drain_events()?;
            let Some(lead) = self.read_byte()? else {
                info!("link closed");
                return Ok(());
            };
            match self.process(lead) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    info!("link closed mid-command");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
            self.writer.flush()?;
        }
    }

    /// Handles one command whose lead byte has already been read.
    pub fn process(&mut self, lead: u8) -> io::Result<()> {
        self.link_log(format_args!("command: {lead}"))?;

        let Some(arg_len) = argument_len(lead) else {
            warn!(lead, "unknown command");
            return self.link_log(format_args!("unknown command: {lead}"));
        };
        let mut frame = vec![0u8; 1 + arg_len];
        frame[0] = lead;
        self.reader.read_exact(&mut frame[1..])?;

        if lead == CMD_SELECT {
            self.writer.write_all(b"address: ")?;
            self.writer.write_all(&frame[1..])?;
            self.writer.write_all(b"\n")?;
        }

        match decode_command(&frame) {
            Ok((command, _)) => self.execute(command),
            Err(ProtocolError::InvalidAddress(_)) => {
                let text = String::from_utf8_lossy(&frame[1..]).into_owned();
                self.link_log(format_args!("no device with address {text} found"))
            }
            Err(ProtocolError::UnknownSubcommand { sub, .. }) => {
                self.link_log(format_args!("unknown dashboard command: {sub}"))
            }
            Err(e) => {
                warn!("undecodable command: {e}");
                self.link_log(e)
            }
        }
    }

    fn execute(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Report(report) => {
                self.link_log(format_args!("{} command", report.kind()))?;
                self.deliver(report)?;
            }
            Command::Help => self.writer.write_all(HELP_TEXT.as_bytes())?,
            Command::ListPeers => {
                let peers = self.dongle.list_peers();
                self.writer.write_all(format_listing(&peers).as_bytes())?;
            }
            Command::SelectPeer(address) => match self.dongle.select_peer(address) {
                Some(handle) => {
                    info!(%address, %handle, "switched active central");
                    self.link_log(format_args!("switched to {address}"))?;
                }
                None => {
                    self.link_log(format_args!("no device with address {address} found"))?;
                }
            },
            Command::Advertise(begin) => {
                self.dongle.set_advertising(begin);
                let line: &[u8] = if begin {
                    b"advertising begun\n"
                } else {
                    b"advertising ended\n"
                };
                self.writer.write_all(line)?;
            }
            Command::UnpairAll => {
                self.link_log("unpairing from all devices...")?;
                self.dongle.unpair_all();
            }
            Command::Dashboard(action) => {
                if action == DashboardAction::Reset {
                    self.link_log("resetting dashboard")?;
                    self.dongle.reset_counters();
                } else {
                    self.link_log("showing dashboard")?;
                }
                let table = self.dongle.counters().format();
                self.writer.write_all(table.as_bytes())?;
            }
            Command::ToggleVerbose => {
                self.verbose = !self.verbose;
                info!(verbose = self.verbose, "verbose link logging toggled");
                if self.verbose {
                    self.link_log("logging enabled")?;
                }
            }
            Command::Restart => {
                self.link_log("restarting...")?;
                self.dongle.restart();
            }
            Command::Emulate => self.run_emulation()?,
        }
        Ok(())
    }

    /// Submits `report` and waits until the engine is idle again.
    fn deliver(&mut self, report: HidReport) -> io::Result<Option<DeliveryOutcome>> {
        let outcome = match self.dongle.submit(report) {
            Ok(Some(outcome)) => Some(outcome),
            Ok(None) => self.wait_until_idle()?,
            Err(e) => {
                self.link_log(&e)?;
                None
            }
        };
        if let Some(outcome) = outcome {
            self.log_outcome(outcome)?;
        }
        Ok(outcome)
    }

    /// Other stack events are applied while waiting, but the credit deadline
    /// is fixed when the wait begins.
    fn wait_until_idle(&mut self) -> io::Result<Option<DeliveryOutcome>> {
        let deadline = Instant::now() + self.dongle.config().credit_wait;
        while !self.dongle.is_idle() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) => {
                    self.log_event(&event)?;
                    if let Some(outcome) = self.dongle.handle_event(event) {
                        return Ok(Some(outcome));
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return Ok(self.dongle.credit_timed_out());
                }
            }
        }
        Ok(None)
    }

    /// Applies every stack event that is already queued.
    fn drain_events(&mut self) -> io::Result<()> {
        while let Ok(event) = self.events.try_recv() {
            self.log_event(&event)?;
            if let Some(outcome) = self.dongle.handle_event(event) {
                self.log_outcome(outcome)?;
            }
        }
        Ok(())
    }

    fn log_event(&mut self, event: &StackEvent) -> io::Result<()> {
        match event {
            StackEvent::ConnectionComplete {
                handle,
                address,
                address_kind,
            } => self.link_log(format_args!("connected: {handle} {address} ({address_kind})")),
            StackEvent::DisconnectionComplete { handle } => {
                self.link_log(format_args!("disconnected: {handle}"))
            }
            StackEvent::IdentityResolved {
                address,
                identity_address,
                ..
            } => self.link_log(format_args!("identity resolved: {address} -> {identity_address}")),
            StackEvent::ProtocolModeChanged { mode, .. } => {
                self.link_log(format_args!("protocol mode: {mode:?}"))
            }
            StackEvent::CanSendNow { .. } => Ok(()),
        }
    }

    fn log_outcome(&mut self, outcome: DeliveryOutcome) -> io::Result<()> {
        match outcome {
            DeliveryOutcome::Sent { kind, retries } => {
                debug!(%kind, retries, "report sent");
                self.link_log(format_args!("{kind} report sent"))
            }
            DeliveryOutcome::Dropped { kind, reason } => {
                self.link_log(format_args!("{kind} report dropped: {reason}"))
            }
        }
    }

    /// Writes a `log: ` line to the link when verbose mode is on.
    fn link_log(&mut self, message: impl Display) -> io::Result<()> {
        debug!("{message}");
        if self.verbose {
            writeln!(self.writer, "{LOG_PREFIX}{message}")?;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
