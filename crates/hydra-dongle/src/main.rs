//! hydra-dongle simulator entry point.
//!
//! Runs the dongle's command processor over stdin/stdout with the loopback
//! wireless stack, so the bridge (or a person at a terminal) can exercise the
//! full link protocol without hardware.  The simulated central reconnects
//! after `r` and `u`, so a session keeps a peer to deliver to.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ LoopbackTransport + MemoryBondStore  -- simulated radio and bond table
//!  └─ Dongle                               -- registry + delivery engine
//!  └─ CommandProcessor::run()              -- link loop on stdin/stdout
//! ```
//!
//! Logs go to stderr so they never mix with link replies on stdout.  Set
//! `RUST_LOG=debug` to see every command and delivery outcome.

use std::io;

use tracing::info;
use tracing_subscriber::EnvFilter;

use hydra_core::{AddressKind, BdAddr, SessionHandle};
use hydra_dongle::application::dongle::{Dongle, DongleConfig};
use hydra_dongle::application::stack::{BondEntry, StackEvent};
use hydra_dongle::infrastructure::loopback::{LoopbackTransport, MemoryBondStore};
use hydra_dongle::infrastructure::serial::CommandProcessor;

/// The central that is "already connected" when the simulator starts.
const SIMULATED_CENTRAL: BdAddr = BdAddr::new([0xC0, 0xFF, 0xEE, 0x00, 0x00, 0x01]);

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    info!("hydra dongle simulator starting");

    // ── Simulated stack ──────────────────────────────────────────────────────
    let config = DongleConfig::default();
    let (mut transport, events) = LoopbackTransport::new();
    let mut bonds = MemoryBondStore::with_capacity(config.max_connections);
    bonds.insert(BondEntry {
        address: SIMULATED_CENTRAL,
        address_kind: AddressKind::Public,
        identity_key: *b"hydra-simulated!",
    });
    let connected = StackEvent::ConnectionComplete {
        handle: SessionHandle(64),
        address: SIMULATED_CENTRAL,
        address_kind: AddressKind::Public,
    };
    transport.event_sender().send(connected.clone())?;
    transport.reconnect_on_restart(connected);

    // ── Link loop ────────────────────────────────────────────────────────────
    let dongle = Dongle::new(config, transport, bonds);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut processor = CommandProcessor::new(stdin.lock(), stdout.lock(), dongle, events);
    processor.run()?;

    info!(
        outcomes = processor.dongle().counters().total_outcomes(),
        "link closed, simulator stopping"
    );
    Ok(())
}
