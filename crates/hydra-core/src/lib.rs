//! # hydra-core
//!
//! Shared library for Hydra containing the HID report codec, the dongle link
//! framing, peer identity types, and key code translation tables.
//!
//! This crate is used by both the dongle runtime and the host bridge.
//! It has zero dependencies on OS APIs, serial ports, or wireless stacks.
//!
//! # Architecture overview (for beginners)
//!
//! Hydra is a software KVM built on a Bluetooth LE HID peripheral: a small
//! "dongle" pretends to be a keyboard and mouse for one or more computers
//! ("centrals"), and a "bridge" process on the controlling machine captures
//! the local keyboard and mouse and forwards them to the dongle over a serial
//! link.  Whichever central is currently "active" receives the input.
//!
//! This crate (`hydra-core`) is the shared foundation.  It defines:
//!
//! - **`report`** – The fixed-size HID reports (keyboard, mouse, consumer
//!   control, gamepad) and the pure functions that compose them from held
//!   keys and mouse deltas.
//!
//! - **`protocol`** – How bytes travel over the serial link between the
//!   bridge and the dongle: binary report frames, single-character operator
//!   commands, and the text tables the dongle prints back (peer listing and
//!   delivery dashboard).
//!
//! - **`domain`** – Wireless peer identities: hardware addresses, address
//!   kinds, and session handles.
//!
//! - **`keymap`** – Translation tables from Windows virtual key codes and
//!   printable characters to USB HID Usage IDs.

// Rust will look for each module in a subdirectory with the same name
// (e.g., src/report/mod.rs).
pub mod domain;
pub mod keymap;
pub mod protocol;
pub mod report;

// Re-export the most-used types at the crate root so callers can write
// `hydra_core::HidReport` instead of `hydra_core::report::HidReport`.
pub use domain::address::{AddressError, AddressKind, BdAddr};
pub use domain::peer::{ConnectedPeer, PeerIdentity, SessionHandle};
pub use keymap::hid::HidKeyCode;
pub use protocol::dashboard::{DeliveryCounters, KindCounters};
pub use protocol::frame::{Command, DashboardAction, ProtocolError};
pub use protocol::listing::PeerRow;
pub use report::{HidReport, ReportKind};
