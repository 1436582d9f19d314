//! hydra-dongle library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the dongle do? (for beginners)
//!
//! The dongle is a Bluetooth LE HID peripheral: every computer ("central")
//! paired with it sees an ordinary wireless keyboard and mouse.  A serial link
//! connects it to the bridge running on the controlling machine.
//!
//! 1. The bridge writes report frames and text commands to the serial link.
//! 2. The command processor decodes each command.
//! 3. Report frames go to the delivery engine, which waits for the wireless
//!    stack's send credit and sends the report to the *active* central.
//! 4. Text commands list and select centrals, control advertising, show the
//!    delivery dashboard, and so on.  Their answers go back over the link.

/// Application layer: registry, delivery engine, and stack ports.
pub mod application;

/// Infrastructure layer: serial command processor and loopback stack.
pub mod infrastructure;
