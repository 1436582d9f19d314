//! Application layer use cases for the bridge.
//!
//! Use cases here depend only on traits (`ReportSink`, `CursorController`,
//! `PeerLink`) and `hydra_core` types.  The serial link, the operating-system
//! input hooks, and the config file are injected from `infrastructure`.
//!
//! # Sub-modules
//!
//! - **`forward_input`** – Turns captured key and mouse events into HID
//!   reports while capture is on, and handles entering and leaving capture
//!   (including the Left Ctrl + Left Alt release hotkey).
//!
//! - **`coalesce`** – Rate-limits mouse motion reports, summing motion that
//!   arrives faster than the report rate so none of it is lost.
//!
//! - **`type_text`** – Types a string on the active central, one key press
//!   and release per character.
//!
//! - **`manage_peers`** – Lists and selects the dongle's centrals and keeps
//!   operator-chosen nicknames for them.

pub mod coalesce;
pub mod forward_input;
pub mod manage_peers;
pub mod type_text;
