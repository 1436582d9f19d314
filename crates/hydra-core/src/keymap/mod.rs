//! Key code translation tables.
//!
//! The canonical representation is USB HID Usage IDs (page 0x07,
//! Keyboard/Keypad), which is what keyboard reports carry.  Host-side codes
//! are translated to HID before a report is composed.

pub mod hid;
pub mod text;
pub mod windows_vk;

pub use hid::HidKeyCode;
pub use text::char_to_hid;
pub use windows_vk::vk_to_hid;
