//! Pure functions that turn host input state into reports.

use crate::keymap::windows_vk::vk_to_hid;

use super::keyboard::KeyboardReport;
use super::mouse::{clamp_axis, MouseButtons, MouseReport};

/// Builds the keyboard report for the set of Windows virtual keys currently
/// held, given in press order.
///
/// Modifier keys become bits in byte 0.  The first six non-modifier keys with
/// a HID mapping fill the key slots; a seventh is dropped silently.  Keys with
/// no HID mapping are skipped.
pub fn compose_from_held_keys(held_vkeys: &[u8]) -> KeyboardReport {
    KeyboardReport::from_keys(held_vkeys.iter().map(|&vk| vk_to_hid(vk)))
}

/// Builds a mouse report, clamping each delta to −127..=127.
pub fn compose_mouse(buttons: MouseButtons, dx: i32, dy: i32, wheel: i32) -> MouseReport {
    MouseReport::new(buttons, clamp_axis(dx), clamp_axis(dy), clamp_axis(wheel))
}
