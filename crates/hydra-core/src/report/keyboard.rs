//! Boot-compatible 8-byte keyboard report.

use crate::keymap::hid::HidKeyCode;

pub const KEYBOARD_REPORT_LEN: usize = 8;

/// Number of simultaneous non-modifier keys one report can carry.
pub const KEY_SLOTS: usize = 6;

const MODIFIER_BYTE: usize = 0;
const FIRST_SLOT: usize = 2;

/// Bitmask for the keyboard report's modifier byte.
///
/// Bit `n` corresponds to HID usage `0xE0 + n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierFlags(pub u8);

impl ModifierFlags {
    pub const LEFT_CTRL: u8 = 0x01;
    pub const LEFT_SHIFT: u8 = 0x02;
    pub const LEFT_ALT: u8 = 0x04;
    pub const LEFT_META: u8 = 0x08;
    pub const RIGHT_CTRL: u8 = 0x10;
    pub const RIGHT_SHIFT: u8 = 0x20;
    pub const RIGHT_ALT: u8 = 0x40;
    pub const RIGHT_META: u8 = 0x80;

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit == bit
    }
}

/// Keyboard report: `[modifier, reserved, key0, key1, key2, key3, key4, key5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardReport {
    bytes: [u8; KEYBOARD_REPORT_LEN],
}

impl KeyboardReport {
    /// Wraps raw payload bytes exactly as received.
    pub fn from_bytes(bytes: &[u8; KEYBOARD_REPORT_LEN]) -> Self {
        Self { bytes: *bytes }
    }

    /// A report holding `modifier` and a single key in the first slot.
    pub fn with_keycode(modifier: u8, keycode: u8) -> Self {
        let mut report = Self::default();
        report.set_keycode(modifier, keycode);
        report
    }

    /// Builds a report from HID keys in press order.
    ///
    /// Modifier keys set their bit; other keys fill the six slots in order.
    /// Keys beyond the sixth and [`HidKeyCode::Unknown`] are ignored.
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = HidKeyCode>,
    {
        let mut report = Self::default();
        let mut slot = 0;
        for key in keys {
            if let Some(bit) = key.modifier_bit() {
                report.bytes[MODIFIER_BYTE] |= bit;
            } else if key != HidKeyCode::Unknown && slot < KEY_SLOTS {
                report.bytes[FIRST_SLOT + slot] = key.as_u8();
                slot += 1;
            }
        }
        report
    }

    /// Overwrites the report with `modifier` in byte 0 and `keycode` in the
    /// first slot.  The reserved byte and the remaining slots become zero.
    pub fn set_keycode(&mut self, modifier: u8, keycode: u8) {
        self.bytes = [0; KEYBOARD_REPORT_LEN];
        self.bytes[MODIFIER_BYTE] = modifier;
        self.bytes[FIRST_SLOT] = keycode;
    }

    /// Zeroes all eight bytes, modifier included.
    pub fn clear(&mut self) {
        self.bytes = [0; KEYBOARD_REPORT_LEN];
    }

    pub fn modifiers(&self) -> ModifierFlags {
        ModifierFlags(self.bytes[MODIFIER_BYTE])
    }

    /// The six key slots; empty slots are zero.
    pub fn keycodes(&self) -> &[u8] {
        &self.bytes[FIRST_SLOT..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keycode_writes_modifier_and_first_slot_only() {
        // Arrange
        let mut report = KeyboardReport::from_bytes(&[0xFF; KEYBOARD_REPORT_LEN]);

        // Act
        report.set_keycode(0x02, 0x17);

        // Assert
        assert_eq!(report.as_bytes(), &[0x02, 0, 0x17, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_clear_after_press_yields_the_zero_report_including_modifier() {
        // Arrange: Shift + T
        let mut report = KeyboardReport::with_keycode(ModifierFlags::LEFT_SHIFT, 0x17);

        // Act
        report.clear();

        // Assert: clearing zeroes the modifier byte too
        assert_eq!(report, KeyboardReport::default());
        assert_eq!(report.as_bytes(), &[0u8; KEYBOARD_REPORT_LEN]);
    }

    #[test]
    fn test_from_keys_sets_modifier_bits_without_using_slots() {
        // Arrange
        let keys = [HidKeyCode::ControlLeft, HidKeyCode::AltRight, HidKeyCode::Delete];

        // Act
        let report = KeyboardReport::from_keys(keys);

        // Assert
        assert!(report.modifiers().contains(ModifierFlags::LEFT_CTRL));
        assert!(report.modifiers().contains(ModifierFlags::RIGHT_ALT));
        assert_eq!(report.keycodes(), &[0x4C, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_from_keys_skips_unknown_without_consuming_a_slot() {
        let report = KeyboardReport::from_keys([HidKeyCode::Unknown, HidKeyCode::KeyA]);
        assert_eq!(report.keycodes()[0], HidKeyCode::KeyA.as_u8());
    }

    #[test]
    fn test_from_bytes_preserves_reserved_byte() {
        let report = KeyboardReport::from_bytes(&[0, 0x7E, 4, 0, 0, 0, 0, 0]);
        assert_eq!(report.as_bytes()[1], 0x7E);
    }
}
