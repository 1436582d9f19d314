//! Fixed-size HID input reports.
//!
//! Each report kind has a payload whose length never varies:
//!
//! | kind             | bytes | layout                                              |
//! |------------------|-------|-----------------------------------------------------|
//! | keyboard         | 8     | modifier, reserved, 6 key slots                     |
//! | mouse (relative) | 4     | buttons, Δx, Δy, wheel (signed, −127..=127)         |
//! | consumer control | 1     | 2-bit channel, volume up/down bits, 4-bit control   |
//! | gamepad          | 11    | 6 signed axes, hat switch, 32-bit button bitmap     |
//!
//! A report kind is numbered twice: by its serial-link tag (the byte the
//! bridge writes in front of the payload) and by its report ID in the
//! dongle's HID report map.  The two numberings differ for mouse and
//! consumer control, so always go through [`ReportKind::link_tag`] and
//! [`ReportKind::report_id`] rather than casting.

pub mod compose;
pub mod consumer;
pub mod gamepad;
pub mod keyboard;
pub mod mouse;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use compose::{compose_from_held_keys, compose_mouse};
pub use consumer::ConsumerReport;
pub use gamepad::GamepadReport;
pub use keyboard::{KeyboardReport, ModifierFlags};
pub use mouse::{MouseButtons, MouseReport};

/// The four report kinds the dongle's HID report map declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportKind {
    Keyboard,
    Mouse,
    Consumer,
    Gamepad,
}

impl ReportKind {
    /// All kinds, in dashboard column order.
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Keyboard,
        ReportKind::Mouse,
        ReportKind::Consumer,
        ReportKind::Gamepad,
    ];

    /// The serial-link command tag that introduces this kind's payload.
    pub fn link_tag(self) -> u8 {
        match self {
            ReportKind::Keyboard => 1,
            ReportKind::Mouse => 2,
            ReportKind::Consumer => 3,
            ReportKind::Gamepad => 4,
        }
    }

    /// Looks up the kind introduced by a serial-link tag.
    pub fn from_link_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.link_tag() == tag)
    }

    /// The report ID declared for this kind in the HID report map.
    pub fn report_id(self) -> u8 {
        match self {
            ReportKind::Keyboard => 1,
            ReportKind::Consumer => 2,
            ReportKind::Mouse => 3,
            ReportKind::Gamepad => 4,
        }
    }

    /// Fixed payload length in bytes.
    pub fn payload_len(self) -> usize {
        match self {
            ReportKind::Keyboard => keyboard::KEYBOARD_REPORT_LEN,
            ReportKind::Mouse => mouse::MOUSE_REPORT_LEN,
            ReportKind::Consumer => consumer::CONSUMER_REPORT_LEN,
            ReportKind::Gamepad => gamepad::GAMEPAD_REPORT_LEN,
        }
    }

    /// Whether the legacy boot protocol has a report shape for this kind.
    pub fn has_boot_report(self) -> bool {
        matches!(self, ReportKind::Keyboard | ReportKind::Mouse)
    }

    /// Upper-case column label used by the delivery dashboard.
    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Keyboard => "KEYBOARD",
            ReportKind::Mouse => "MOUSE",
            ReportKind::Consumer => "CONSUMER",
            ReportKind::Gamepad => "GAMEPAD",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportKind::Keyboard => "keyboard",
            ReportKind::Mouse => "mouse",
            ReportKind::Consumer => "consumer",
            ReportKind::Gamepad => "gamepad",
        })
    }
}

/// One report of any kind, owned by whoever is composing or delivering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidReport {
    Keyboard(KeyboardReport),
    Mouse(MouseReport),
    Consumer(ConsumerReport),
    Gamepad(GamepadReport),
}

impl HidReport {
    /// The all-zero report of `kind` (no keys, no motion, no buttons).
    pub fn zeroed(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Keyboard => HidReport::Keyboard(KeyboardReport::default()),
            ReportKind::Mouse => HidReport::Mouse(MouseReport::default()),
            ReportKind::Consumer => HidReport::Consumer(ConsumerReport::default()),
            ReportKind::Gamepad => HidReport::Gamepad(GamepadReport::default()),
        }
    }

    /// Builds a report of `kind` from exactly [`ReportKind::payload_len`] bytes.
    ///
    /// Returns `None` when `payload` has the wrong length.
    pub fn from_payload(kind: ReportKind, payload: &[u8]) -> Option<Self> {
        let report = match kind {
            ReportKind::Keyboard => HidReport::Keyboard(KeyboardReport::from_bytes(payload.try_into().ok()?)),
            ReportKind::Mouse => HidReport::Mouse(MouseReport::from_bytes(payload.try_into().ok()?)),
            ReportKind::Consumer => HidReport::Consumer(ConsumerReport::from_bytes(payload.try_into().ok()?)),
            ReportKind::Gamepad => HidReport::Gamepad(GamepadReport::from_bytes(payload.try_into().ok()?)),
        };
        Some(report)
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            HidReport::Keyboard(_) => ReportKind::Keyboard,
            HidReport::Mouse(_) => ReportKind::Mouse,
            HidReport::Consumer(_) => ReportKind::Consumer,
            HidReport::Gamepad(_) => ReportKind::Gamepad,
        }
    }

    /// The payload bytes, without any link tag or report ID.
    pub fn payload(&self) -> &[u8] {
        match self {
            HidReport::Keyboard(r) => r.as_bytes(),
            HidReport::Mouse(r) => r.as_bytes(),
            HidReport::Consumer(r) => r.as_bytes(),
            HidReport::Gamepad(r) => r.as_bytes(),
        }
    }

    /// Zeroes every payload byte.  The kind is unchanged.
    pub fn clear(&mut self) {
        match self {
            HidReport::Keyboard(r) => r.clear(),
            HidReport::Mouse(r) => r.clear(),
            HidReport::Consumer(r) => r.clear(),
            HidReport::Gamepad(r) => r.clear(),
        }
    }

    /// Returns `true` when every payload byte is zero.
    pub fn is_zeroed(&self) -> bool {
        self.payload().iter().all(|&b| b == 0)
    }
}

impl From<KeyboardReport> for HidReport {
    fn from(r: KeyboardReport) -> Self {
        HidReport::Keyboard(r)
    }
}

impl From<MouseReport> for HidReport {
    fn from(r: MouseReport) -> Self {
        HidReport::Mouse(r)
    }
}

impl From<ConsumerReport> for HidReport {
    fn from(r: ConsumerReport) -> Self {
        HidReport::Consumer(r)
    }
}

impl From<GamepadReport> for HidReport {
    fn from(r: GamepadReport) -> Self {
        HidReport::Gamepad(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_tags_and_report_ids_are_separate_numberings() {
        assert_eq!(ReportKind::Mouse.link_tag(), 2);
        assert_eq!(ReportKind::Mouse.report_id(), 3);
        assert_eq!(ReportKind::Consumer.link_tag(), 3);
        assert_eq!(ReportKind::Consumer.report_id(), 2);
        assert_eq!(ReportKind::Keyboard.link_tag(), ReportKind::Keyboard.report_id());
    }

    #[test]
    fn test_from_link_tag_rejects_unassigned_tags() {
        assert_eq!(ReportKind::from_link_tag(1), Some(ReportKind::Keyboard));
        assert_eq!(ReportKind::from_link_tag(4), Some(ReportKind::Gamepad));
        assert_eq!(ReportKind::from_link_tag(0), None);
        assert_eq!(ReportKind::from_link_tag(5), None);
        assert_eq!(ReportKind::from_link_tag(b'l'), None);
    }

    #[test]
    fn test_payload_lengths_match_report_map() {
        let lens: Vec<usize> = ReportKind::ALL.iter().map(|k| k.payload_len()).collect();
        assert_eq!(lens, vec![8, 4, 1, 11]);
    }

    #[test]
    fn test_only_keyboard_and_mouse_have_boot_reports() {
        assert!(ReportKind::Keyboard.has_boot_report());
        assert!(ReportKind::Mouse.has_boot_report());
        assert!(!ReportKind::Consumer.has_boot_report());
        assert!(!ReportKind::Gamepad.has_boot_report());
    }

    #[test]
    fn test_from_payload_rejects_wrong_length() {
        assert!(HidReport::from_payload(ReportKind::Keyboard, &[0; 7]).is_none());
        assert!(HidReport::from_payload(ReportKind::Mouse, &[0; 5]).is_none());
    }

    #[test]
    fn test_zeroed_report_has_kind_length_and_no_set_bytes() {
        for kind in ReportKind::ALL {
            // Arrange / Act
            let report = HidReport::zeroed(kind);

            // Assert
            assert_eq!(report.kind(), kind);
            assert_eq!(report.payload().len(), kind.payload_len());
            assert!(report.is_zeroed());
        }
    }

    #[test]
    fn test_clear_keeps_kind_and_length() {
        // Arrange
        let mut report = HidReport::from_payload(ReportKind::Gamepad, &[0xAA; 11]).unwrap();

        // Act
        report.clear();

        // Assert
        assert_eq!(report.kind(), ReportKind::Gamepad);
        assert_eq!(report.payload(), &[0u8; 11]);
    }
}
