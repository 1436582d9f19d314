//! One-byte consumer control report.
//!
//! Bit layout, least significant first:
//!
//! ```text
//! bits 0-1  channel      relative −1..=1 (two's complement, 2 bits)
//! bit  2    volume up
//! bit  3    volume down
//! bits 4-7  control      1..=12 = mute, power, recall last, assign selection,
//!                        play, pause, record, fast forward, rewind,
//!                        scan next, scan previous, stop; 0 = none
//! ```

pub const CONSUMER_REPORT_LEN: usize = 1;

const CHANNEL_MASK: u8 = 0b0000_0011;
const VOLUME_UP: u8 = 0b0000_0100;
const VOLUME_DOWN: u8 = 0b0000_1000;
const CONTROL_SHIFT: u8 = 4;

/// Highest control code declared by the report map.
pub const MAX_CONTROL: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsumerReport {
    bytes: [u8; CONSUMER_REPORT_LEN],
}

impl ConsumerReport {
    pub fn from_bytes(bytes: &[u8; CONSUMER_REPORT_LEN]) -> Self {
        Self { bytes: *bytes }
    }

    /// Packs the report fields.  `channel` is clamped to −1..=1 and a
    /// `control` above [`MAX_CONTROL`] is sent as "none".
    pub fn new(channel: i8, volume_up: bool, volume_down: bool, control: u8) -> Self {
        let mut byte = (channel.clamp(-1, 1) as u8) & CHANNEL_MASK;
        if volume_up {
            byte |= VOLUME_UP;
        }
        if volume_down {
            byte |= VOLUME_DOWN;
        }
        if control <= MAX_CONTROL {
            byte |= control << CONTROL_SHIFT;
        }
        Self { bytes: [byte] }
    }

    pub fn clear(&mut self) {
        self.bytes = [0];
    }

    pub fn channel(&self) -> i8 {
        // Sign-extend the 2-bit field.
        ((self.bytes[0] << 6) as i8) >> 6
    }

    pub fn volume_up(&self) -> bool {
        self.bytes[0] & VOLUME_UP != 0
    }

    pub fn volume_down(&self) -> bool {
        self.bytes[0] & VOLUME_DOWN != 0
    }

    pub fn control(&self) -> u8 {
        self.bytes[0] >> CONTROL_SHIFT
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
