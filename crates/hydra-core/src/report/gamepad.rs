//! 11-byte gamepad report: six signed axes, a hat switch, 32 buttons.

use super::mouse::AXIS_LIMIT;

pub const GAMEPAD_REPORT_LEN: usize = 11;

/// Axis order in the report: X, Y, Z, Rz, Rx, Ry.
pub const AXIS_COUNT: usize = 6;

const HAT_BYTE: usize = AXIS_COUNT;
const BUTTONS: usize = AXIS_COUNT + 1;

/// Hat switch value for "centred"; 1..=8 are the eight directions.
pub const HAT_CENTERED: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadReport {
    bytes: [u8; GAMEPAD_REPORT_LEN],
}

impl GamepadReport {
    pub fn from_bytes(bytes: &[u8; GAMEPAD_REPORT_LEN]) -> Self {
        Self { bytes: *bytes }
    }

    /// Builds a report; axes are clamped to −127..=127 and the button bitmap
    /// is stored little-endian.
    pub fn new(axes: [i8; AXIS_COUNT], hat: u8, buttons: u32) -> Self {
        let mut bytes = [0u8; GAMEPAD_REPORT_LEN];
        for (dst, axis) in bytes.iter_mut().zip(axes) {
            *dst = (axis as i32).max(-AXIS_LIMIT) as i8 as u8;
        }
        bytes[HAT_BYTE] = if hat <= 8 { hat } else { HAT_CENTERED };
        bytes[BUTTONS..].copy_from_slice(&buttons.to_le_bytes());
        Self { bytes }
    }

    pub fn clear(&mut self) {
        self.bytes = [0; GAMEPAD_REPORT_LEN];
    }

    pub fn axes(&self) -> [i8; AXIS_COUNT] {
        let mut axes = [0i8; AXIS_COUNT];
        for (axis, &b) in axes.iter_mut().zip(&self.bytes[..AXIS_COUNT]) {
            *axis = b as i8;
        }
        axes
    }

    pub fn hat(&self) -> u8 {
        self.bytes[HAT_BYTE]
    }

    pub fn buttons(&self) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[BUTTONS..]);
        u32::from_le_bytes(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
