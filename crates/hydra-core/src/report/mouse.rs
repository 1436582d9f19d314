//! Relative 4-byte mouse report.

pub const MOUSE_REPORT_LEN: usize = 4;

/// Largest magnitude a relative axis may carry.  The report map declares
/// −127..=127, so −128 is never produced.
pub const AXIS_LIMIT: i32 = 127;

/// Button bitmap for byte 0 of the mouse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseButtons(pub u8);

impl MouseButtons {
    pub const LEFT: u8 = 0x01;
    pub const RIGHT: u8 = 0x02;
    pub const MIDDLE: u8 = 0x04;

    /// Sets or clears `bit`.
    pub fn set(&mut self, bit: u8, pressed: bool) {
        if pressed {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit == bit
    }
}

/// Mouse report: `[buttons, dx, dy, wheel]`, axes as two's-complement bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseReport {
    bytes: [u8; MOUSE_REPORT_LEN],
}

/// Clamps a delta into the report's signed range.
pub fn clamp_axis(value: i32) -> i8 {
    value.clamp(-AXIS_LIMIT, AXIS_LIMIT) as i8
}

impl MouseReport {
    pub fn from_bytes(bytes: &[u8; MOUSE_REPORT_LEN]) -> Self {
        Self { bytes: *bytes }
    }

    /// Builds a report from already-ranged axis values.
    pub fn new(buttons: MouseButtons, dx: i8, dy: i8, wheel: i8) -> Self {
        Self {
            bytes: [buttons.0, dx as u8, dy as u8, wheel as u8],
        }
    }

    pub fn clear(&mut self) {
        self.bytes = [0; MOUSE_REPORT_LEN];
    }

    pub fn buttons(&self) -> MouseButtons {
        MouseButtons(self.bytes[0])
    }

    pub fn dx(&self) -> i8 {
        self.bytes[1] as i8
    }

    pub fn dy(&self) -> i8 {
        self.bytes[2] as i8
    }

    pub fn wheel(&self) -> i8 {
        self.bytes[3] as i8
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_axes_are_stored_as_twos_complement() {
        // Arrange / Act
        let report = MouseReport::new(MouseButtons::default(), -10, 10, -1);

        // Assert
        assert_eq!(report.as_bytes(), &[0, 0xF6, 0x0A, 0xFF]);
        assert_eq!(report.dx(), -10);
        assert_eq!(report.wheel(), -1);
    }

    #[test]
    fn test_clamp_axis_never_produces_minus_128() {
        assert_eq!(clamp_axis(-128), -127);
        assert_eq!(clamp_axis(i32::MIN), -127);
        assert_eq!(clamp_axis(i32::MAX), 127);
        assert_eq!(clamp_axis(5), 5);
    }

    #[test]
    fn test_buttons_set_and_clear_individual_bits() {
        // Arrange
        let mut buttons = MouseButtons::default();

        // Act
        buttons.set(MouseButtons::LEFT, true);
        buttons.set(MouseButtons::MIDDLE, true);
        buttons.set(MouseButtons::LEFT, false);

        // Assert
        assert_eq!(buttons.0, MouseButtons::MIDDLE);
        assert!(!buttons.contains(MouseButtons::LEFT));
    }
}
