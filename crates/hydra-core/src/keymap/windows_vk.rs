//! Windows Virtual Key (VK) code to USB HID Usage ID translation table.
//!
//! The bridge's keyboard hook reports keys as VK codes (`winuser.h`), and the
//! set of held keys is tracked in that form.  Every composed keyboard report
//! goes through [`vk_to_hid`], so the table is a `const` array indexed by VK
//! code: one bounds-free lookup per key.
//!
//! The generic modifier codes (`VK_SHIFT`, `VK_CONTROL`, `VK_MENU`) map to the
//! left-hand usages; hooks that report the sided codes (`VK_LSHIFT` …
//! `VK_RMENU`) get the exact side.

use super::hid::HidKeyCode;

/// Translates a Windows Virtual Key code to a HID Usage ID.
///
/// Returns [`HidKeyCode::Unknown`] for VK codes with no keyboard usage
/// (mouse buttons, browser and launcher keys, IME keys).
pub fn vk_to_hid(vk: u8) -> HidKeyCode {
    VK_TO_HID_TABLE[vk as usize]
}

/// VK → HID mapping indexed by VK code (0x00–0xFF).
///
/// Reference: https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes
const VK_TO_HID_TABLE: [HidKeyCode; 256] = {
    use HidKeyCode::*;
    let mut t = [Unknown; 256];

    // ── Editing and control ───────────────────────────────────────────────────
    t[0x08] = Backspace;    // VK_BACK
    t[0x09] = Tab;          // VK_TAB
    t[0x0D] = Enter;        // VK_RETURN
    t[0x13] = Pause;        // VK_PAUSE
    t[0x14] = CapsLock;     // VK_CAPITAL
    t[0x1B] = Escape;       // VK_ESCAPE
    t[0x20] = Space;        // VK_SPACE
    t[0x21] = PageUp;       // VK_PRIOR
    t[0x22] = PageDown;     // VK_NEXT
    t[0x23] = End;          // VK_END
    t[0x24] = Home;         // VK_HOME
    t[0x25] = ArrowLeft;    // VK_LEFT
    t[0x26] = ArrowUp;      // VK_UP
    t[0x27] = ArrowRight;   // VK_RIGHT
    t[0x28] = ArrowDown;    // VK_DOWN
    t[0x29] = Escape;       // VK_SELECT
    t[0x2A] = PrintScreen;  // VK_PRINT
    t[0x2B] = Execute;      // VK_EXECUTE
    t[0x2C] = PrintScreen;  // VK_SNAPSHOT
    t[0x2D] = Insert;       // VK_INSERT
    t[0x2E] = Delete;       // VK_DELETE
    t[0x2F] = Help;         // VK_HELP
    t[0x5D] = ContextMenu;  // VK_APPS
    t[0x91] = ScrollLock;   // VK_SCROLL

    // ── Digit row (VK_0=0x30 … VK_9=0x39) ────────────────────────────────────
    t[0x30] = Digit0;
    t[0x31] = Digit1;
    t[0x32] = Digit2;
    t[0x33] = Digit3;
    t[0x34] = Digit4;
    t[0x35] = Digit5;
    t[0x36] = Digit6;
    t[0x37] = Digit7;
    t[0x38] = Digit8;
    t[0x39] = Digit9;

    // ── Letters (VK_A=0x41 … VK_Z=0x5A, HID 0x04 … 0x1D) ─────────────────────
    let mut vk = 0x41;
    while vk <= 0x5A {
        t[vk] = HidKeyCode::from_u8(vk as u8 - 0x41 + 0x04);
        vk += 1;
    }

    // ── Numpad ────────────────────────────────────────────────────────────────
    t[0x60] = Numpad0;
    t[0x61] = Numpad1;
    t[0x62] = Numpad2;
    t[0x63] = Numpad3;
    t[0x64] = Numpad4;
    t[0x65] = Numpad5;
    t[0x66] = Numpad6;
    t[0x67] = Numpad7;
    t[0x68] = Numpad8;
    t[0x69] = Numpad9;
    t[0x6A] = NumpadMultiply;   // VK_MULTIPLY
    t[0x6B] = NumpadAdd;        // VK_ADD
    t[0x6C] = NumpadEnter;      // VK_SEPARATOR
    t[0x6D] = NumpadSubtract;   // VK_SUBTRACT
    t[0x6E] = NumpadDecimal;    // VK_DECIMAL
    t[0x6F] = NumpadDivide;     // VK_DIVIDE
    t[0x90] = NumLock;          // VK_NUMLOCK

    // ── Function keys (VK_F1=0x70 … VK_F24=0x87) ──────────────────────────────
    t[0x70] = F1;
    t[0x71] = F2;
    t[0x72] = F3;
    t[0x73] = F4;
    t[0x74] = F5;
    t[0x75] = F6;
    t[0x76] = F7;
    t[0x77] = F8;
    t[0x78] = F9;
    t[0x79] = F10;
    t[0x7A] = F11;
    t[0x7B] = F12;
    t[0x7C] = F13;
    t[0x7D] = F14;
    t[0x7E] = F15;
    t[0x7F] = F16;
    t[0x80] = F17;
    t[0x81] = F18;
    t[0x82] = F19;
    t[0x83] = F20;
    t[0x84] = F21;
    t[0x85] = F22;
    t[0x86] = F23;
    t[0x87] = F24;

    // ── Modifiers ─────────────────────────────────────────────────────────────
    t[0x10] = ShiftLeft;    // VK_SHIFT
    t[0x11] = ControlLeft;  // VK_CONTROL
    t[0x12] = AltLeft;      // VK_MENU
    t[0xA0] = ShiftLeft;    // VK_LSHIFT
    t[0xA1] = ShiftRight;   // VK_RSHIFT
    t[0xA2] = ControlLeft;  // VK_LCONTROL
    t[0xA3] = ControlRight; // VK_RCONTROL
    t[0xA4] = AltLeft;      // VK_LMENU
    t[0xA5] = AltRight;     // VK_RMENU
    t[0x5B] = MetaLeft;     // VK_LWIN
    t[0x5C] = MetaRight;    // VK_RWIN

    // ── Volume ────────────────────────────────────────────────────────────────
    t[0xAD] = Mute;         // VK_VOLUME_MUTE
    t[0xAE] = VolumeDown;   // VK_VOLUME_DOWN
    t[0xAF] = VolumeUp;     // VK_VOLUME_UP

    // ── US-layout punctuation ─────────────────────────────────────────────────
    t[0xBA] = Semicolon;    // VK_OEM_1      (; :)
    t[0xBB] = Equal;        // VK_OEM_PLUS   (= +)
    t[0xBC] = Comma;        // VK_OEM_COMMA  (, <)
    t[0xBD] = Minus;        // VK_OEM_MINUS  (- _)
    t[0xBE] = Period;       // VK_OEM_PERIOD (. >)
    t[0xBF] = Slash;        // VK_OEM_2      (/ ?)
    t[0xC0] = Backquote;    // VK_OEM_3      (` ~)
    t[0xDB] = BracketLeft;  // VK_OEM_4      ([ {)
    t[0xDC] = Backslash;    // VK_OEM_5      (\ |)
    t[0xDD] = BracketRight; // VK_OEM_6      (] })
    t[0xDE] = Quote;        // VK_OEM_7      (' ")
    t[0xE2] = IntlBackslash; // VK_OEM_102   (< > on ISO boards)

    t
};

/// `VK_LCONTROL`, half of the bridge's release hotkey.
pub const VK_LCONTROL: u8 = 0xA2;
/// `VK_LMENU` (Left Alt), the other half.
pub const VK_LMENU: u8 = 0xA4;
