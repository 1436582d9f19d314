//! Printable character to (HID usage, modifier) translation for typing text.
//!
//! Assumes a US layout on the receiving central: shifted symbols and
//! upper-case letters are produced with Left Shift held.

use super::hid::HidKeyCode;

/// Modifier byte with only Left Shift held.
const SHIFT: u8 = 0x02;

/// Returns the key and modifier byte that type `ch`, or `None` when the
/// character has no key on a US layout.
pub fn char_to_hid(ch: char) -> Option<(HidKeyCode, u8)> {
    use HidKeyCode::*;

    if ch.is_ascii_lowercase() {
        return Some((HidKeyCode::from_u8(ch as u8 - b'a' + 0x04), 0));
    }
    if ch.is_ascii_uppercase() {
        return Some((HidKeyCode::from_u8(ch as u8 - b'A' + 0x04), SHIFT));
    }

    let mapped = match ch {
        '1' => (Digit1, 0),
        '2' => (Digit2, 0),
        '3' => (Digit3, 0),
        '4' => (Digit4, 0),
        '5' => (Digit5, 0),
        '6' => (Digit6, 0),
        '7' => (Digit7, 0),
        '8' => (Digit8, 0),
        '9' => (Digit9, 0),
        '0' => (Digit0, 0),
        '!' => (Digit1, SHIFT),
        '@' => (Digit2, SHIFT),
        '#' => (Digit3, SHIFT),
        '$' => (Digit4, SHIFT),
        '%' => (Digit5, SHIFT),
        '^' => (Digit6, SHIFT),
        '&' => (Digit7, SHIFT),
        '*' => (Digit8, SHIFT),
        '(' => (Digit9, SHIFT),
        ')' => (Digit0, SHIFT),
        ' ' => (Space, 0),
        '\n' => (Enter, 0),
        '\t' => (Tab, 0),
        '-' => (Minus, 0),
        '_' => (Minus, SHIFT),
        '=' => (Equal, 0),
        '+' => (Equal, SHIFT),
        '[' => (BracketLeft, 0),
        '{' => (BracketLeft, SHIFT),
        ']' => (BracketRight, 0),
        '}' => (BracketRight, SHIFT),
        '\\' => (Backslash, 0),
        '|' => (Backslash, SHIFT),
        ';' => (Semicolon, 0),
        ':' => (Semicolon, SHIFT),
        '\'' => (Quote, 0),
        '"' => (Quote, SHIFT),
        '`' => (Backquote, 0),
        '~' => (Backquote, SHIFT),
        ',' => (Comma, 0),
        '<' => (Comma, SHIFT),
        '.' => (Period, 0),
        '>' => (Period, SHIFT),
        '/' => (Slash, 0),
        '?' => (Slash, SHIFT),
        _ => return None,
    };
    Some(mapped)
}
