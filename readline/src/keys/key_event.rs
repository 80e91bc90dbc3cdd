// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::Key;

/// One unit of input handed to the binding tables: either a plain code point or a named
/// key whose whole escape sequence was recognized at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Char(char),
    Key(Key),
}

impl From<char> for KeyEvent {
    fn from(code_point: char) -> Self {
        match Key::from_code_points(&[code_point]) {
            Some(key) => KeyEvent::Key(key),
            None => KeyEvent::Char(code_point),
        }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self { KeyEvent::Key(key) }
}

impl KeyEvent {
    /// The code point when this event is exactly one code point long. Used to recognize
    /// the control characters that end or restart an interaction.
    #[must_use]
    pub fn single_code_point(&self) -> Option<char> {
        match self {
            KeyEvent::Char(code_point) => Some(*code_point),
            KeyEvent::Key(key) => match key.code_points() {
                [code_point] => Some(*code_point),
                _ => None,
            },
        }
    }

    #[must_use]
    pub fn is_printable(&self) -> bool {
        matches!(self, KeyEvent::Char(code_point) if !code_point.is_control())
    }

    #[must_use]
    pub fn is_key(&self, other: Key) -> bool { *self == KeyEvent::Key(other) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_from_char() {
        assert_eq!(KeyEvent::from('a'), KeyEvent::Char('a'));
        assert_eq!(KeyEvent::from('\u{4}'), KeyEvent::Key(Key::CtrlD));
        assert_eq!(KeyEvent::from('\u{1c}'), KeyEvent::Char('\u{1c}'));
    }

    #[test]
    fn test_single_code_point() {
        assert_eq!(KeyEvent::Key(Key::CtrlC).single_code_point(), Some('\u{3}'));
        assert_eq!(KeyEvent::Key(Key::Up).single_code_point(), None);
        assert_eq!(KeyEvent::Char('z').single_code_point(), Some('z'));
    }

    #[test]
    fn test_is_printable() {
        assert!(KeyEvent::Char('z').is_printable());
        assert!(KeyEvent::Char('\u{e9}').is_printable());
        assert!(!KeyEvent::Char('\u{1c}').is_printable());
        assert!(!KeyEvent::Key(Key::Tab).is_printable());
    }
}
