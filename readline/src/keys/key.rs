// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::{Display, EnumIter, IntoStaticStr};

pub const ESC: char = '\u{1b}';
pub const DEL: char = '\u{7f}';

/// Named keys. Printable characters are not here, they arrive as
/// [`crate::KeyEvent::Char`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Key {
    CtrlA,
    CtrlB,
    CtrlC,
    CtrlD,
    CtrlE,
    CtrlF,
    CtrlG,
    CtrlH,
    Tab,
    CtrlJ,
    CtrlK,
    CtrlL,
    Enter,
    CtrlN,
    CtrlO,
    CtrlP,
    CtrlQ,
    CtrlR,
    CtrlS,
    CtrlT,
    CtrlU,
    CtrlV,
    CtrlW,
    CtrlX,
    CtrlY,
    CtrlZ,
    Escape,
    CtrlUnderscore,
    Backspace,
    Up,
    Down,
    Right,
    Left,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    CtrlLeft,
    CtrlRight,
    MetaB,
    MetaD,
    MetaF,
    MetaBackspace,
}

/// Every code point sequence a terminal may send for a [`Key`]. A key can have several
/// sequences (normal and application cursor mode, vt220 and xterm home/end). The first
/// one listed for a key is its canonical form.
pub const KEY_SEQUENCES: &[(&[char], Key)] = &[
    (&['\u{1}'], Key::CtrlA),
    (&['\u{2}'], Key::CtrlB),
    (&['\u{3}'], Key::CtrlC),
    (&['\u{4}'], Key::CtrlD),
    (&['\u{5}'], Key::CtrlE),
    (&['\u{6}'], Key::CtrlF),
    (&['\u{7}'], Key::CtrlG),
    (&['\u{8}'], Key::CtrlH),
    (&['\t'], Key::Tab),
    (&['\n'], Key::CtrlJ),
    (&['\u{b}'], Key::CtrlK),
    (&['\u{c}'], Key::CtrlL),
    (&['\r'], Key::Enter),
    (&['\u{e}'], Key::CtrlN),
    (&['\u{f}'], Key::CtrlO),
    (&['\u{10}'], Key::CtrlP),
    (&['\u{11}'], Key::CtrlQ),
    (&['\u{12}'], Key::CtrlR),
    (&['\u{13}'], Key::CtrlS),
    (&['\u{14}'], Key::CtrlT),
    (&['\u{15}'], Key::CtrlU),
    (&['\u{16}'], Key::CtrlV),
    (&['\u{17}'], Key::CtrlW),
    (&['\u{18}'], Key::CtrlX),
    (&['\u{19}'], Key::CtrlY),
    (&['\u{1a}'], Key::CtrlZ),
    (&[ESC], Key::Escape),
    (&['\u{1f}'], Key::CtrlUnderscore),
    (&[DEL], Key::Backspace),
    (&[ESC, '[', 'A'], Key::Up),
    (&[ESC, 'O', 'A'], Key::Up),
    (&[ESC, '[', 'B'], Key::Down),
    (&[ESC, 'O', 'B'], Key::Down),
    (&[ESC, '[', 'C'], Key::Right),
    (&[ESC, 'O', 'C'], Key::Right),
    (&[ESC, '[', 'D'], Key::Left),
    (&[ESC, 'O', 'D'], Key::Left),
    (&[ESC, '[', 'H'], Key::Home),
    (&[ESC, 'O', 'H'], Key::Home),
    (&[ESC, '[', '1', '~'], Key::Home),
    (&[ESC, '[', 'F'], Key::End),
    (&[ESC, 'O', 'F'], Key::End),
    (&[ESC, '[', '4', '~'], Key::End),
    (&[ESC, '[', '2', '~'], Key::Insert),
    (&[ESC, '[', '3', '~'], Key::Delete),
    (&[ESC, '[', '5', '~'], Key::PageUp),
    (&[ESC, '[', '6', '~'], Key::PageDown),
    (&[ESC, '[', '1', ';', '5', 'D'], Key::CtrlLeft),
    (&[ESC, '[', '1', ';', '5', 'C'], Key::CtrlRight),
    (&[ESC, 'b'], Key::MetaB),
    (&[ESC, 'd'], Key::MetaD),
    (&[ESC, 'f'], Key::MetaF),
    (&[ESC, DEL], Key::MetaBackspace),
];

impl Key {
    /// The canonical sequence for this key.
    #[must_use]
    pub fn code_points(self) -> &'static [char] {
        KEY_SEQUENCES
            .iter()
            .find(|(_, key)| *key == self)
            .map(|(sequence, _)| *sequence)
            .unwrap_or_default()
    }

    /// Exact match of a whole sequence.
    #[must_use]
    pub fn from_code_points(code_points: &[char]) -> Option<Key> {
        KEY_SEQUENCES
            .iter()
            .find(|(sequence, _)| *sequence == code_points)
            .map(|(_, key)| *key)
    }

    /// Keys sent as `ESC` followed by another key.
    #[must_use]
    pub fn is_meta(self) -> bool {
        matches!(self, Key::MetaB | Key::MetaD | Key::MetaF | Key::MetaBackspace)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_every_key_has_a_sequence() {
        for key in Key::iter() {
            assert!(!key.code_points().is_empty(), "{key} has no sequence");
        }
    }

    #[test]
    fn test_from_code_points() {
        assert_eq!(Key::from_code_points(&[ESC, 'O', 'A']), Some(Key::Up));
        assert_eq!(Key::from_code_points(&[ESC, '[', '3', '~']), Some(Key::Delete));
        assert_eq!(Key::from_code_points(&['\r']), Some(Key::Enter));
        assert_eq!(Key::from_code_points(&[ESC, '[']), None);
        assert_eq!(Key::from_code_points(&['a']), None);
    }

    #[test]
    fn test_canonical_sequence() {
        assert_eq!(Key::Up.code_points(), &[ESC, '[', 'A']);
        assert_eq!(Key::CtrlD.code_points(), &['\u{4}']);
    }
}
