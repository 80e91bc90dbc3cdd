// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::collections::VecDeque;

use crate::{KEY_SEQUENCES, Key, KeyEvent};

/// Code points waiting to be turned into [`KeyEvent`]s.
///
/// Parsing happens when an event is taken out, not when input is added, so the edit mode
/// that is active at that moment decides which sequences are recognized.
///
/// There is no timeout. Input is appended one read at a time, so a sequence that is cut
/// off by the end of the queue is one whose read ended there. Waiting for the rest would
/// stall a lone `ESC` forever, so the longest sequence that is fully present wins, which
/// for a bare `ESC` is [`Key::Escape`].
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    pending: VecDeque<char>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn append(&mut self, code_points: &[char]) { self.pending.extend(code_points); }

    #[must_use]
    pub fn has_next(&self) -> bool { !self.pending.is_empty() }

    #[must_use]
    pub fn len(&self) -> usize { self.pending.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    pub fn clear(&mut self) { self.pending.clear(); }

    /// Take the next event. `recognizes` filters the key table, e.g. a mode that does
    /// not know Meta chords reads `ESC b` as two events.
    pub fn next(&mut self, recognizes: impl Fn(Key) -> bool) -> Option<KeyEvent> {
        let first = *self.pending.front()?;

        let mut best: Option<(usize, Key)> = None;
        for &(sequence, key) in KEY_SEQUENCES {
            let longer = best.is_none_or(|(len, _)| sequence.len() > len);
            if longer && recognizes(key) && self.starts_with(sequence) {
                best = Some((sequence.len(), key));
            }
        }

        match best {
            Some((len, key)) => {
                self.pending.drain(..len);
                Some(KeyEvent::Key(key))
            }
            None => {
                self.pending.pop_front();
                Some(KeyEvent::Char(first))
            }
        }
    }

    fn starts_with(&self, sequence: &[char]) -> bool {
        self.pending.len() >= sequence.len()
            && sequence
                .iter()
                .zip(self.pending.iter())
                .all(|(lhs, rhs)| lhs == rhs)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ESC;

    fn drain(queue: &mut EventQueue, recognizes: impl Fn(Key) -> bool + Copy) -> Vec<KeyEvent> {
        let mut acc = vec![];
        while let Some(event) = queue.next(recognizes) {
            acc.push(event);
        }
        acc
    }

    #[test]
    fn test_escape_sequences_are_atomic() {
        let mut queue = EventQueue::new();
        queue.append(&['a', ESC, '[', 'A', ESC, '[', '3', '~', 'b']);
        assert_eq!(
            drain(&mut queue, |_| true),
            vec![
                KeyEvent::Char('a'),
                KeyEvent::Key(Key::Up),
                KeyEvent::Key(Key::Delete),
                KeyEvent::Char('b'),
            ]
        );
    }

    #[test]
    fn test_lone_escape_at_end_of_input() {
        let mut queue = EventQueue::new();
        queue.append(&[ESC]);
        assert_eq!(drain(&mut queue, |_| true), vec![KeyEvent::Key(Key::Escape)]);
    }

    #[test]
    fn test_cut_off_sequence_falls_back_to_escape() {
        let mut queue = EventQueue::new();
        queue.append(&[ESC, '[']);
        assert_eq!(
            drain(&mut queue, |_| true),
            vec![KeyEvent::Key(Key::Escape), KeyEvent::Char('[')]
        );
    }

    #[test]
    fn test_sequence_split_across_appends_before_dequeue() {
        let mut queue = EventQueue::new();
        queue.append(&[ESC, '[']);
        queue.append(&['D']);
        assert_eq!(drain(&mut queue, |_| true), vec![KeyEvent::Key(Key::Left)]);
    }

    #[test]
    fn test_meta_chords_depend_on_recognizer() {
        let mut queue = EventQueue::new();
        queue.append(&[ESC, 'b']);
        assert_eq!(drain(&mut queue, |_| true), vec![KeyEvent::Key(Key::MetaB)]);

        queue.append(&[ESC, 'b']);
        assert_eq!(
            drain(&mut queue, |key: Key| !key.is_meta()),
            vec![KeyEvent::Key(Key::Escape), KeyEvent::Char('b')]
        );
    }

    #[test]
    fn test_control_characters() {
        let mut queue = EventQueue::new();
        queue.append(&['\r', '\u{12}', '\u{7f}']);
        assert_eq!(
            drain(&mut queue, |_| true),
            vec![
                KeyEvent::Key(Key::Enter),
                KeyEvent::Key(Key::CtrlR),
                KeyEvent::Key(Key::Backspace),
            ]
        );
        assert!(!queue.has_next());
    }
}
