// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::Display, ops::Range};

use crate::EditError;

/// Row and column on the terminal, relative to the row the prompt starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

/// Where offset `offset` of a composite line lands on a terminal `width` columns wide.
///
/// A `width` of 0 is treated as 1 so a broken size report can't divide by zero.
#[must_use]
pub fn position(offset: usize, width: usize) -> Point {
    let width = width.max(1);
    Point {
        row: offset / width,
        col: offset % width,
    }
}

/// The text being edited, as code points, plus the cursor.
///
/// The cursor is always in `0..=len()`. Every mutation clamps it back into range before
/// returning, and [`Clone`] gives a cheap copy to try an edit on before showing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl From<&str> for LineBuffer {
    /// The cursor ends up after the last character.
    fn from(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }
}

impl Display for LineBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn len(&self) -> usize { self.chars.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.chars.is_empty() }

    #[must_use]
    pub fn cursor(&self) -> usize { self.cursor }

    #[must_use]
    pub fn as_slice(&self) -> &[char] { &self.chars }

    #[must_use]
    pub fn text(&self) -> String { self.to_string() }

    #[must_use]
    pub fn char_at(&self, index: usize) -> Option<char> { self.chars.get(index).copied() }

    /// Insert at the cursor and move the cursor past it. Control characters other than
    /// `'\n'` (which joins continuation lines) are rejected and leave the buffer as it
    /// was.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidCharacter`] for a rejected code point.
    pub fn insert(&mut self, code_point: char) -> Result<(), EditError> {
        check_insertable(code_point)?;
        self.chars.insert(self.cursor, code_point);
        self.cursor += 1;
        Ok(())
    }

    /// Insert all of `text` or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidCharacter`] for the first rejected code point.
    pub fn insert_str(&mut self, text: &str) -> Result<(), EditError> {
        for code_point in text.chars() {
            check_insertable(code_point)?;
        }
        let count = text.chars().count();
        self.chars.splice(self.cursor..self.cursor, text.chars());
        self.cursor += count;
        Ok(())
    }

    /// Delete `count` code points after the cursor, or before it when negative. Returns
    /// what was removed.
    pub fn delete(&mut self, count: isize) -> String {
        let range = if count >= 0 {
            self.cursor..self.cursor.saturating_add(count.unsigned_abs())
        } else {
            self.cursor.saturating_sub(count.unsigned_abs())..self.cursor
        };
        self.delete_range(range)
    }

    /// Remove `range` (clamped to the buffer) and return it. The cursor keeps its place
    /// relative to the text around it.
    pub fn delete_range(&mut self, range: Range<usize>) -> String {
        let end = range.end.min(self.chars.len());
        let start = range.start.min(end);
        let removed: String = self.chars.drain(start..end).collect();
        if self.cursor >= end {
            self.cursor -= end - start;
        } else if self.cursor > start {
            self.cursor = start;
        }
        removed
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let target = if delta >= 0 {
            self.cursor.saturating_add(delta.unsigned_abs())
        } else {
            self.cursor.saturating_sub(delta.unsigned_abs())
        };
        self.set_cursor(target);
    }

    pub fn set_cursor(&mut self, cursor: usize) { self.cursor = cursor.min(self.chars.len()); }

    pub fn move_to_end(&mut self) { self.cursor = self.chars.len(); }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Replace the whole text. The cursor goes to the end.
    pub fn replace(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
    }

    /// Swap the two characters around the cursor and step forward. At the end of the line
    /// the last two characters are swapped instead. Returns false when there is nothing
    /// to swap.
    pub fn transpose(&mut self) -> bool {
        if self.chars.len() < 2 || self.cursor == 0 {
            return false;
        }
        let right = self.cursor.min(self.chars.len() - 1);
        self.chars.swap(right - 1, right);
        self.cursor = right + 1;
        true
    }

    /// End of the next word, emacs `forward-word`.
    #[must_use]
    pub fn next_word_end(&self, from: usize) -> usize {
        let mut index = from.min(self.chars.len());
        while index < self.chars.len() && !is_word_char(self.chars[index]) {
            index += 1;
        }
        while index < self.chars.len() && is_word_char(self.chars[index]) {
            index += 1;
        }
        index
    }

    /// Start of the next word, vi `w`.
    #[must_use]
    pub fn next_word_start(&self, from: usize) -> usize {
        let len = self.chars.len();
        let mut index = from.min(len);
        if index < len && !self.chars[index].is_whitespace() {
            let class = is_word_char(self.chars[index]);
            while index < len
                && !self.chars[index].is_whitespace()
                && is_word_char(self.chars[index]) == class
            {
                index += 1;
            }
        }
        while index < len && self.chars[index].is_whitespace() {
            index += 1;
        }
        index
    }

    /// Start of the word before `from`, emacs `backward-word`.
    #[must_use]
    pub fn previous_word_start(&self, from: usize) -> usize {
        self.scan_back(from, |c| !is_word_char(c))
    }

    /// Like [`LineBuffer::previous_word_start`] but words are separated only by
    /// whitespace, `unix-word-rubout`.
    #[must_use]
    pub fn previous_whitespace_word_start(&self, from: usize) -> usize {
        self.scan_back(from, char::is_whitespace)
    }

    fn scan_back(&self, from: usize, is_separator: impl Fn(char) -> bool) -> usize {
        let mut index = from.min(self.chars.len());
        while index > 0 && is_separator(self.chars[index - 1]) {
            index -= 1;
        }
        while index > 0 && !is_separator(self.chars[index - 1]) {
            index -= 1;
        }
        index
    }
}

fn check_insertable(code_point: char) -> Result<(), EditError> {
    if code_point.is_control() && code_point != '\n' {
        Err(EditError::InvalidCharacter(code_point))
    } else {
        Ok(())
    }
}

fn is_word_char(c: char) -> bool { c.is_alphanumeric() || c == '_' }
