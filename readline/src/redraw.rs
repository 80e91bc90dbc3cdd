// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Turns one rendering of the composite line (prompt followed by buffer) into another.
//!
//! Only relative cursor motion and erase to end of line are emitted, since the engine
//! never knows which absolute row the prompt sits on. Positions come from
//! [`crate::position`]: offset `k` of the composite line is at row `k / width`, column
//! `k % width`, counting from the row the prompt starts on.
//!
//! A terminal that prints into its last column leaves the cursor there with a pending
//! wrap. Whenever a write ends exactly on a row boundary the wrap is forced by printing a
//! space and returning to column 0, so that the physical cursor matches
//! [`crate::position`] again.

use std::cmp::Ordering;

use crossterm::{Command,
                cursor::{MoveDown, MoveLeft, MoveRight, MoveTo, MoveUp},
                terminal::{Clear, ClearType}};

use crate::{LineBuffer, Point, position};

/// Prompt text plus the number of code points left once ANSI styling is removed. Like
/// the buffer, every code point takes one column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prompt {
    text: String,
    width: usize,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let width = strip_ansi_escapes::strip_str(&text).chars().count();
        Self { text, width }
    }

    #[must_use]
    pub fn text(&self) -> &str { &self.text }

    #[must_use]
    pub fn width(&self) -> usize { self.width }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self { Self::new(text) }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self { Self::new(text) }
}

/// The composite line: what is on screen for one prompt and buffer.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub prompt: &'a Prompt,
    pub buffer: &'a LineBuffer,
}

impl<'a> Frame<'a> {
    #[must_use]
    pub fn new(prompt: &'a Prompt, buffer: &'a LineBuffer) -> Self { Self { prompt, buffer } }

    #[must_use]
    pub fn len(&self) -> usize { self.prompt.width() + self.buffer.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    #[must_use]
    pub fn cursor(&self) -> usize { self.prompt.width() + self.buffer.cursor() }

    /// Position of the end of content.
    #[must_use]
    pub fn end_position(&self, width: u16) -> Point { position(self.len(), usize::from(width)) }

    #[must_use]
    pub fn cursor_position(&self, width: u16) -> Point {
        position(self.cursor(), usize::from(width))
    }
}

/// Append the output that turns `old` (currently on screen, cursor where `old` says) into
/// `new`. When the prompt is unchanged, rendering starts at the first code point where the
/// buffers differ. Otherwise the whole composite line is rewritten from its first row.
///
/// `update(frame, frame, ..)` appends nothing.
pub fn update(old: Frame<'_>, new: Frame<'_>, width: u16, acc: &mut String) {
    let width = usize::from(width).max(1);
    let same_prompt = old.prompt == new.prompt;
    let diff = if same_prompt {
        new.prompt.width() + common_prefix(old.buffer.as_slice(), new.buffer.as_slice())
    } else {
        0
    };
    let (old_len, new_len) = (old.len(), new.len());
    let mut at = position(old.cursor(), width);

    if diff < new_len || old_len > new_len || !same_prompt {
        move_to(&mut at, position(diff, width), acc);

        if !same_prompt {
            acc.push_str(new.prompt.text());
        }
        let from = diff.saturating_sub(new.prompt.width());
        acc.extend(&new.buffer.as_slice()[from..]);
        if diff < new_len {
            at = end_of_write(new_len, width, acc);
        }

        if old_len > new_len {
            queue(acc, Clear(ClearType::UntilNewLine));
            let old_last_row = (old_len - 1) / width;
            while at.row < old_last_row {
                queue(acc, MoveDown(1));
                acc.push('\r');
                queue(acc, Clear(ClearType::UntilNewLine));
                at = Point {
                    row: at.row + 1,
                    col: 0,
                };
            }
        }
    }

    move_to(&mut at, position(new.cursor(), width), acc);
}

/// Render `frame` from scratch. The cursor must be at column 0 of an empty row.
pub fn redraw(frame: Frame<'_>, width: u16, acc: &mut String) {
    let width = usize::from(width).max(1);
    acc.push_str(frame.prompt.text());
    acc.extend(frame.buffer.as_slice());
    let mut at = if frame.is_empty() {
        Point::default()
    } else {
        end_of_write(frame.len(), width, acc)
    };
    queue(acc, Clear(ClearType::UntilNewLine));
    move_to(&mut at, position(frame.cursor(), width), acc);
}

/// Re-render `frame` after the terminal changed from `old_width` to `new_width` columns.
///
/// The terminal is assumed not to reflow, so the rows the old render occupies and the
/// cursor's row both follow `old_width`. Those rows are erased bottom up, then the frame
/// is drawn again with [`redraw`].
pub fn resize(frame: Frame<'_>, old_width: u16, new_width: u16, acc: &mut String) {
    let old_width_usize = usize::from(old_width).max(1);
    let cursor_row = position(frame.cursor(), old_width_usize).row;
    let end_row = position(frame.len(), old_width_usize).row;

    acc.push('\r');
    if end_row > cursor_row {
        queue(acc, MoveDown(to_u16(end_row - cursor_row)));
    }
    for _ in 0..end_row {
        queue(acc, Clear(ClearType::UntilNewLine));
        queue(acc, MoveUp(1));
    }
    queue(acc, Clear(ClearType::UntilNewLine));
    redraw(frame, new_width, acc);
}

/// Clear the screen and home the cursor.
pub fn clear_screen(acc: &mut String) {
    queue(acc, Clear(ClearType::All));
    queue(acc, MoveTo(0, 0));
}

/// Move the cursor from `at` to the end of `frame`, e.g. before printing a newline after
/// the line.
pub fn move_to_end(frame: Frame<'_>, width: u16, acc: &mut String) {
    let width = usize::from(width).max(1);
    let mut at = position(frame.cursor(), width);
    move_to(&mut at, position(frame.len(), width), acc);
}

fn end_of_write(end: usize, width: usize, acc: &mut String) -> Point {
    if end % width == 0 {
        acc.push_str(" \r");
    }
    position(end, width)
}

fn move_to(at: &mut Point, target: Point, acc: &mut String) {
    match target.row.cmp(&at.row) {
        Ordering::Less => queue(acc, MoveUp(to_u16(at.row - target.row))),
        Ordering::Greater => queue(acc, MoveDown(to_u16(target.row - at.row))),
        Ordering::Equal => {}
    }
    match target.col.cmp(&at.col) {
        Ordering::Equal => {}
        _ if target.col == 0 => acc.push('\r'),
        Ordering::Greater => queue(acc, MoveRight(to_u16(target.col - at.col))),
        Ordering::Less => queue(acc, MoveLeft(to_u16(at.col - target.col))),
    }
    *at = target;
}

fn queue(acc: &mut String, command: impl Command) {
    // Writing into a String can't fail.
    command.write_ansi(acc).ok();
}

fn to_u16(value: usize) -> u16 { u16::try_from(value).unwrap_or(u16::MAX) }

fn common_prefix(lhs: &[char], rhs: &[char]) -> usize {
    lhs.iter().zip(rhs).take_while(|(a, b)| a == b).count()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_fixtures::TestTerminal;

    /// Render `old` on a fresh terminal, apply `update(old, new)`, and check the screen
    /// against a from-scratch render of `new`.
    fn assert_update(prompt: &str, old: &LineBuffer, new: &LineBuffer, width: u16) {
        let prompt = Prompt::new(prompt);
        let mut acc = String::new();
        redraw(Frame::new(&prompt, old), width, &mut acc);
        update(Frame::new(&prompt, old), Frame::new(&prompt, new), width, &mut acc);
        let mut actual = TestTerminal::new(width);
        actual.write_str(&acc);

        let mut acc = String::new();
        redraw(Frame::new(&prompt, new), width, &mut acc);
        let mut expected = TestTerminal::new(width);
        expected.write_str(&acc);

        assert_eq!(actual.screen_lines(), expected.screen_lines());
        assert_eq!(actual.cursor(), expected.cursor());
    }

    fn buffer(text: &str, cursor: usize) -> LineBuffer {
        let mut it = LineBuffer::from(text);
        it.set_cursor(cursor);
        it
    }

    #[test]
    fn test_prompt_width_ignores_ansi() {
        let prompt = Prompt::new("\x1b[1;32m$\x1b[0m ");
        assert_eq!(prompt.width(), 2);
    }

    #[test]
    fn test_end_position_of_wrapped_line() {
        let prompt = Prompt::new("% ");
        let buffer = LineBuffer::from("xxxxxxxxxxxx");
        let frame = Frame::new(&prompt, &buffer);
        assert_eq!(frame.end_position(10), Point { row: 1, col: 4 });
        assert_eq!(frame.cursor_position(10), Point { row: 1, col: 4 });
    }

    #[test]
    fn test_update_with_itself_emits_nothing() {
        let prompt = Prompt::new("% ");
        for (text, cursor) in [("", 0), ("hello", 2), ("xxxxxxxxxxxxxxxxxx", 18)] {
            let buffer = buffer(text, cursor);
            let mut acc = String::new();
            update(
                Frame::new(&prompt, &buffer),
                Frame::new(&prompt, &buffer),
                10,
                &mut acc,
            );
            assert_eq!(acc, "");
        }
    }

    #[test]
    fn test_append_writes_only_the_new_text() {
        let prompt = Prompt::new("% ");
        let mut acc = String::new();
        update(
            Frame::new(&prompt, &buffer("ab", 2)),
            Frame::new(&prompt, &buffer("abc", 3)),
            40,
            &mut acc,
        );
        assert_eq!(acc, "c");
    }

    #[test]
    fn test_backspace_at_end() {
        let prompt = Prompt::new("");
        let mut acc = String::new();
        update(
            Frame::new(&prompt, &buffer("foob", 4)),
            Frame::new(&prompt, &buffer("foo", 3)),
            40,
            &mut acc,
        );
        assert_eq!(acc, "\x1b[1D\x1b[K");
    }

    #[test]
    fn test_cursor_motion_only() {
        let prompt = Prompt::new("% ");
        let mut acc = String::new();
        update(
            Frame::new(&prompt, &buffer("abc", 3)),
            Frame::new(&prompt, &buffer("abc", 1)),
            40,
            &mut acc,
        );
        assert_eq!(acc, "\x1b[2D");
    }

    #[test]
    fn test_updates_match_full_redraw() {
        assert_update("% ", &buffer("hello", 5), &buffer("help", 4), 10);
        assert_update("% ", &buffer("abc", 1), &buffer("aXbc", 2), 10);
        assert_update("% ", &buffer("xxxxxxxxxxxxxxxxxxxx", 20), &buffer("xx", 2), 10);
        assert_update("% ", &buffer("xxxxxxx", 7), &buffer("xxxxxxxx", 8), 10);
        assert_update("% ", &buffer("xxxxxxxx", 8), &buffer("xxxxxxxxx", 9), 10);
        assert_update("% ", &buffer("12345678901234", 3), &buffer("1234", 0), 10);
        assert_update("% ", &buffer("", 0), &buffer("0123456789abcdefghij", 5), 10);
        assert_update("", &buffer("0123456789", 10), &buffer("012345678", 9), 10);
    }

    #[test]
    fn test_prompt_change_rewrites_line() {
        let old_prompt = Prompt::new("% ");
        let new_prompt = Prompt::new("(reverse-i-search) `a': ");
        let old = buffer("abc", 3);
        let new = buffer("asdf", 0);

        let mut acc = String::new();
        redraw(Frame::new(&old_prompt, &old), 20, &mut acc);
        update(
            Frame::new(&old_prompt, &old),
            Frame::new(&new_prompt, &new),
            20,
            &mut acc,
        );
        let mut terminal = TestTerminal::new(20);
        terminal.write_str(&acc);
        assert_eq!(
            terminal.screen_lines(),
            vec!["(reverse-i-search) `".to_string(), "a': asdf".to_string()]
        );
        assert_eq!(terminal.cursor(), (1, 4));
    }

    #[test]
    fn test_redraw_at_row_boundary_places_cursor_on_next_row() {
        let prompt = Prompt::new("% ");
        let buffer = buffer("xxxxxxxx", 8);
        let mut acc = String::new();
        redraw(Frame::new(&prompt, &buffer), 10, &mut acc);
        let mut terminal = TestTerminal::new(10);
        terminal.write_str(&acc);
        assert_eq!(terminal.cursor(), (1, 0));
        assert_eq!(terminal.screen_lines(), vec!["% xxxxxxxx".to_string()]);
    }

    #[test]
    fn test_prompt_width_counts_code_points() {
        let prompt = Prompt::new("\u{3bb}> ");
        assert_eq!(prompt.width(), 3);
    }

    #[test]
    fn test_resize_to_wider_terminal() {
        let prompt = Prompt::new("% ");
        let buffer = buffer("xxxxxxxxxxxx", 12);
        let mut acc = String::new();
        redraw(Frame::new(&prompt, &buffer), 10, &mut acc);
        let mut terminal = TestTerminal::new(10);
        terminal.write_str(&acc);
        assert_eq!(
            terminal.screen_lines(),
            vec!["% xxxxxxxx".to_string(), "xxxx".to_string()]
        );

        terminal.set_width(20);
        let mut acc = String::new();
        resize(Frame::new(&prompt, &buffer), 10, 20, &mut acc);
        terminal.write_str(&acc);
        assert_eq!(terminal.screen_lines(), vec!["% xxxxxxxxxxxx".to_string()]);
        assert_eq!(terminal.cursor(), (0, 14));
    }

    #[test]
    fn test_resize_with_cursor_on_first_row() {
        let prompt = Prompt::new("% ");
        let buffer = buffer("xxxxxxxxxxxx", 1);
        let mut acc = String::new();
        redraw(Frame::new(&prompt, &buffer), 10, &mut acc);
        let mut terminal = TestTerminal::new(10);
        terminal.write_str(&acc);
        assert_eq!(terminal.cursor(), (0, 3));

        terminal.set_width(20);
        let mut acc = String::new();
        resize(Frame::new(&prompt, &buffer), 10, 20, &mut acc);
        terminal.write_str(&acc);
        assert_eq!(terminal.screen_lines(), vec!["% xxxxxxxxxxxx".to_string()]);
        assert_eq!(terminal.cursor(), (0, 3));
    }

    #[test]
    fn test_resize_to_narrower_terminal() {
        let prompt = Prompt::new("% ");
        let buffer = buffer("xxxxxxxxxxxx", 12);
        let mut acc = String::new();
        redraw(Frame::new(&prompt, &buffer), 20, &mut acc);
        let mut terminal = TestTerminal::new(20);
        terminal.write_str(&acc);
        assert_eq!(terminal.screen_lines(), vec!["% xxxxxxxxxxxx".to_string()]);

        terminal.set_width(10);
        let mut acc = String::new();
        resize(Frame::new(&prompt, &buffer), 20, 10, &mut acc);
        terminal.write_str(&acc);
        assert_eq!(
            terminal.screen_lines(),
            vec!["% xxxxxxxx".to_string(), "xxxx".to_string()]
        );
        assert_eq!(terminal.cursor(), (1, 4));
    }
}
