// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::LineBuffer;

pub const UNDO_SIZE_MAX: usize = 50;

/// A full snapshot of the buffer, taken before a destructive edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoAction {
    pub cursor: usize,
    pub buffer: String,
}

impl UndoAction {
    #[must_use]
    pub fn snapshot(buffer: &LineBuffer) -> Self {
        Self {
            cursor: buffer.cursor(),
            buffer: buffer.text(),
        }
    }

    /// Rebuild the buffer exactly as it was.
    #[must_use]
    pub fn restore(&self) -> LineBuffer {
        let mut it = LineBuffer::from(self.buffer.as_str());
        it.set_cursor(self.cursor);
        it
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoManager {
    stack: Vec<UndoAction>,
    max_size: usize,
}

impl Default for UndoManager {
    fn default() -> Self { Self::new(UNDO_SIZE_MAX) }
}

impl UndoManager {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            stack: vec![],
            max_size: max_size.max(1),
        }
    }

    /// The oldest snapshot is dropped once the stack is full.
    pub fn push(&mut self, action: UndoAction) {
        if self.stack.last() == Some(&action) {
            return;
        }
        self.stack.push(action);
        if self.stack.len() > self.max_size {
            self.stack.remove(0);
        }
    }

    pub fn pop(&mut self) -> Option<UndoAction> { self.stack.pop() }

    pub fn clear(&mut self) { self.stack.clear(); }

    #[must_use]
    pub fn len(&self) -> usize { self.stack.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.stack.is_empty() }
}
