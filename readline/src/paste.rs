// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::collections::VecDeque;

pub const PASTE_SIZE_MAX: usize = 10;

/// The kill ring. Killed text goes in, yank takes the newest entry back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteManager {
    /// Newest first.
    ring: VecDeque<String>,
    max_size: usize,
}

impl Default for PasteManager {
    fn default() -> Self { Self::new(PASTE_SIZE_MAX) }
}

impl PasteManager {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            ring: VecDeque::new(),
            max_size: max_size.max(1),
        }
    }

    pub fn add_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.ring.push_front(text);
        self.ring.truncate(self.max_size);
    }

    /// `0` is the newest entry.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> { self.ring.get(index).map(String::as_str) }

    #[must_use]
    pub fn newest(&self) -> Option<&str> { self.get(0) }

    #[must_use]
    pub fn len(&self) -> usize { self.ring.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.ring.is_empty() }
}
