// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::Debug;

use strum_macros::Display;

// Attach.
pub mod in_memory_history;

// Re-export.
pub use in_memory_history::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SearchDirection {
    /// Toward older entries.
    #[default]
    Reverse,
    /// Toward newer entries.
    Forward,
}

/// Accepted lines, oldest first, with two independent cursors: one for stepping through
/// entries with previous / next, and one for substring search.
///
/// Persistence is up to the implementation. [`InMemoryHistory`] keeps nothing on disk.
pub trait History: Debug {
    fn push(&mut self, entry: String);

    fn get(&self, index: usize) -> Option<&str>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool { self.len() == 0 }

    fn clear(&mut self);

    /// Step toward older entries. `None` once the oldest entry has been returned.
    fn previous_fetch(&mut self) -> Option<String>;

    /// Step toward newer entries. `None` past the newest entry.
    fn next_fetch(&mut self) -> Option<String>;

    /// Put the fetch cursor past the newest entry.
    fn reset_fetch(&mut self);

    fn search_direction(&self) -> SearchDirection;

    fn set_search_direction(&mut self, direction: SearchDirection);

    /// Find the nearest entry containing `query`, starting at the current search position
    /// and moving in the search direction. The current position is included, so typing
    /// more of a query that still matches keeps the same entry.
    fn search(&mut self, query: &str) -> Option<String>;

    /// Like [`History::search`] but skips the current match. When nothing is found the
    /// search position is left alone.
    fn search_again(&mut self, query: &str) -> Option<String>;

    /// Forget the search position and direction.
    fn reset_search(&mut self);
}
