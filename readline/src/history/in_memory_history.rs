// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::collections::VecDeque;

use super::{History, SearchDirection};
use crate::HISTORY_SIZE_MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryHistory {
    entries: VecDeque<String>,
    max_size: usize,
    /// `entries.len()` means "past the newest entry".
    fetch_index: usize,
    /// Index of the last match.
    search_index: Option<usize>,
    direction: SearchDirection,
}

impl Default for InMemoryHistory {
    fn default() -> Self { Self::new(HISTORY_SIZE_MAX) }
}

impl InMemoryHistory {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size: max_size.max(1),
            fetch_index: 0,
            search_index: None,
            direction: SearchDirection::default(),
        }
    }

    /// Oldest first.
    pub fn with_entries<S: Into<String>>(
        max_size: usize,
        entries: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut it = Self::new(max_size);
        for entry in entries {
            it.push(entry.into());
        }
        it
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> { self.entries.iter().map(String::as_str) }

    fn found(&mut self, index: usize) -> Option<String> {
        self.search_index = Some(index);
        self.fetch_index = index;
        self.entries.get(index).cloned()
    }

    fn scan(&mut self, query: &str, start: usize) -> Option<String> {
        let matches = |entry: &String| entry.contains(query);
        let maybe_index = match self.direction {
            SearchDirection::Reverse => (0..=start).rev().find(|&it| matches(&self.entries[it])),
            SearchDirection::Forward => {
                (start..self.entries.len()).find(|&it| matches(&self.entries[it]))
            }
        };
        maybe_index.and_then(|index| self.found(index))
    }
}

impl History for InMemoryHistory {
    /// Blank lines and a repeat of the newest entry are not stored.
    fn push(&mut self, entry: String) {
        let is_repeat = self.entries.back() == Some(&entry);
        if !entry.trim().is_empty() && !is_repeat {
            self.entries.push_back(entry);
            if self.entries.len() > self.max_size {
                self.entries.pop_front();
            }
        }
        self.reset_fetch();
        self.reset_search();
    }

    fn get(&self, index: usize) -> Option<&str> { self.entries.get(index).map(String::as_str) }

    fn len(&self) -> usize { self.entries.len() }

    fn clear(&mut self) {
        self.entries.clear();
        self.reset_fetch();
        self.reset_search();
    }

    fn previous_fetch(&mut self) -> Option<String> {
        if self.fetch_index == 0 {
            return None;
        }
        self.fetch_index = self.fetch_index.min(self.entries.len()) - 1;
        self.entries.get(self.fetch_index).cloned()
    }

    fn next_fetch(&mut self) -> Option<String> {
        if self.fetch_index + 1 >= self.entries.len() {
            self.fetch_index = self.entries.len();
            return None;
        }
        self.fetch_index += 1;
        self.entries.get(self.fetch_index).cloned()
    }

    fn reset_fetch(&mut self) { self.fetch_index = self.entries.len(); }

    fn search_direction(&self) -> SearchDirection { self.direction }

    fn set_search_direction(&mut self, direction: SearchDirection) { self.direction = direction; }

    fn search(&mut self, query: &str) -> Option<String> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let start = match (self.search_index, self.direction) {
            (Some(index), _) => index.min(len - 1),
            (None, SearchDirection::Reverse) => len - 1,
            (None, SearchDirection::Forward) => 0,
        };
        self.scan(query, start)
    }

    fn search_again(&mut self, query: &str) -> Option<String> {
        let Some(index) = self.search_index else {
            return self.search(query);
        };
        let start = match self.direction {
            SearchDirection::Reverse => index.checked_sub(1)?,
            SearchDirection::Forward => {
                if index + 1 >= self.entries.len() {
                    return None;
                }
                index + 1
            }
        };
        self.scan(query, start)
    }

    fn reset_search(&mut self) {
        self.search_index = None;
        self.direction = SearchDirection::default();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_push_skips_blank_and_repeated_entries() {
        let mut history = InMemoryHistory::new(3);
        history.push("one".into());
        history.push("   ".into());
        history.push("one".into());
        history.push("two".into());
        history.push("three".into());
        history.push("four".into());
        assert_eq!(
            history.entries().collect::<Vec<_>>(),
            vec!["two", "three", "four"]
        );
    }

    #[test]
    fn test_fetch_is_bounded_at_both_ends() {
        let mut history = InMemoryHistory::with_entries(10, ["a", "b"]);
        assert_eq!(history.next_fetch(), None);
        assert_eq!(history.previous_fetch().as_deref(), Some("b"));
        assert_eq!(history.previous_fetch().as_deref(), Some("a"));
        assert_eq!(history.previous_fetch(), None);
        assert_eq!(history.next_fetch().as_deref(), Some("b"));
        assert_eq!(history.next_fetch(), None);
        assert_eq!(history.previous_fetch().as_deref(), Some("b"));
    }

    #[test]
    fn test_fetch_on_empty_history() {
        let mut history = InMemoryHistory::default();
        assert_eq!(history.previous_fetch(), None);
        assert_eq!(history.next_fetch(), None);
    }

    #[test]
    fn test_reverse_search_is_inclusive_then_steps() {
        let mut history =
            InMemoryHistory::with_entries(10, ["cargo build", "ls", "cargo test", "pwd"]);
        assert_eq!(history.search("cargo").as_deref(), Some("cargo test"));
        assert_eq!(history.search("cargo t").as_deref(), Some("cargo test"));
        assert_eq!(history.search_again("cargo").as_deref(), Some("cargo build"));
        assert_eq!(history.search_again("cargo"), None);
        assert_eq!(history.search("cargo").as_deref(), Some("cargo build"));
    }

    #[test]
    fn test_forward_search_after_reverse() {
        let mut history = InMemoryHistory::with_entries(10, ["x1", "y", "x2", "x3"]);
        assert_eq!(history.search("x").as_deref(), Some("x3"));
        assert_eq!(history.search_again("x").as_deref(), Some("x2"));
        assert_eq!(history.search_again("x").as_deref(), Some("x1"));
        history.set_search_direction(SearchDirection::Forward);
        assert_eq!(history.search_again("x").as_deref(), Some("x2"));
    }

    #[test]
    fn test_search_moves_fetch_cursor() {
        let mut history = InMemoryHistory::with_entries(10, ["asdf", "footing"]);
        assert_eq!(history.search("f").as_deref(), Some("footing"));
        assert_eq!(history.previous_fetch().as_deref(), Some("asdf"));

        history.reset_search();
        history.reset_fetch();
        assert_eq!(history.search("asdf").as_deref(), Some("asdf"));
        assert_eq!(history.next_fetch().as_deref(), Some("footing"));
    }

    #[test]
    fn test_search_is_deterministic() {
        let run = || {
            let mut history =
                InMemoryHistory::with_entries(10, ["asdf jkl", "footing", "fab"]);
            ["f", "fo", "foo"]
                .iter()
                .map(|query| history.search(query))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
        assert_eq!(run().last().cloned().flatten().as_deref(), Some("footing"));
    }
}
