// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Action, ActionContext, ActionKind, Key, KeyEvent, LineBuffer, Prompt,
            SearchDirection, ViStatus};

/// What the last key asked the search to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    NotStarted,
    /// A character was added to the query.
    Input,
    /// Search toward older entries.
    Prev,
    /// Search toward newer entries.
    Next,
    /// The last character of the query was removed.
    Delete,
    /// Take the result and accept it.
    End,
    /// Take the result and keep editing.
    Exit,
    /// Abandon the search with an empty line.
    Interrupt,
    /// Take the entry before the result.
    MovePrev,
    /// Take the entry after the result.
    MoveNext,
    /// Take the result with the cursor at its end.
    MoveRight,
}

/// Incremental history search (`Ctrl-R` / `Ctrl-S`).
///
/// Holds focus while the user types a query. The prompt becomes
/// ``(reverse-i-search) `query': `` followed by the matching entry, with the cursor on the
/// match. Most keys that are bound to something else end the search and keep the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistory {
    direction: SearchDirection,
    status: SearchStatus,
    query: String,
    result: Option<String>,
}

impl SearchHistory {
    #[must_use]
    pub fn new(direction: SearchDirection) -> Self {
        Self {
            direction,
            status: SearchStatus::NotStarted,
            query: String::new(),
            result: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> SearchStatus { self.status }

    #[must_use]
    pub fn query(&self) -> &str { &self.query }

    #[must_use]
    pub fn result(&self) -> Option<&str> { self.result.as_deref() }

    fn result_buffer(&self) -> LineBuffer {
        LineBuffer::from(self.result.as_deref().unwrap_or_default())
    }

    fn search_prompt(&self) -> Prompt {
        let label = match self.direction {
            SearchDirection::Reverse => "reverse",
            SearchDirection::Forward => "forward",
        };
        Prompt::new(format!("({label}-i-search) `{}': ", self.query))
    }

    fn print_search(&self, cx: &mut ActionContext<'_>) {
        let mut buffer = self.result_buffer();
        let result = self.result.as_deref().unwrap_or_default();
        if let Some(byte_index) = result.find(&self.query) {
            buffer.set_cursor(result[..byte_index].chars().count());
        }
        cx.interaction
            .refresh_with_prompt(self.search_prompt(), buffer);
    }

    fn step(&mut self, cx: &mut ActionContext<'_>, direction: SearchDirection) {
        if !self.query.is_empty() {
            let found = if cx.history.search_direction() == direction {
                cx.history.search_again(&self.query)
            } else {
                cx.history.set_search_direction(direction);
                cx.history.search(&self.query)
            };
            match found {
                Some(result) => self.result = Some(result),
                None => cx.interaction.bell(),
            }
        }
        self.direction = direction;
    }
}

impl Action for SearchHistory {
    fn kind(&self) -> ActionKind {
        match self.direction {
            SearchDirection::Reverse => ActionKind::ReverseSearchHistory,
            SearchDirection::Forward => ActionKind::ForwardSearchHistory,
        }
    }

    fn input(&mut self, bound: Option<ActionKind>, event: &KeyEvent) {
        self.status = if event.is_key(Key::Escape) {
            SearchStatus::Exit
        } else {
            match bound {
                Some(ActionKind::Interrupt) => SearchStatus::Interrupt,
                Some(ActionKind::AcceptLine) => SearchStatus::End,
                Some(ActionKind::ReverseSearchHistory) => SearchStatus::Prev,
                Some(ActionKind::ForwardSearchHistory) => SearchStatus::Next,
                Some(ActionKind::BackwardDeleteChar) => SearchStatus::Delete,
                Some(ActionKind::PreviousHistory) => SearchStatus::MovePrev,
                Some(ActionKind::NextHistory) => SearchStatus::MoveNext,
                Some(ActionKind::ForwardChar) => SearchStatus::MoveRight,
                Some(_) => SearchStatus::Exit,
                None => match event {
                    KeyEvent::Char(code_point) if event.is_printable() => {
                        self.query.push(*code_point);
                        SearchStatus::Input
                    }
                    _ => SearchStatus::Exit,
                },
            }
        };
    }

    fn keep_focus(&self) -> bool {
        matches!(
            self.status,
            SearchStatus::Input
                | SearchStatus::Prev
                | SearchStatus::Next
                | SearchStatus::Delete
        )
    }

    fn apply(&mut self, cx: &mut ActionContext<'_>) {
        match self.status {
            SearchStatus::NotStarted => {
                cx.history.reset_search();
                cx.history.set_search_direction(self.direction);
                if cx.edit_mode.is_vi_command() {
                    cx.edit_mode.set_vi_status(ViStatus::Insert);
                }
                let text = cx.interaction.buffer().text();
                if !text.is_empty() {
                    self.result = cx.history.search(&text);
                    self.query = text;
                }
                self.status = SearchStatus::Input;
            }
            SearchStatus::Input => match cx.history.search(&self.query) {
                Some(result) => self.result = Some(result),
                None => {
                    self.query.pop();
                    cx.interaction.bell();
                }
            },
            SearchStatus::Prev => self.step(cx, SearchDirection::Reverse),
            SearchStatus::Next => self.step(cx, SearchDirection::Forward),
            SearchStatus::Delete => {
                self.query.pop();
                if self.query.is_empty() {
                    self.result = None;
                    cx.history.reset_search();
                    cx.history.set_search_direction(self.direction);
                } else if let Some(result) = cx.history.search(&self.query) {
                    self.result = Some(result);
                }
            }
            SearchStatus::End => {
                cx.interaction.refresh(self.result_buffer());
                if self.result.is_some() {
                    cx.queue_event(Key::Enter.code_points());
                }
            }
            SearchStatus::Exit | SearchStatus::MoveRight => {
                cx.interaction.refresh(self.result_buffer());
            }
            SearchStatus::Interrupt => cx.interaction.refresh(LineBuffer::new()),
            SearchStatus::MovePrev => {
                let update = match cx.history.previous_fetch() {
                    Some(entry) => LineBuffer::from(entry.as_str()),
                    None => self.result_buffer(),
                };
                cx.interaction.refresh(update);
            }
            SearchStatus::MoveNext => {
                let update = match cx.history.next_fetch() {
                    Some(entry) => LineBuffer::from(entry.as_str()),
                    None => self.result_buffer(),
                };
                cx.interaction.refresh(update);
            }
        }

        if self.keep_focus() {
            self.print_search(cx);
        } else {
            tracing::debug!(status = ?self.status, query = self.query.as_str(), "search done");
            cx.history.reset_search();
        }
        cx.interaction.resume();
    }
}
