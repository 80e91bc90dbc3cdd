// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::Debug;

use crate::{ActionContext, LineBuffer, UndoAction};

/// Whether a [`CompletionHandler`] finished its work before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteOutcome {
    Completed,
    /// The handler kept working in the background. The interaction stays paused, and
    /// input stays queued, until [`crate::Readline::resume`] is called.
    Deferred,
}

/// Plugged into an interaction with [`crate::Readline::readline_with_completion`] and run
/// by the `complete` action (Tab in every default key map).
///
/// When there are many candidates a handler can set the ask flag. The next key is then
/// treated as the answer: `y` calls [`CompletionHandler::complete`] again, anything else
/// cancels.
pub trait CompletionHandler: Debug {
    fn complete(&mut self, cx: &mut ActionContext<'_>) -> CompleteOutcome;

    fn ask_display_completion(&self) -> bool;

    fn set_ask_display_completion(&mut self, ask: bool);
}

/// Source of candidates for the word before the cursor.
pub trait Completer {
    fn candidates(&self, word: &str) -> Vec<String>;
}

impl<F> Completer for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn candidates(&self, word: &str) -> Vec<String> { self(word) }
}

/// Completes from a fixed list of words.
#[derive(Debug, Clone, Default)]
pub struct WordListCompleter {
    words: Vec<String>,
}

impl WordListCompleter {
    pub fn new<S: Into<String>>(words: impl IntoIterator<Item = S>) -> Self {
        let mut words: Vec<String> = words.into_iter().map(Into::into).collect();
        words.sort();
        words.dedup();
        Self { words }
    }
}

impl Completer for WordListCompleter {
    fn candidates(&self, word: &str) -> Vec<String> {
        self.words
            .iter()
            .filter(|it| it.starts_with(word))
            .cloned()
            .collect()
    }
}

/// Readline style completion over a [`Completer`]:
///
/// - no candidate rings the bell,
/// - one candidate replaces the word and adds a space,
/// - several candidates extend the word to their longest common prefix, or list them
///   below the line when there is nothing to extend. Past
///   [`crate::ReadlineConfig::completion_query_items`] the user is asked first.
pub struct CandidateCompletionHandler {
    completer: Box<dyn Completer>,
    ask: bool,
    pending: Vec<String>,
}

impl Debug for CandidateCompletionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateCompletionHandler")
            .field("ask", &self.ask)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl CandidateCompletionHandler {
    pub fn new(completer: impl Completer + 'static) -> Self {
        Self {
            completer: Box::new(completer),
            ask: false,
            pending: Vec::new(),
        }
    }

    fn replace_word(cx: &mut ActionContext<'_>, word_start: usize, replacement: &str) {
        let buffer = cx.interaction.buffer();
        let mut update = buffer.clone();
        update.delete_range(word_start..buffer.cursor());
        if update.insert_str(replacement).is_err() {
            cx.interaction.bell();
            return;
        }
        cx.undo_manager.push(UndoAction::snapshot(buffer));
        cx.interaction.refresh(update);
    }

    /// Writes the candidates and draws the prompt again below them. The cursor must be at
    /// the start of an empty row.
    fn print_candidates(cx: &mut ActionContext<'_>, candidates: &[String]) {
        cx.interaction.write(&format!("{}\n", candidates.join("  ")));
        cx.interaction.redraw();
    }
}

impl CompletionHandler for CandidateCompletionHandler {
    fn complete(&mut self, cx: &mut ActionContext<'_>) -> CompleteOutcome {
        if self.ask {
            self.ask = false;
            let candidates = std::mem::take(&mut self.pending);
            cx.interaction.write("\n");
            Self::print_candidates(cx, &candidates);
            return CompleteOutcome::Completed;
        }

        let buffer = cx.interaction.buffer();
        let word_start = word_start(buffer);
        let word: String = buffer.as_slice()[word_start..buffer.cursor()].iter().collect();
        let candidates = self.completer.candidates(&word);
        tracing::debug!(word = word.as_str(), candidates = candidates.len(), "complete");

        match candidates.as_slice() {
            [] => cx.interaction.bell(),
            [single] => Self::replace_word(cx, word_start, &format!("{single} ")),
            _ => {
                let prefix = common_prefix(&candidates);
                if prefix.chars().count() > word.chars().count() {
                    Self::replace_word(cx, word_start, &prefix);
                } else if candidates.len() > cx.config.completion_query_items {
                    cx.interaction.new_line();
                    cx.interaction.write(&format!(
                        "Display all {} possibilities? (y or n)",
                        candidates.len()
                    ));
                    self.pending = candidates;
                    self.ask = true;
                } else {
                    cx.interaction.new_line();
                    Self::print_candidates(cx, &candidates);
                }
            }
        }
        CompleteOutcome::Completed
    }

    fn ask_display_completion(&self) -> bool { self.ask }

    fn set_ask_display_completion(&mut self, ask: bool) {
        self.ask = ask;
        if !ask {
            self.pending.clear();
        }
    }
}

impl Default for CandidateCompletionHandler {
    fn default() -> Self { Self::new(WordListCompleter::default()) }
}

/// Start of the whitespace delimited word that ends at the cursor.
fn word_start(buffer: &LineBuffer) -> usize {
    let chars = buffer.as_slice();
    let mut start = buffer.cursor();
    while start > 0 && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    start
}

fn common_prefix(candidates: &[String]) -> String {
    let Some((first, rest)) = candidates.split_first() else {
        return String::new();
    };
    let mut prefix: Vec<char> = first.chars().collect();
    for candidate in rest {
        let shared = prefix
            .iter()
            .zip(candidate.chars())
            .take_while(|(lhs, rhs)| *lhs == rhs)
            .count();
        prefix.truncate(shared);
    }
    prefix.into_iter().collect()
}
