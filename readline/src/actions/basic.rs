// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::ops::Range;

use crate::{Action, ActionContext, ActionKind, LineBuffer, UndoAction, ViStatus};

/// Every action that finishes in a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicAction(pub ActionKind);

impl Action for BasicAction {
    fn kind(&self) -> ActionKind { self.0 }

    fn apply(&mut self, cx: &mut ActionContext<'_>) {
        let buffer = cx.interaction.buffer();
        let cursor = buffer.cursor();
        let len = buffer.len();

        match self.0 {
            // Motion.
            ActionKind::BackwardChar => move_cursor(cx, |it| it.move_cursor(-1)),
            ActionKind::ForwardChar => move_cursor(cx, |it| it.move_cursor(1)),
            ActionKind::BeginningOfLine => move_cursor(cx, |it| it.set_cursor(0)),
            ActionKind::EndOfLine => move_cursor(cx, LineBuffer::move_to_end),
            ActionKind::BackwardWord => {
                move_cursor(cx, |it| it.set_cursor(it.previous_word_start(it.cursor())));
            }
            ActionKind::ForwardWord => {
                move_cursor(cx, |it| it.set_cursor(it.next_word_end(it.cursor())));
            }
            ActionKind::ViForwardWord => {
                move_cursor(cx, |it| it.set_cursor(it.next_word_start(it.cursor())));
            }

            // Deletion.
            ActionKind::BackwardDeleteChar => {
                if cursor == 0 {
                    cx.interaction.bell();
                } else {
                    kill_range(cx, cursor - 1..cursor);
                }
            }
            ActionKind::DeleteChar => {
                if cursor == len {
                    cx.interaction.bell();
                } else {
                    let mut update = buffer.clone();
                    update.delete(1);
                    apply_edit(cx, update);
                }
            }
            ActionKind::KillLine => {
                kill_range(cx, cursor..len);
            }
            ActionKind::BackwardKillLine => {
                kill_range(cx, 0..cursor);
            }
            ActionKind::KillWholeLine => {
                kill_range(cx, 0..len);
            }
            ActionKind::KillWord => {
                let end = buffer.next_word_end(cursor);
                kill_range(cx, cursor..end);
            }
            ActionKind::BackwardKillWord => {
                let start = buffer.previous_word_start(cursor);
                kill_range(cx, start..cursor);
            }
            ActionKind::UnixWordRubout => {
                let start = buffer.previous_whitespace_word_start(cursor);
                kill_range(cx, start..cursor);
            }

            // Editing.
            ActionKind::TransposeChars => {
                let mut update = buffer.clone();
                if update.transpose() {
                    apply_edit(cx, update);
                } else {
                    cx.interaction.bell();
                }
            }
            ActionKind::Yank => yank(cx, false),
            ActionKind::ViPasteAfter => yank(cx, true),
            ActionKind::Undo => match cx.undo_manager.pop() {
                Some(action) => cx.interaction.refresh(action.restore()),
                None => cx.interaction.bell(),
            },

            // History.
            ActionKind::PreviousHistory => {
                if let Some(entry) = cx.history.previous_fetch() {
                    cx.interaction.refresh(LineBuffer::from(entry.as_str()));
                }
            }
            ActionKind::NextHistory => {
                if let Some(entry) = cx.history.next_fetch() {
                    cx.interaction.refresh(LineBuffer::from(entry.as_str()));
                }
            }

            // Screen.
            ActionKind::ClearScreen => cx.interaction.clear_screen(),
            ActionKind::Interrupt => cx.interaction.bell(),

            // Vi mode switches.
            ActionKind::ViCommandMode => {
                cx.edit_mode.set_vi_status(ViStatus::Command);
                move_cursor(cx, |it| it.move_cursor(-1));
            }
            ActionKind::ViInsert => cx.edit_mode.set_vi_status(ViStatus::Insert),
            ActionKind::ViAppend => {
                cx.edit_mode.set_vi_status(ViStatus::Insert);
                move_cursor(cx, |it| it.move_cursor(1));
            }
            ActionKind::ViInsertBol => {
                cx.edit_mode.set_vi_status(ViStatus::Insert);
                move_cursor(cx, |it| it.set_cursor(0));
            }
            ActionKind::ViAppendEol => {
                cx.edit_mode.set_vi_status(ViStatus::Insert);
                move_cursor(cx, LineBuffer::move_to_end);
            }
            ActionKind::ViChangeToEnd => {
                kill_range(cx, cursor..len);
                cx.edit_mode.set_vi_status(ViStatus::Insert);
            }

            // These have their own types, see `create_action`.
            ActionKind::AcceptLine
            | ActionKind::ReverseSearchHistory
            | ActionKind::ForwardSearchHistory
            | ActionKind::Complete
            | ActionKind::ViDeleteOperator
            | ActionKind::ViChangeOperator => {
                tracing::warn!(action = self.0.name(), "not a basic action");
            }
        }

        cx.interaction.resume();
    }
}

fn move_cursor(cx: &mut ActionContext<'_>, f: impl FnOnce(&mut LineBuffer)) {
    let mut update = cx.interaction.buffer().clone();
    f(&mut update);
    cx.interaction.refresh(update);
}

/// Show `update` and remember the current buffer so the edit can be undone.
pub fn apply_edit(cx: &mut ActionContext<'_>, update: LineBuffer) {
    cx.undo_manager
        .push(UndoAction::snapshot(cx.interaction.buffer()));
    cx.interaction.refresh(update);
}

/// Cut `range` out of the buffer into the paste ring. Returns `false` when there was
/// nothing to cut.
pub fn kill_range(cx: &mut ActionContext<'_>, range: Range<usize>) -> bool {
    if range.is_empty() {
        return false;
    }
    let mut update = cx.interaction.buffer().clone();
    let removed = update.delete_range(range);
    cx.paste_manager.add_text(removed);
    apply_edit(cx, update);
    true
}

fn yank(cx: &mut ActionContext<'_>, after_cursor: bool) {
    let Some(text) = cx.paste_manager.newest().map(str::to_owned) else {
        cx.interaction.bell();
        return;
    };
    let mut update = cx.interaction.buffer().clone();
    if after_cursor && !update.is_empty() {
        update.move_cursor(1);
    }
    match update.insert_str(&text) {
        Ok(()) => apply_edit(cx, update),
        Err(err) => {
            tracing::debug!(%err, "yank rejected");
            cx.interaction.bell();
        }
    }
}
