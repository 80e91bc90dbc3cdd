// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::Display;

use crate::{Action, ActionContext, ActionKind, KeyEvent, ViStatus, kill_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ViOperation {
    Delete,
    Change,
}

/// Vi `d` and `c`. Waits for a motion, then cuts the text it covers. Doubling the
/// operator (`dd`, `cc`) covers the whole line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViOperator {
    operation: ViOperation,
    /// `None` until the motion key arrives.
    motion: Option<Option<ActionKind>>,
}

impl ViOperator {
    #[must_use]
    pub fn new(operation: ViOperation) -> Self {
        Self {
            operation,
            motion: None,
        }
    }

    fn own_kind(&self) -> ActionKind {
        match self.operation {
            ViOperation::Delete => ActionKind::ViDeleteOperator,
            ViOperation::Change => ActionKind::ViChangeOperator,
        }
    }
}

impl Action for ViOperator {
    fn kind(&self) -> ActionKind { self.own_kind() }

    fn input(&mut self, bound: Option<ActionKind>, _event: &KeyEvent) { self.motion = Some(bound); }

    fn keep_focus(&self) -> bool { self.motion.is_none() }

    fn apply(&mut self, cx: &mut ActionContext<'_>) {
        let Some(motion) = self.motion else {
            cx.interaction.resume();
            return;
        };

        let buffer = cx.interaction.buffer();
        let cursor = buffer.cursor();
        let len = buffer.len();
        let range = match motion {
            Some(kind) if kind == self.own_kind() => Some(0..len),
            Some(ActionKind::ViForwardWord) => Some(cursor..buffer.next_word_start(cursor)),
            Some(ActionKind::ForwardWord) => Some(cursor..buffer.next_word_end(cursor)),
            Some(ActionKind::BackwardWord) => Some(buffer.previous_word_start(cursor)..cursor),
            Some(ActionKind::EndOfLine) => Some(cursor..len),
            Some(ActionKind::BeginningOfLine) => Some(0..cursor),
            Some(ActionKind::BackwardChar) => Some(cursor.saturating_sub(1)..cursor),
            Some(ActionKind::ForwardChar) => Some(cursor..(cursor + 1).min(len)),
            _ => None,
        };

        match range {
            Some(range) => {
                tracing::debug!(operation = %self.operation, ?range, "vi operator");
                kill_range(cx, range);
                if self.operation == ViOperation::Change {
                    cx.edit_mode.set_vi_status(ViStatus::Insert);
                }
            }
            None => cx.interaction.bell(),
        }
        cx.interaction.resume();
    }
}
