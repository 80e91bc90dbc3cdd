// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Action, ActionContext, ActionKind, CompleteOutcome, KeyEvent};

/// Tab. Runs the interaction's [`crate::CompletionHandler`], and holds focus while the
/// handler waits for a yes / no answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Complete {
    answer: Option<KeyEvent>,
    asking: bool,
}

impl Action for Complete {
    fn kind(&self) -> ActionKind { ActionKind::Complete }

    fn input(&mut self, _bound: Option<ActionKind>, event: &KeyEvent) { self.answer = Some(*event); }

    fn keep_focus(&self) -> bool { self.asking }

    fn apply(&mut self, cx: &mut ActionContext<'_>) {
        let Some(mut handler) = cx.interaction.take_completion_handler() else {
            cx.interaction.bell();
            cx.interaction.resume();
            return;
        };

        let outcome = if handler.ask_display_completion() {
            match self.answer.take() {
                Some(KeyEvent::Char('y' | 'Y')) => handler.complete(cx),
                _ => {
                    handler.set_ask_display_completion(false);
                    cx.undo_manager.clear();
                    cx.interaction.write("\n");
                    cx.interaction.reset_display();
                    CompleteOutcome::Completed
                }
            }
        } else {
            handler.complete(cx)
        };

        self.asking = handler.ask_display_completion();
        cx.interaction.set_completion_handler(Some(handler));

        match outcome {
            CompleteOutcome::Completed => cx.interaction.resume(),
            CompleteOutcome::Deferred => tracing::debug!("completion deferred"),
        }
    }
}
