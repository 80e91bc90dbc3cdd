// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::Debug;

use crate::{ActionContext, ActionKind, KeyEvent, SearchDirection};

// Attach.
pub mod accept_line;
pub mod basic;
pub mod complete;
pub mod search_history;
pub mod vi_operator;

// Re-export.
pub use accept_line::*;
pub use basic::*;
pub use complete::*;
pub use search_history::*;
pub use vi_operator::*;

/// Something a key binding does to the active [`crate::Interaction`].
///
/// Simple actions finish in one [`Action::apply`]. An action that needs more keys (search,
/// the completion prompt, vi operators) returns `true` from [`Action::keep_focus`]: the
/// engine then hands it every following key through [`Action::input`] and applies it again,
/// until it lets go.
///
/// The engine pauses the interaction before `apply`. An action calls
/// [`crate::Interaction::resume`] when it is done, or leaves that to
/// [`crate::Readline::resume`] when it finishes in the background.
pub trait Action: Debug {
    fn kind(&self) -> ActionKind;

    fn name(&self) -> &'static str { self.kind().name() }

    fn apply(&mut self, cx: &mut ActionContext<'_>);

    /// The next key while this action has focus, along with what it is bound to.
    fn input(&mut self, _bound: Option<ActionKind>, _event: &KeyEvent) {}

    fn keep_focus(&self) -> bool { false }
}

/// Instantiate the action for a binding.
#[must_use]
pub fn create_action(kind: ActionKind) -> Box<dyn Action> {
    match kind {
        ActionKind::AcceptLine => Box::new(AcceptLine),
        ActionKind::ReverseSearchHistory => {
            Box::new(SearchHistory::new(SearchDirection::Reverse))
        }
        ActionKind::ForwardSearchHistory => {
            Box::new(SearchHistory::new(SearchDirection::Forward))
        }
        ActionKind::Complete => Box::new(Complete::default()),
        ActionKind::ViDeleteOperator => Box::new(ViOperator::new(ViOperation::Delete)),
        ActionKind::ViChangeOperator => Box::new(ViOperator::new(ViOperation::Change)),
        other => Box::new(BasicAction(other)),
    }
}
