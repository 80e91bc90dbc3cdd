// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Every action a key can be bound to. The names follow GNU readline where one exists.
///
/// Stateful actions (search, completion, vi operators) look at the kind of the next key
/// they receive, so this tag is all they need to know about other actions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ActionKind {
    AcceptLine,
    BackwardChar,
    ForwardChar,
    BeginningOfLine,
    EndOfLine,
    BackwardWord,
    ForwardWord,
    ViForwardWord,
    BackwardDeleteChar,
    DeleteChar,
    KillLine,
    BackwardKillLine,
    KillWholeLine,
    KillWord,
    BackwardKillWord,
    UnixWordRubout,
    TransposeChars,
    Yank,
    ViPasteAfter,
    Undo,
    PreviousHistory,
    NextHistory,
    ReverseSearchHistory,
    ForwardSearchHistory,
    Complete,
    ClearScreen,
    Interrupt,
    ViCommandMode,
    ViInsert,
    ViAppend,
    ViInsertBol,
    ViAppendEol,
    ViChangeToEnd,
    ViDeleteOperator,
    ViChangeOperator,
}

impl ActionKind {
    #[must_use]
    pub fn name(self) -> &'static str { self.into() }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case(ActionKind::AcceptLine, "accept-line")]
    #[test_case(ActionKind::ReverseSearchHistory, "reverse-search-history")]
    #[test_case(ActionKind::ViDeleteOperator, "vi-delete-operator")]
    fn test_names(kind: ActionKind, name: &str) {
        assert_eq!(kind.name(), name);
        assert_eq!(kind.to_string(), name);
        assert_eq!(ActionKind::from_str(name).unwrap(), kind);
    }
}
