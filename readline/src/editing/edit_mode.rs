// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::collections::HashMap;

use strum_macros::{Display, EnumString};

use crate::{ActionKind, Key, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EditModeKind {
    #[default]
    Emacs,
    Vi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViStatus {
    #[default]
    Insert,
    Command,
}

/// A binding table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBindings {
    map: HashMap<KeyEvent, ActionKind>,
}

impl KeyBindings {
    pub fn bind(&mut self, event: impl Into<KeyEvent>, kind: ActionKind) {
        self.map.insert(event.into(), kind);
    }

    pub fn unbind(&mut self, event: impl Into<KeyEvent>) { self.map.remove(&event.into()); }

    #[must_use]
    pub fn lookup(&self, event: &KeyEvent) -> Option<ActionKind> { self.map.get(event).copied() }

    fn with(mut self, events: &[KeyEvent], kind: ActionKind) -> Self {
        for event in events {
            self.bind(*event, kind);
        }
        self
    }

    #[must_use]
    pub fn emacs() -> Self {
        use ActionKind as A;
        use Key as K;
        let k = KeyEvent::Key;
        Self::default()
            .with(&[k(K::CtrlA), k(K::Home)], A::BeginningOfLine)
            .with(&[k(K::CtrlE), k(K::End)], A::EndOfLine)
            .with(&[k(K::CtrlB), k(K::Left)], A::BackwardChar)
            .with(&[k(K::CtrlF), k(K::Right)], A::ForwardChar)
            .with(&[k(K::Enter), k(K::CtrlJ)], A::AcceptLine)
            .with(&[k(K::CtrlP), k(K::Up)], A::PreviousHistory)
            .with(&[k(K::CtrlN), k(K::Down)], A::NextHistory)
            .with(&[k(K::Backspace), k(K::CtrlH)], A::BackwardDeleteChar)
            .with(&[k(K::Delete), k(K::CtrlD)], A::DeleteChar)
            .with(&[k(K::CtrlR)], A::ReverseSearchHistory)
            .with(&[k(K::CtrlS)], A::ForwardSearchHistory)
            .with(&[k(K::CtrlG)], A::Interrupt)
            .with(&[k(K::Tab)], A::Complete)
            .with(&[k(K::CtrlUnderscore)], A::Undo)
            .with(&[k(K::CtrlY)], A::Yank)
            .with(&[k(K::CtrlK)], A::KillLine)
            .with(&[k(K::CtrlU)], A::BackwardKillLine)
            .with(&[k(K::CtrlW)], A::UnixWordRubout)
            .with(&[k(K::MetaD)], A::KillWord)
            .with(&[k(K::MetaF), k(K::CtrlRight)], A::ForwardWord)
            .with(&[k(K::MetaB), k(K::CtrlLeft)], A::BackwardWord)
            .with(&[k(K::MetaBackspace)], A::BackwardKillWord)
            .with(&[k(K::CtrlT)], A::TransposeChars)
            .with(&[k(K::CtrlL)], A::ClearScreen)
    }

    /// The Emacs table without its Meta chords, plus Escape to enter command state.
    #[must_use]
    pub fn vi_insert() -> Self {
        use ActionKind as A;
        use Key as K;
        let k = KeyEvent::Key;
        Self::default()
            .with(&[k(K::Escape)], A::ViCommandMode)
            .with(&[k(K::CtrlA), k(K::Home)], A::BeginningOfLine)
            .with(&[k(K::CtrlE), k(K::End)], A::EndOfLine)
            .with(&[k(K::CtrlB), k(K::Left)], A::BackwardChar)
            .with(&[k(K::CtrlF), k(K::Right)], A::ForwardChar)
            .with(&[k(K::Enter), k(K::CtrlJ)], A::AcceptLine)
            .with(&[k(K::CtrlP), k(K::Up)], A::PreviousHistory)
            .with(&[k(K::CtrlN), k(K::Down)], A::NextHistory)
            .with(&[k(K::Backspace), k(K::CtrlH)], A::BackwardDeleteChar)
            .with(&[k(K::Delete), k(K::CtrlD)], A::DeleteChar)
            .with(&[k(K::CtrlR)], A::ReverseSearchHistory)
            .with(&[k(K::CtrlS)], A::ForwardSearchHistory)
            .with(&[k(K::CtrlG)], A::Interrupt)
            .with(&[k(K::Tab)], A::Complete)
            .with(&[k(K::CtrlUnderscore)], A::Undo)
            .with(&[k(K::CtrlY)], A::Yank)
            .with(&[k(K::CtrlK)], A::KillLine)
            .with(&[k(K::CtrlU)], A::BackwardKillLine)
            .with(&[k(K::CtrlW)], A::UnixWordRubout)
            .with(&[k(K::CtrlRight)], A::ForwardWord)
            .with(&[k(K::CtrlLeft)], A::BackwardWord)
            .with(&[k(K::CtrlT)], A::TransposeChars)
            .with(&[k(K::CtrlL)], A::ClearScreen)
    }

    #[must_use]
    pub fn vi_command() -> Self {
        use ActionKind as A;
        use Key as K;
        let k = KeyEvent::Key;
        let c = KeyEvent::Char;
        Self::default()
            .with(&[c('h'), k(K::Left), k(K::Backspace)], A::BackwardChar)
            .with(&[c('l'), c(' '), k(K::Right)], A::ForwardChar)
            .with(&[c('0'), c('^'), k(K::Home)], A::BeginningOfLine)
            .with(&[c('$'), k(K::End)], A::EndOfLine)
            .with(&[c('w')], A::ViForwardWord)
            .with(&[c('b')], A::BackwardWord)
            .with(&[c('e')], A::ForwardWord)
            .with(&[c('i'), k(K::Insert)], A::ViInsert)
            .with(&[c('a')], A::ViAppend)
            .with(&[c('I')], A::ViInsertBol)
            .with(&[c('A')], A::ViAppendEol)
            .with(&[c('x'), k(K::Delete)], A::DeleteChar)
            .with(&[c('X')], A::BackwardDeleteChar)
            .with(&[c('D')], A::KillLine)
            .with(&[c('C')], A::ViChangeToEnd)
            .with(&[c('d')], A::ViDeleteOperator)
            .with(&[c('c')], A::ViChangeOperator)
            .with(&[c('p')], A::ViPasteAfter)
            .with(&[c('P')], A::Yank)
            .with(&[c('u')], A::Undo)
            .with(&[c('k'), c('-'), k(K::Up)], A::PreviousHistory)
            .with(&[c('j'), c('+'), k(K::Down)], A::NextHistory)
            .with(&[c('/'), k(K::CtrlR)], A::ReverseSearchHistory)
            .with(&[c('?')], A::ForwardSearchHistory)
            .with(&[k(K::Enter), k(K::CtrlJ)], A::AcceptLine)
            .with(&[k(K::CtrlG)], A::Interrupt)
            .with(&[k(K::CtrlL)], A::ClearScreen)
    }
}

/// The active key map, plus the insert / command state when in Vi mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditMode {
    kind: EditModeKind,
    vi_status: ViStatus,
    /// Emacs table, or the Vi insert table.
    bindings: KeyBindings,
    /// Vi command table. Empty in Emacs mode.
    command_bindings: KeyBindings,
}

impl Default for EditMode {
    fn default() -> Self { Self::new(EditModeKind::default()) }
}

impl EditMode {
    #[must_use]
    pub fn new(kind: EditModeKind) -> Self {
        match kind {
            EditModeKind::Emacs => Self {
                kind,
                vi_status: ViStatus::Insert,
                bindings: KeyBindings::emacs(),
                command_bindings: KeyBindings::default(),
            },
            EditModeKind::Vi => Self {
                kind,
                vi_status: ViStatus::Insert,
                bindings: KeyBindings::vi_insert(),
                command_bindings: KeyBindings::vi_command(),
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> EditModeKind { self.kind }

    #[must_use]
    pub fn vi_status(&self) -> ViStatus { self.vi_status }

    pub fn set_vi_status(&mut self, vi_status: ViStatus) {
        if self.kind == EditModeKind::Vi {
            tracing::trace!(?vi_status, "vi status");
            self.vi_status = vi_status;
        }
    }

    #[must_use]
    pub fn is_vi_command(&self) -> bool {
        self.kind == EditModeKind::Vi && self.vi_status == ViStatus::Command
    }

    /// Back to the state a new line starts in.
    pub fn reset(&mut self) { self.vi_status = ViStatus::Insert; }

    fn active(&self) -> &KeyBindings {
        if self.is_vi_command() {
            &self.command_bindings
        } else {
            &self.bindings
        }
    }

    fn active_mut(&mut self) -> &mut KeyBindings {
        if self.is_vi_command() {
            &mut self.command_bindings
        } else {
            &mut self.bindings
        }
    }

    #[must_use]
    pub fn lookup(&self, event: &KeyEvent) -> Option<ActionKind> { self.active().lookup(event) }

    /// Bind in the active table.
    pub fn bind(&mut self, event: impl Into<KeyEvent>, kind: ActionKind) {
        self.active_mut().bind(event, kind);
    }

    /// Whether the decoder should read this key's sequences as one event.
    #[must_use]
    pub fn recognizes(&self, key: Key) -> bool {
        match self.kind {
            EditModeKind::Emacs => true,
            EditModeKind::Vi => !key.is_meta(),
        }
    }

    /// Whether an unbound printable key is inserted into the line.
    #[must_use]
    pub fn accepts_insertion(&self) -> bool { !self.is_vi_command() }
}
