// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{any::Any, collections::HashMap, fmt::Debug, rc::Rc};

use crate::{Action, BellStyle, CompletionHandler, Connection, EditMode, EventQueue, Frame,
            HandlerGuard, History, LineBuffer, PasteManager, Prompt, ReadlineConfig,
            UndoManager, redraw};

/// Receives the accepted line, or `None` at end of file.
pub type LineCallback = Box<dyn FnOnce(Option<String>)>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Reading,
    Accepted(String),
    Eof,
}

/// One read line session.
///
/// It owns what is on screen: the prompt that was drawn, the buffer that follows it, and
/// where the cursor is. Every change to the buffer goes through
/// [`Interaction::refresh`], which writes the minimal update to the connection.
///
/// The `line` buffer accumulates continuation lines (after a trailing backslash or inside
/// an open quote) until the whole input is accepted.
pub struct Interaction {
    conn: Rc<dyn Connection>,
    prompt: Prompt,
    /// Switches to the continuation prompt while reading continuation lines.
    current_prompt: Prompt,
    /// What is on screen right now. Differs from `current_prompt` while a sub machine
    /// such as incremental search shows its own prompt.
    shown_prompt: Prompt,
    continuation_prompt: Prompt,
    buffer: LineBuffer,
    line: LineBuffer,
    paused: bool,
    width: u16,
    bell_style: BellStyle,
    state: InteractionState,
    data: HashMap<String, Box<dyn Any>>,
    focused: Option<Box<dyn Action>>,
    completion_handler: Option<Box<dyn CompletionHandler>>,
    on_line: Option<LineCallback>,
    last_edit_was_insert: bool,
    /// Dropped together with the interaction, which restores the connection's handlers.
    _guard: Option<HandlerGuard>,
}

impl Debug for Interaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interaction")
            .field("prompt", &self.prompt)
            .field("current_prompt", &self.current_prompt)
            .field("shown_prompt", &self.shown_prompt)
            .field("buffer", &self.buffer)
            .field("line", &self.line)
            .field("paused", &self.paused)
            .field("width", &self.width)
            .field("state", &self.state)
            .field("focused", &self.focused)
            .field("completion_handler", &self.completion_handler)
            .finish_non_exhaustive()
    }
}

impl Interaction {
    pub(crate) fn new(
        conn: Rc<dyn Connection>,
        prompt: Prompt,
        config: &ReadlineConfig,
        on_line: LineCallback,
        completion_handler: Option<Box<dyn CompletionHandler>>,
        guard: Option<HandlerGuard>,
    ) -> Self {
        let width = conn.size().col_width;
        Self {
            conn,
            current_prompt: prompt.clone(),
            shown_prompt: prompt.clone(),
            prompt,
            continuation_prompt: Prompt::new(config.continuation_prompt.as_str()),
            buffer: LineBuffer::new(),
            line: LineBuffer::new(),
            paused: false,
            width,
            bell_style: config.bell_style,
            state: InteractionState::Reading,
            data: HashMap::new(),
            focused: None,
            completion_handler,
            on_line: Some(on_line),
            last_edit_was_insert: false,
            _guard: guard,
        }
    }

    /// A new, empty interaction with the same prompt, callback, completion handler and
    /// connection bindings. Used after an interrupt. Nothing is drawn yet.
    pub(crate) fn into_fresh(mut self) -> Self {
        if let Some(handler) = self.completion_handler.as_mut() {
            handler.set_ask_display_completion(false);
        }
        Self {
            current_prompt: self.prompt.clone(),
            shown_prompt: self.prompt.clone(),
            prompt: self.prompt,
            conn: self.conn,
            continuation_prompt: self.continuation_prompt,
            buffer: LineBuffer::new(),
            line: LineBuffer::new(),
            paused: false,
            width: self.width,
            bell_style: self.bell_style,
            state: InteractionState::Reading,
            data: HashMap::new(),
            focused: None,
            completion_handler: self.completion_handler,
            on_line: self.on_line,
            last_edit_was_insert: false,
            _guard: self._guard,
        }
    }

    #[must_use]
    pub fn conn(&self) -> Rc<dyn Connection> { self.conn.clone() }

    #[must_use]
    pub fn prompt(&self) -> &Prompt { &self.prompt }

    #[must_use]
    pub fn current_prompt(&self) -> &Prompt { &self.current_prompt }

    #[must_use]
    pub fn shown_prompt(&self) -> &Prompt { &self.shown_prompt }

    pub fn set_current_prompt(&mut self, prompt: Prompt) { self.current_prompt = prompt; }

    #[must_use]
    pub fn continuation_prompt(&self) -> &Prompt { &self.continuation_prompt }

    /// The buffer as displayed.
    #[must_use]
    pub fn buffer(&self) -> &LineBuffer { &self.buffer }

    /// Continuation lines accepted so far.
    #[must_use]
    pub fn line(&self) -> &LineBuffer { &self.line }

    pub fn line_mut(&mut self) -> &mut LineBuffer { &mut self.line }

    #[must_use]
    pub fn width(&self) -> u16 { self.width }

    #[must_use]
    pub fn is_paused(&self) -> bool { self.paused }

    pub fn pause(&mut self) { self.paused = true; }

    pub fn resume(&mut self) { self.paused = false; }

    #[must_use]
    pub fn state(&self) -> &InteractionState { &self.state }

    /// Finish the session: `Some(line)` accepts, `None` is end of file. The engine runs
    /// the line callback once the current action returns. Outside an action that is when
    /// [`crate::Readline::with_interaction`] returns, or on [`crate::Readline::resume`]
    /// for a paused session.
    pub fn end(&mut self, maybe_line: Option<String>) {
        self.state = match maybe_line {
            Some(line) => InteractionState::Accepted(line),
            None => InteractionState::Eof,
        };
    }

    /// Session data for actions.
    #[must_use]
    pub fn data(&self) -> &HashMap<String, Box<dyn Any>> { &self.data }

    pub fn data_mut(&mut self) -> &mut HashMap<String, Box<dyn Any>> { &mut self.data }

    #[must_use]
    pub fn has_completion_handler(&self) -> bool { self.completion_handler.is_some() }

    pub fn take_completion_handler(&mut self) -> Option<Box<dyn CompletionHandler>> {
        self.completion_handler.take()
    }

    pub fn set_completion_handler(&mut self, handler: Option<Box<dyn CompletionHandler>>) {
        self.completion_handler = handler;
    }

    pub(crate) fn take_focused(&mut self) -> Option<Box<dyn Action>> { self.focused.take() }

    pub(crate) fn set_focused(&mut self, action: Box<dyn Action>) { self.focused = Some(action); }

    #[must_use]
    pub fn has_focused_action(&self) -> bool { self.focused.is_some() }

    pub(crate) fn take_on_line(&mut self) -> Option<LineCallback> { self.on_line.take() }

    pub(crate) fn last_edit_was_insert(&self) -> bool { self.last_edit_was_insert }

    pub(crate) fn set_last_edit_was_insert(&mut self, value: bool) {
        self.last_edit_was_insert = value;
    }

    pub(crate) fn set_width(&mut self, width: u16) { self.width = width; }

    pub fn write(&self, text: &str) {
        if !text.is_empty() {
            self.conn.write(text);
        }
    }

    pub fn bell(&self) {
        tracing::trace!(bell_style = %self.bell_style, "bell");
        if self.bell_style == BellStyle::Audible {
            self.conn.write("\u{7}");
        }
    }

    /// Show `update` after the current prompt.
    pub fn refresh(&mut self, update: LineBuffer) {
        let prompt = self.current_prompt.clone();
        self.refresh_with_prompt(prompt, update);
    }

    /// Show `update` after `prompt`, which may be a temporary prompt.
    pub fn refresh_with_prompt(&mut self, prompt: Prompt, update: LineBuffer) {
        let mut acc = String::new();
        redraw::update(
            Frame::new(&self.shown_prompt, &self.buffer),
            Frame::new(&prompt, &update),
            self.width,
            &mut acc,
        );
        self.write(&acc);
        self.shown_prompt = prompt;
        self.buffer = update;
    }

    /// Draw the current prompt and buffer from scratch. The cursor must be at column 0
    /// of an empty row.
    pub fn redraw(&mut self) {
        let mut acc = String::new();
        redraw::redraw(
            Frame::new(&self.current_prompt, &self.buffer),
            self.width,
            &mut acc,
        );
        self.write(&acc);
        self.shown_prompt = self.current_prompt.clone();
    }

    /// Empty the buffer and draw the current prompt on a new row.
    pub fn reset_display(&mut self) {
        self.buffer.clear();
        self.redraw();
    }

    /// Move past the end of what is shown and start a new row.
    pub fn new_line(&mut self) {
        let mut acc = String::new();
        redraw::move_to_end(
            Frame::new(&self.shown_prompt, &self.buffer),
            self.width,
            &mut acc,
        );
        acc.push('\n');
        self.write(&acc);
        self.buffer.move_to_end();
    }

    pub fn clear_screen(&mut self) {
        let mut acc = String::new();
        redraw::clear_screen(&mut acc);
        self.write(&acc);
        self.redraw();
    }

    /// The terminal changed from `old_width` to `new_width` columns.
    pub fn resize(&mut self, old_width: u16, new_width: u16) {
        tracing::debug!(old_width, new_width, "resize");
        let mut acc = String::new();
        redraw::resize(
            Frame::new(&self.shown_prompt, &self.buffer),
            old_width,
            new_width,
            &mut acc,
        );
        self.write(&acc);
        self.width = new_width;
    }
}

/// What an [`Action`] gets to work with.
pub struct ActionContext<'a> {
    pub interaction: &'a mut Interaction,
    pub history: &'a mut dyn History,
    pub paste_manager: &'a mut PasteManager,
    pub undo_manager: &'a mut UndoManager,
    pub edit_mode: &'a mut EditMode,
    pub config: &'a ReadlineConfig,
    queue: &'a mut EventQueue,
}

impl Debug for ActionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("interaction", &self.interaction)
            .field("history", &self.history)
            .field("edit_mode", &self.edit_mode)
            .finish_non_exhaustive()
    }
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        interaction: &'a mut Interaction,
        history: &'a mut dyn History,
        paste_manager: &'a mut PasteManager,
        undo_manager: &'a mut UndoManager,
        edit_mode: &'a mut EditMode,
        config: &'a ReadlineConfig,
        queue: &'a mut EventQueue,
    ) -> Self {
        Self {
            interaction,
            history,
            paste_manager,
            undo_manager,
            edit_mode,
            config,
            queue,
        }
    }

    /// Feed input as if it had been typed, after whatever is already queued.
    pub fn queue_event(&mut self, code_points: &[char]) { self.queue.append(code_points); }
}
