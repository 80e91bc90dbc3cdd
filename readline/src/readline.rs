// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The engine. One [`Readline`] owns the key map, history, undo and paste state, and at
//! most one active [`Interaction`] at a time.
//!
//! Input is never processed on the caller's stack. The stdin handler only queues code
//! points and asks the connection to run a delivery task, which drains the queue through
//! the key map while the interaction is not paused.

use std::{cell::RefCell,
          fmt::Debug,
          rc::{Rc, Weak}};

use crate::{ActionContext, ActionKind, CompletionHandler, Connection, EditMode,
            EditModeKind, EventQueue, HandlerGuard, History, InMemoryHistory,
            Interaction, InteractionState, KeyEvent, LineBuffer, LineCallback,
            PASTE_SIZE_MAX, PasteManager, Prompt, ReadlineConfig, ReadlineError, Size,
            SizeHandler, StdinHandler, UNDO_SIZE_MAX, UndoAction, UndoManager, ViStatus,
            create_action, ok};

/// Handle to a line editing engine. Cheap to clone; clones share the same state.
///
/// Everything runs on the connection's thread. Methods return
/// [`ReadlineError::Reentrant`] when called from inside an action, which must go through
/// [`ActionContext`] instead.
#[derive(Clone)]
pub struct Readline {
    state: Rc<RefCell<ReadlineState>>,
}

impl Debug for Readline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => Debug::fmt(&*state, f),
            Err(_) => f.write_str("Readline { <busy> }"),
        }
    }
}

#[derive(Debug)]
struct ReadlineState {
    config: ReadlineConfig,
    edit_mode: EditMode,
    queue: EventQueue,
    history: Box<dyn History>,
    paste_manager: PasteManager,
    undo_manager: UndoManager,
    interaction: Option<Interaction>,
    /// Width the screen was drawn for when a resize arrived during a pause.
    pending_resize: Option<u16>,
    delivery_scheduled: bool,
}

/// A session that ended, with its callback taken out so it can run after the state
/// borrow is released.
struct Finished {
    on_line: LineCallback,
    maybe_line: Option<String>,
}

impl Readline {
    #[must_use]
    pub fn new(config: ReadlineConfig) -> Self {
        let history = Box::new(InMemoryHistory::new(config.history_size));
        Self::new_with_history(config, history)
    }

    #[must_use]
    pub fn new_with_history(config: ReadlineConfig, history: Box<dyn History>) -> Self {
        let state = ReadlineState {
            edit_mode: EditMode::new(config.edit_mode),
            config,
            queue: EventQueue::new(),
            history,
            paste_manager: PasteManager::new(PASTE_SIZE_MAX),
            undo_manager: UndoManager::new(UNDO_SIZE_MAX),
            interaction: None,
            pending_resize: None,
            delivery_scheduled: false,
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Start reading a line from `conn`. `on_line` runs once, with the accepted line or
    /// `None` at end of file.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::AlreadyReading`] when a line is already being read.
    pub fn readline(
        &self,
        conn: Rc<dyn Connection>,
        prompt: impl Into<Prompt>,
        on_line: impl FnOnce(Option<String>) + 'static,
    ) -> Result<(), ReadlineError> {
        self.start(conn, prompt.into(), Box::new(on_line), None)
    }

    /// Like [`Readline::readline`], with Tab completion.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::AlreadyReading`] when a line is already being read.
    pub fn readline_with_completion(
        &self,
        conn: Rc<dyn Connection>,
        prompt: impl Into<Prompt>,
        on_line: impl FnOnce(Option<String>) + 'static,
        completion_handler: impl CompletionHandler + 'static,
    ) -> Result<(), ReadlineError> {
        self.start(
            conn,
            prompt.into(),
            Box::new(on_line),
            Some(Box::new(completion_handler)),
        )
    }

    fn start(
        &self,
        conn: Rc<dyn Connection>,
        prompt: Prompt,
        on_line: LineCallback,
        completion_handler: Option<Box<dyn CompletionHandler>>,
    ) -> Result<(), ReadlineError> {
        let has_events = {
            let mut state = self.try_state()?;
            if state.interaction.is_some() {
                return Err(ReadlineError::AlreadyReading);
            }

            let guard = HandlerGuard::install(
                conn.clone(),
                Some(self.stdin_handler()),
                Some(self.size_handler(&conn)),
                // Interrupt and end of file arrive as input while reading.
                None,
            );

            let state = &mut *state;
            state.edit_mode.reset();
            state.undo_manager.clear();
            state.history.reset_fetch();
            state.history.reset_search();
            state.pending_resize = None;

            tracing::debug!(prompt = prompt.text(), "readline");
            let mut interaction = Interaction::new(
                conn,
                prompt,
                &state.config,
                on_line,
                completion_handler,
                Some(guard),
            );
            interaction.redraw();
            state.interaction = Some(interaction);
            state.queue.has_next()
        };

        if has_events {
            self.schedule_delivery();
        }
        ok!()
    }

    /// Feed input as if it had been typed. It is processed after anything already queued,
    /// or at the start of the next [`Readline::readline`] when nothing is being read.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Reentrant`] when called from inside an action.
    pub fn queue_event(&self, code_points: &[char]) -> Result<(), ReadlineError> {
        let can_deliver = {
            let mut state = self.try_state()?;
            state.queue.append(code_points);
            state.can_deliver()
        };
        if can_deliver {
            self.schedule_delivery();
        }
        ok!()
    }

    /// End a pause left by an action that finished in the background, such as a
    /// [`crate::CompleteOutcome::Deferred`] completion. Applies a resize that arrived
    /// meanwhile, then delivers queued input. When the background work ended the session
    /// with [`Interaction::end`], the line callback runs instead.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::NoInteraction`] when nothing is being read.
    /// - [`ReadlineError::NotPaused`] when the interaction is not paused.
    pub fn resume(&self) -> Result<(), ReadlineError> {
        let finished = {
            let mut state = self.try_state()?;
            let state = &mut *state;
            let Some(interaction) = state.interaction.as_mut() else {
                return Err(ReadlineError::NoInteraction);
            };
            if !interaction.is_paused() {
                return Err(ReadlineError::NotPaused);
            }
            interaction.resume();
            let pending_resize = state.pending_resize.take();
            if *interaction.state() == InteractionState::Reading {
                if let Some(old_width) = pending_resize {
                    let new_width = interaction.conn().size().col_width;
                    if old_width != new_width {
                        interaction.resize(old_width, new_width);
                    }
                }
            }
            tracing::debug!("resume");
            state.take_finished()
        };

        run_finished(finished);
        self.schedule_delivery();
        ok!()
    }

    /// Run `f` on the active interaction. This is how work finished in the background
    /// updates the line before calling [`Readline::resume`]. If `f` ends a session that
    /// is not paused, its line callback runs before this returns.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::NoInteraction`] when nothing is being read.
    /// - [`ReadlineError::Reentrant`] when called from inside an action.
    pub fn with_interaction<R>(
        &self,
        f: impl FnOnce(&mut Interaction) -> R,
    ) -> Result<R, ReadlineError> {
        let (result, finished) = {
            let mut state = self.try_state()?;
            let Some(interaction) = state.interaction.as_mut() else {
                return Err(ReadlineError::NoInteraction);
            };
            let result = f(interaction);
            // A paused session finishes on resume.
            let finished = if interaction.is_paused() {
                None
            } else {
                state.take_finished()
            };
            (result, finished)
        };

        run_finished(finished);
        ok!(result)
    }

    /// # Errors
    ///
    /// [`ReadlineError::Reentrant`] when called from inside an action.
    pub fn with_history<R>(
        &self,
        f: impl FnOnce(&mut dyn History) -> R,
    ) -> Result<R, ReadlineError> {
        let mut state = self.try_state()?;
        ok!(f(state.history.as_mut()))
    }

    /// Bind `event` in the active key map. In Vi mode that is the command map while in
    /// command state and the insert map otherwise.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Reentrant`] when called from inside an action.
    pub fn bind(
        &self,
        event: impl Into<KeyEvent>,
        kind: ActionKind,
    ) -> Result<(), ReadlineError> {
        self.try_state()?.edit_mode.bind(event, kind);
        ok!()
    }

    #[must_use]
    pub fn is_reading(&self) -> bool {
        self.state
            .try_borrow()
            .is_ok_and(|state| state.interaction.is_some())
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.try_borrow().is_ok_and(|state| {
            state
                .interaction
                .as_ref()
                .is_some_and(Interaction::is_paused)
        })
    }

    /// # Errors
    ///
    /// [`ReadlineError::Reentrant`] when called from inside an action.
    pub fn edit_mode_kind(&self) -> Result<EditModeKind, ReadlineError> {
        ok!(self.try_state_ref()?.edit_mode.kind())
    }

    /// # Errors
    ///
    /// [`ReadlineError::Reentrant`] when called from inside an action.
    pub fn vi_status(&self) -> Result<ViStatus, ReadlineError> {
        ok!(self.try_state_ref()?.edit_mode.vi_status())
    }

    /// The buffer of the active interaction, as displayed.
    #[must_use]
    pub fn buffer(&self) -> Option<LineBuffer> {
        self.state
            .try_borrow()
            .ok()
            .and_then(|state| state.interaction.as_ref().map(|it| it.buffer().clone()))
    }

    fn try_state(&self) -> Result<std::cell::RefMut<'_, ReadlineState>, ReadlineError> {
        self.state
            .try_borrow_mut()
            .map_err(|_| ReadlineError::Reentrant)
    }

    fn try_state_ref(&self) -> Result<std::cell::Ref<'_, ReadlineState>, ReadlineError> {
        self.state.try_borrow().map_err(|_| ReadlineError::Reentrant)
    }

    fn weak(&self) -> Weak<RefCell<ReadlineState>> { Rc::downgrade(&self.state) }

    fn stdin_handler(&self) -> StdinHandler {
        let weak = self.weak();
        Rc::new(move |code_points: &[char]| {
            if let Some(state) = weak.upgrade() {
                Readline { state }.on_stdin(code_points);
            }
        })
    }

    fn size_handler(&self, conn: &Rc<dyn Connection>) -> SizeHandler {
        let weak = self.weak();
        let conn = Rc::downgrade(conn);
        Rc::new(move |size: Size| {
            let Some(conn) = conn.upgrade() else {
                return;
            };
            let weak = weak.clone();
            conn.execute(Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    Readline { state }.on_resize(size);
                }
            }));
        })
    }

    fn on_stdin(&self, code_points: &[char]) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => state.queue.append(code_points),
            Err(_) => {
                tracing::error!(
                    len = code_points.len(),
                    "input dispatched while the engine was busy, dropped"
                );
                return;
            }
        }
        self.schedule_delivery();
    }

    fn on_resize(&self, size: Size) {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            tracing::error!(?size, "resize while the engine was busy, dropped");
            return;
        };
        let state = &mut *state;
        let Some(interaction) = state.interaction.as_mut() else {
            return;
        };
        let old_width = interaction.width();
        if interaction.is_paused() {
            tracing::debug!(?size, "resize deferred");
            state.pending_resize.get_or_insert(old_width);
        } else if old_width != size.col_width {
            interaction.resize(old_width, size.col_width);
        } else {
            interaction.set_width(size.col_width);
        }
    }

    fn schedule_delivery(&self) {
        let conn = {
            let Ok(mut state) = self.state.try_borrow_mut() else {
                return;
            };
            if state.delivery_scheduled {
                return;
            }
            let Some(conn) = state.interaction.as_ref().map(Interaction::conn) else {
                return;
            };
            state.delivery_scheduled = true;
            conn
        };
        let weak = self.weak();
        conn.execute(Box::new(move || {
            if let Some(state) = weak.upgrade() {
                Readline { state }.deliver();
            }
        }));
    }

    /// Drain the queue while there is an interaction that is not paused. Line callbacks
    /// run in between, with the state released, so they may start the next line.
    fn deliver(&self) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => state.delivery_scheduled = false,
            Err(_) => return,
        }

        loop {
            let finished = {
                let Ok(mut state) = self.state.try_borrow_mut() else {
                    return;
                };
                if !state.can_deliver() {
                    return;
                }
                let state = &mut *state;
                let edit_mode = &state.edit_mode;
                let Some(event) = state.queue.next(|key| edit_mode.recognizes(key)) else {
                    return;
                };
                state.handle(event)
            };

            run_finished(finished);
        }
    }
}

/// Runs outside the state borrow, so the callback may start the next line.
fn run_finished(finished: Option<Finished>) {
    if let Some(Finished {
        on_line,
        maybe_line,
    }) = finished
    {
        on_line(maybe_line);
    }
}

impl ReadlineState {
    fn can_deliver(&self) -> bool {
        self.queue.has_next()
            && self
                .interaction
                .as_ref()
                .is_some_and(|it| !it.is_paused())
    }

    fn handle(&mut self, event: KeyEvent) -> Option<Finished> {
        let control_chars = self.config.control_chars;
        let code_point = event.single_code_point();

        if code_point == Some(control_chars.interrupt) {
            self.interrupt();
            return None;
        }

        let interaction = self.interaction.as_mut()?;
        if code_point == Some(control_chars.eof) && interaction.buffer().is_empty() {
            tracing::debug!("end of file");
            interaction.end(None);
        } else {
            self.dispatch(event);
        }
        self.take_finished()
    }

    fn dispatch(&mut self, event: KeyEvent) {
        let Self {
            config,
            edit_mode,
            queue,
            history,
            paste_manager,
            undo_manager,
            interaction,
            ..
        } = self;
        let Some(interaction) = interaction.as_mut() else {
            return;
        };

        let bound = edit_mode.lookup(&event);
        let action = match (interaction.take_focused(), bound) {
            (Some(mut focused), _) => {
                focused.input(bound, &event);
                Some(focused)
            }
            (None, Some(kind)) => Some(create_action(kind)),
            (None, None) => None,
        };

        let Some(mut action) = action else {
            self_insert(interaction, undo_manager, edit_mode, event);
            return;
        };

        tracing::trace!(action = action.name(), ?event, "apply");
        interaction.set_last_edit_was_insert(false);
        interaction.pause();
        let mut cx = ActionContext::new(
            interaction,
            history.as_mut(),
            paste_manager,
            undo_manager,
            edit_mode,
            config,
            queue,
        );
        action.apply(&mut cx);
        if action.keep_focus() {
            interaction.set_focused(action);
        }
    }

    /// Ctrl-C: drop the line and start over with the same prompt on a new row.
    fn interrupt(&mut self) {
        let Some(mut old) = self.interaction.take() else {
            return;
        };
        tracing::debug!("interrupt");
        old.new_line();
        let mut fresh = old.into_fresh();
        self.edit_mode.reset();
        self.undo_manager.clear();
        self.history.reset_fetch();
        self.history.reset_search();
        self.pending_resize = None;
        fresh.redraw();
        self.interaction = Some(fresh);
    }

    fn take_finished(&mut self) -> Option<Finished> {
        let maybe_line = match self.interaction.as_ref()?.state() {
            InteractionState::Reading => return None,
            InteractionState::Accepted(line) => Some(line.clone()),
            InteractionState::Eof => None,
        };
        let mut interaction = self.interaction.take()?;
        let on_line = interaction.take_on_line();
        // Restores the connection's handlers.
        drop(interaction);
        tracing::debug!(?maybe_line, "line done");
        on_line.map(|on_line| Finished {
            on_line,
            maybe_line,
        })
    }
}

fn self_insert(
    interaction: &mut Interaction,
    undo_manager: &mut UndoManager,
    edit_mode: &EditMode,
    event: KeyEvent,
) {
    let code_point = match event {
        KeyEvent::Char(code_point) if event.is_printable() && edit_mode.accepts_insertion() => {
            code_point
        }
        _ => {
            interaction.bell();
            return;
        }
    };

    let mut update = interaction.buffer().clone();
    if let Err(err) = update.insert(code_point) {
        tracing::debug!(%err, "insert rejected");
        interaction.bell();
        return;
    }
    // A run of typed characters is undone in one step.
    if !interaction.last_edit_was_insert() {
        undo_manager.push(UndoAction::snapshot(interaction.buffer()));
    }
    interaction.refresh(update);
    interaction.set_last_edit_was_insert(true);
}
