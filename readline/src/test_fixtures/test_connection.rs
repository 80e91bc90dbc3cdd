// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{cell::{Cell, RefCell},
          collections::VecDeque,
          time::Duration};

use super::TestTerminal;
use crate::{BinaryDecoder, Connection, ControlChars, EventHandler, Key, OutputMode, Size,
            SizeHandler, StdinHandler, Task, TtyEvent, TtyEventDecoder, size};

/// [`Connection`] for tests. Input is fed in as bytes and goes through the same decoders
/// a real terminal uses. Output lands in a [`TestTerminal`] and in a raw transcript.
///
/// Tasks queue up until [`TestConnection::run_tasks`] runs them, the way a single
/// threaded executor would. The `read*` and [`TestConnection::resize`] helpers run the
/// queue for you. Delayed tasks wait for [`TestConnection::run_delayed_tasks`].
pub struct TestConnection {
    size: Cell<Size>,
    decoder: RefCell<BinaryDecoder>,
    event_decoder: TtyEventDecoder,
    stdin_handler: RefCell<Option<StdinHandler>>,
    size_handler: RefCell<Option<SizeHandler>>,
    event_handler: RefCell<Option<EventHandler>>,
    tasks: RefCell<VecDeque<Task>>,
    delayed_tasks: RefCell<Vec<(Duration, Task)>>,
    terminal: RefCell<TestTerminal>,
    output: RefCell<String>,
}

impl std::fmt::Debug for TestConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestConnection")
            .field("size", &self.size.get())
            .field("tasks", &self.tasks.borrow().len())
            .field("delayed_tasks", &self.delayed_tasks.borrow().len())
            .field("output", &self.output.borrow())
            .finish_non_exhaustive()
    }
}

impl Default for TestConnection {
    fn default() -> Self { Self::new(80, 24) }
}

impl TestConnection {
    #[must_use]
    pub fn new(col_width: u16, row_height: u16) -> Self {
        Self::new_with(col_width, row_height, ControlChars::default())
    }

    #[must_use]
    pub fn new_with(col_width: u16, row_height: u16, control_chars: ControlChars) -> Self {
        Self {
            size: Cell::new(size(col_width, row_height)),
            decoder: RefCell::new(BinaryDecoder::new()),
            event_decoder: TtyEventDecoder::new(control_chars),
            stdin_handler: RefCell::new(None),
            size_handler: RefCell::new(None),
            event_handler: RefCell::new(None),
            tasks: RefCell::new(VecDeque::new()),
            delayed_tasks: RefCell::new(vec![]),
            terminal: RefCell::new(TestTerminal::new(col_width)),
            output: RefCell::new(String::new()),
        }
    }

    /// Dispatch `bytes` to the installed handlers without running any task.
    pub fn feed(&self, bytes: &[u8]) {
        let code_points = self.decoder.borrow_mut().decode(bytes);
        self.dispatch(&code_points);
    }

    /// [`TestConnection::feed`], then run the task queue.
    pub fn read(&self, bytes: &[u8]) {
        self.feed(bytes);
        self.run_tasks();
    }

    pub fn read_str(&self, text: &str) { self.read(text.as_bytes()); }

    /// Each key arrives as its own read, like a person typing.
    pub fn read_keys(&self, keys: &[Key]) {
        for key in keys {
            let text: String = key.code_points().iter().collect();
            self.read_str(&text);
        }
    }

    pub fn end_of_stream(&self) {
        let maybe_replacement = self.decoder.borrow_mut().finish();
        if let Some(replacement) = maybe_replacement {
            self.dispatch(&[replacement]);
        }
        self.run_tasks();
    }

    pub fn resize(&self, col_width: u16, row_height: u16) {
        let new_size = size(col_width, row_height);
        self.size.set(new_size);
        self.terminal.borrow_mut().set_width(col_width);
        let maybe_handler = self.size_handler.borrow().clone();
        if let Some(handler) = maybe_handler {
            handler(new_size);
        }
        self.run_tasks();
    }

    /// Run queued tasks, including the ones they queue, until the queue is empty.
    pub fn run_tasks(&self) {
        loop {
            let maybe_task = self.tasks.borrow_mut().pop_front();
            match maybe_task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Pretend every delay has passed.
    pub fn run_delayed_tasks(&self) {
        let delayed = std::mem::take(&mut *self.delayed_tasks.borrow_mut());
        for (_delay, task) in delayed {
            self.tasks.borrow_mut().push_back(task);
        }
        self.run_tasks();
    }

    #[must_use]
    pub fn pending_task_count(&self) -> usize { self.tasks.borrow().len() }

    #[must_use]
    pub fn delayed_task_count(&self) -> usize { self.delayed_tasks.borrow().len() }

    /// Everything written so far, after `'\n'` translation.
    #[must_use]
    pub fn output(&self) -> String { self.output.borrow().clone() }

    pub fn clear_output(&self) { self.output.borrow_mut().clear(); }

    #[must_use]
    pub fn screen_lines(&self) -> Vec<String> { self.terminal.borrow().screen_lines() }

    /// `(row, col)`.
    #[must_use]
    pub fn cursor(&self) -> (usize, usize) { self.terminal.borrow().cursor() }

    #[must_use]
    pub fn bell_count(&self) -> usize { self.terminal.borrow().bell_count() }

    #[must_use]
    pub fn has_stdin_handler(&self) -> bool { self.stdin_handler.borrow().is_some() }

    #[must_use]
    pub fn has_event_handler(&self) -> bool { self.event_handler.borrow().is_some() }

    fn dispatch(&self, code_points: &[char]) {
        let maybe_stdin = self.stdin_handler.borrow().clone();
        let maybe_event = self.event_handler.borrow().clone();
        let on_read = |chunk: &[char]| {
            if let Some(handler) = &maybe_stdin {
                handler(chunk);
            }
        };
        let mut on_event = |event: TtyEvent, code_point: char| {
            if let Some(handler) = &maybe_event {
                handler(event, code_point);
            }
        };
        let maybe_on_event: Option<&mut dyn FnMut(TtyEvent, char)> = if maybe_event.is_some() {
            Some(&mut on_event)
        } else {
            None
        };
        self.event_decoder
            .accept(code_points, on_read, maybe_on_event);
    }
}

impl Connection for TestConnection {
    fn size(&self) -> Size { self.size.get() }

    fn stdout(&self, code_points: &[char]) {
        let mut acc = String::new();
        OutputMode::Translate.translate(code_points, &mut acc);
        self.terminal.borrow_mut().write_str(&acc);
        self.output.borrow_mut().push_str(&acc);
    }

    fn set_stdin_handler(&self, handler: Option<StdinHandler>) -> Option<StdinHandler> {
        self.stdin_handler.replace(handler)
    }

    fn set_size_handler(&self, handler: Option<SizeHandler>) -> Option<SizeHandler> {
        self.size_handler.replace(handler)
    }

    fn set_event_handler(&self, handler: Option<EventHandler>) -> Option<EventHandler> {
        self.event_handler.replace(handler)
    }

    fn execute(&self, task: Task) { self.tasks.borrow_mut().push_back(task); }

    fn schedule(&self, task: Task, delay: Duration) {
        self.delayed_tasks.borrow_mut().push((delay, task));
    }
}
