// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::Debug, rc::Rc, time::Duration};

use crate::TtyEvent;

/// Terminal size in columns and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub col_width: u16,
    pub row_height: u16,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            col_width: 80,
            row_height: 24,
        }
    }
}

#[must_use]
pub fn size(col_width: u16, row_height: u16) -> Size {
    Size {
        col_width,
        row_height,
    }
}

/// Receives ordinary input, already decoded into code points.
pub type StdinHandler = Rc<dyn Fn(&[char])>;
/// Receives the new terminal size.
pub type SizeHandler = Rc<dyn Fn(Size)>;
/// Receives in band signals along with the code point that triggered them.
pub type EventHandler = Rc<dyn Fn(TtyEvent, char)>;
/// Work handed to the connection's scheduler.
pub type Task = Box<dyn FnOnce()>;

/// Everything the engine needs from a terminal, pty, or socket.
///
/// All methods take `&self` and implementations use interior mutability. The engine is
/// single threaded: handlers and tasks run on one logical thread, and a connection that
/// receives bytes on another thread must hand them over through its scheduler.
///
/// Handlers are reference counted so that a handler may replace the installed handlers
/// while it is running.
pub trait Connection {
    fn size(&self) -> Size;

    /// Write code points to the terminal. A `'\n'` must land on column 0 of the next row,
    /// see [`OutputMode`].
    fn stdout(&self, code_points: &[char]);

    /// Install a stdin handler and return the one it replaces.
    fn set_stdin_handler(&self, handler: Option<StdinHandler>) -> Option<StdinHandler>;

    /// Install a size change handler and return the one it replaces.
    fn set_size_handler(&self, handler: Option<SizeHandler>) -> Option<SizeHandler>;

    /// Install a signal handler and return the one it replaces. While no signal handler is
    /// installed, control characters arrive as ordinary input.
    fn set_event_handler(&self, handler: Option<EventHandler>) -> Option<EventHandler>;

    /// Run `task` soon, on the connection's thread. Never runs it inline.
    fn execute(&self, task: Task);

    /// Run `task` on the connection's thread once `delay` has passed.
    fn schedule(&self, task: Task, delay: Duration);

    fn write(&self, text: &str) {
        let code_points: Vec<char> = text.chars().collect();
        self.stdout(&code_points);
    }
}

/// Installs a set of handlers on a [`Connection`] and puts the previous ones back when
/// dropped.
pub struct HandlerGuard {
    conn: Rc<dyn Connection>,
    prev_stdin: Option<StdinHandler>,
    prev_size: Option<SizeHandler>,
    prev_event: Option<EventHandler>,
}

impl HandlerGuard {
    pub fn install(
        conn: Rc<dyn Connection>,
        stdin: Option<StdinHandler>,
        size: Option<SizeHandler>,
        event: Option<EventHandler>,
    ) -> Self {
        let prev_stdin = conn.set_stdin_handler(stdin);
        let prev_size = conn.set_size_handler(size);
        let prev_event = conn.set_event_handler(event);
        Self {
            conn,
            prev_stdin,
            prev_size,
            prev_event,
        }
    }
}

impl Drop for HandlerGuard {
    fn drop(&mut self) {
        self.conn.set_stdin_handler(self.prev_stdin.take());
        self.conn.set_size_handler(self.prev_size.take());
        self.conn.set_event_handler(self.prev_event.take());
    }
}

impl Debug for HandlerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerGuard")
            .field("prev_stdin", &self.prev_stdin.is_some())
            .field("prev_size", &self.prev_size.is_some())
            .field("prev_event", &self.prev_event.is_some())
            .finish()
    }
}

/// Output post processing, the `ONLCR` part of a terminal's output flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// `'\n'` becomes `"\r\n"`.
    #[default]
    Translate,
    Raw,
}

impl OutputMode {
    pub fn translate(self, code_points: &[char], acc: &mut String) {
        for &code_point in code_points {
            if code_point == '\n' && self == OutputMode::Translate {
                acc.push('\r');
            }
            acc.push(code_point);
        }
    }
}
