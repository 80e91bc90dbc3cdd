// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{cell::{Cell, RefCell},
          io::{self, Read, Write},
          time::Duration};

use crossterm::terminal;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::{BinaryDecoder, Connection, ControlChars, EventHandler, OutputMode,
            ReadlineError, Size, SizeHandler, StdinHandler, Task, TtyEvent, TtyEventDecoder,
            ok};

const STDIN_READ_BUFFER_SIZE: usize = 1024;

/// [`Connection`] to the process's own terminal.
///
/// - Input: a dedicated thread reads raw bytes from stdin and sends them over a channel.
///   They are decoded and dispatched on the thread that polls [`TerminalConnection::run`].
/// - Output: written to stdout with `'\n'` translated to `"\r\n"`, since raw mode turns
///   off the terminal's own translation.
/// - Size: [`crossterm::terminal::size`], refreshed on `SIGWINCH` on unix.
/// - Tasks: queued on a channel and run by [`TerminalConnection::run`]. Delayed tasks use
///   [`tokio::task::spawn_local`], so `run` must be polled inside a
///   [`tokio::task::LocalSet`].
///
/// Raw mode is entered by [`TerminalConnection::try_new`] and left on drop.
pub struct TerminalConnection {
    size: Cell<Size>,
    output_mode: OutputMode,
    decoder: RefCell<BinaryDecoder>,
    event_decoder: TtyEventDecoder,
    stdin_handler: RefCell<Option<StdinHandler>>,
    size_handler: RefCell<Option<SizeHandler>>,
    event_handler: RefCell<Option<EventHandler>>,
    task_sender: UnboundedSender<Task>,
    task_receiver: RefCell<Option<UnboundedReceiver<Task>>>,
    closed: Cell<bool>,
}

impl std::fmt::Debug for TerminalConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalConnection")
            .field("size", &self.size.get())
            .field("output_mode", &self.output_mode)
            .field("closed", &self.closed.get())
            .finish_non_exhaustive()
    }
}

impl TerminalConnection {
    /// # Errors
    ///
    /// Returns an error if the terminal size can't be read or raw mode can't be entered.
    pub fn try_new() -> miette::Result<Self> { Self::try_new_with(ControlChars::default()) }

    /// # Errors
    ///
    /// Returns an error if the terminal size can't be read or raw mode can't be entered.
    pub fn try_new_with(control_chars: ControlChars) -> miette::Result<Self> {
        let (col_width, row_height) = terminal::size().map_err(ReadlineError::IO)?;
        terminal::enable_raw_mode().map_err(ReadlineError::IO)?;
        tracing::debug!(col_width, row_height, "entered raw mode");

        let (task_sender, task_receiver) = unbounded_channel::<Task>();
        ok!(Self {
            size: Cell::new(Size {
                col_width,
                row_height,
            }),
            output_mode: OutputMode::Translate,
            decoder: RefCell::new(BinaryDecoder::new()),
            event_decoder: TtyEventDecoder::new(control_chars),
            stdin_handler: RefCell::new(None),
            size_handler: RefCell::new(None),
            event_handler: RefCell::new(None),
            task_sender,
            task_receiver: RefCell::new(Some(task_receiver)),
            closed: Cell::new(false),
        })
    }

    /// Stop [`TerminalConnection::run`] after the task that is currently running.
    pub fn close(&self) {
        self.closed.set(true);
        // Wake up the loop in case it is idle.
        self.task_sender.send(Box::new(|| {})).ok();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool { self.closed.get() }

    /// Drive the connection until [`TerminalConnection::close`] is called or stdin reaches
    /// end of file.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is already running.
    pub async fn run(&self) -> miette::Result<()> {
        let mut task_receiver = self
            .task_receiver
            .borrow_mut()
            .take()
            .ok_or_else(|| miette::miette!("terminal connection is already running"))?;
        let mut bytes_receiver = spawn_stdin_reader();
        let mut resize_signal = ResizeSignal::new();

        while !self.closed.get() {
            tokio::select! {
                Some(task) = task_receiver.recv() => task(),
                maybe_bytes = bytes_receiver.recv() => match maybe_bytes {
                    Some(bytes) => self.on_bytes(&bytes),
                    None => {
                        self.on_end_of_stream();
                        break;
                    }
                },
                () = resize_signal.recv() => self.on_resize(),
            }
        }

        *self.task_receiver.borrow_mut() = Some(task_receiver);
        ok!()
    }

    fn on_bytes(&self, bytes: &[u8]) {
        let code_points = self.decoder.borrow_mut().decode(bytes);
        self.dispatch(&code_points);
    }

    fn on_end_of_stream(&self) {
        tracing::debug!("stdin reached end of stream");
        let maybe_replacement = self.decoder.borrow_mut().finish();
        if let Some(replacement) = maybe_replacement {
            self.dispatch(&[replacement]);
        }
    }

    fn on_resize(&self) {
        let Ok((col_width, row_height)) = terminal::size() else {
            return;
        };
        let new_size = Size {
            col_width,
            row_height,
        };
        self.size.set(new_size);
        let maybe_handler = self.size_handler.borrow().clone();
        if let Some(handler) = maybe_handler {
            handler(new_size);
        }
    }

    fn dispatch(&self, code_points: &[char]) {
        let maybe_stdin = self.stdin_handler.borrow().clone();
        let maybe_event = self.event_handler.borrow().clone();

        let on_read = |chunk: &[char]| match &maybe_stdin {
            Some(handler) => handler(chunk),
            None => tracing::trace!(len = chunk.len(), "no stdin handler, input dropped"),
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

impl Connection for TerminalConnection {
    fn size(&self) -> Size { self.size.get() }

    fn stdout(&self, code_points: &[char]) {
        let mut acc = String::with_capacity(code_points.len());
        self.output_mode.translate(code_points, &mut acc);
        let mut stdout = io::stdout().lock();
        if let Err(err) = stdout
            .write_all(acc.as_bytes())
            .and_then(|()| stdout.flush())
        {
            tracing::error!(?err, "failed to write to stdout");
        }
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

    fn execute(&self, task: Task) {
        if self.task_sender.send(task).is_err() {
            tracing::warn!("task dropped, terminal connection is gone");
        }
    }

    fn schedule(&self, task: Task, delay: Duration) {
        let sender = self.task_sender.clone();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            sender.send(task).ok();
        });
    }
}

impl Drop for TerminalConnection {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::error!(?err, "failed to leave raw mode");
        }
    }
}

fn spawn_stdin_reader() -> UnboundedReceiver<Vec<u8>> {
    let (sender, receiver) = unbounded_channel::<Vec<u8>>();
    std::thread::spawn(move || {
        let mut stdin = io::stdin().lock();
        let mut buffer = [0_u8; STDIN_READ_BUFFER_SIZE];
        loop {
            match stdin.read(&mut buffer) {
                Ok(0) => break,
                Ok(count) => {
                    if sender.send(buffer[..count].to_vec()).is_err() {
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    tracing::error!(?err, "failed to read stdin");
                    break;
                }
            }
        }
    });
    receiver
}

#[cfg(unix)]
struct ResizeSignal(Option<tokio::signal::unix::Signal>);

#[cfg(unix)]
impl ResizeSignal {
    fn new() -> Self {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::window_change()) {
            Ok(it) => Self(Some(it)),
            Err(err) => {
                tracing::warn!(?err, "resize notifications are not available");
                Self(None)
            }
        }
    }

    async fn recv(&mut self) {
        match &mut self.0 {
            Some(signal) => {
                if signal.recv().await.is_none() {
                    self.0 = None;
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(not(unix))]
struct ResizeSignal;

#[cfg(not(unix))]
impl ResizeSignal {
    fn new() -> Self { Self }

    async fn recv(&mut self) { std::future::pending::<()>().await }
}
