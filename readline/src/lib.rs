// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # r3bl_readline
//!
//! An embeddable line editing engine. It turns the raw byte stream of a terminal (or a
//! socket or pty that behaves like one) into edited lines, while the host application
//! keeps full control of prompting, history, completion and redraw.
//!
//! The engine never touches a file descriptor. Everything it needs from the outside
//! world comes through the [`Connection`] trait:
//!
//! - a stdin handler that receives decoded code points,
//! - a stdout sink that accepts code points,
//! - a size query plus a size change handler,
//! - a signal handler for interrupt, suspend and end of file,
//! - a task scheduler ([`Connection::execute`] and [`Connection::schedule`]).
//!
//! [`TerminalConnection`] implements this on top of `crossterm` and `tokio` for a real
//! terminal, and [`test_fixtures::TestConnection`] implements it on top of a tiny VT100
//! emulator for tests.
//!
//! # Data flow
//!
//! ```text
//! bytes -> BinaryDecoder -> TtyEventDecoder -> EventQueue -> EditMode -> Action
//!                                                                  \-> insertion
//! Action -> LineBuffer -> redraw::update -> Connection::stdout
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//!
//! use r3bl_readline::{Readline, ReadlineConfig, TerminalConnection};
//!
//! # fn main() -> miette::Result<()> {
//! let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()
//!     .map_err(|err| miette::miette!(err))?;
//! let local_set = tokio::task::LocalSet::new();
//! local_set.block_on(&runtime, async {
//!     let conn = Rc::new(TerminalConnection::try_new()?);
//!     let readline = Readline::new(ReadlineConfig::default());
//!     let conn_clone = conn.clone();
//!     readline.readline(conn.clone(), "> ", move |maybe_line| {
//!         println!("got: {maybe_line:?}");
//!         conn_clone.close();
//!     })?;
//!     conn.run().await
//! })
//! # }
//! ```

// Production code must propagate errors. Tests may unwrap.
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach.
pub mod actions;
pub mod completion;
pub mod config;
pub mod decl_macros;
pub mod editing;
pub mod error;
pub mod history;
pub mod interaction;
pub mod keys;
pub mod line_buffer;
pub mod log;
pub mod paste;
pub mod readline;
pub mod redraw;
pub mod test_fixtures;
pub mod tty;
pub mod undo;

// Re-export.
pub use actions::*;
pub use completion::*;
pub use config::*;
pub use editing::*;
pub use error::*;
pub use history::*;
pub use interaction::*;
pub use keys::*;
pub use line_buffer::*;
pub use log::*;
pub use paste::*;
pub use readline::*;
pub use redraw::*;
pub use tty::*;
pub use undo::*;
