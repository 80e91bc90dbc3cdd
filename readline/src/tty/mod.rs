// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Everything between the wire and the engine: the [`Connection`] seam, the UTF-8
//! decoder, the control character splitter, and a real terminal backend.

// Attach.
pub mod binary_decoder;
pub mod connection;
pub mod terminal_connection;
pub mod tty_event_decoder;

// Re-export.
pub use binary_decoder::*;
pub use connection::*;
pub use terminal_connection::*;
pub use tty_event_decoder::*;
