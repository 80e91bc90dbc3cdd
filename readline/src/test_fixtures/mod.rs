// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fixtures for driving the engine without a real terminal. They are public so that
//! integration tests and downstream crates can use them.

// Attach.
pub mod test_connection;
pub mod test_terminal;

// Re-export.
pub use test_connection::*;
pub use test_terminal::*;
