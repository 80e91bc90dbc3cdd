// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Opt in `tracing` setup for hosts and demos. The engine itself only emits events; it
//! never installs a subscriber.
//!
//! A line editor owns the terminal, so the usual choice is [`WriterConfig::File`].

// Attach.
pub mod rolling_file_appender_impl;
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use tracing_config::*;
pub use tracing_init::*;
