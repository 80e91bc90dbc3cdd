// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod event_queue;
pub mod key;
pub mod key_event;

// Re-export.
pub use event_queue::*;
pub use key::*;
pub use key_event::*;
