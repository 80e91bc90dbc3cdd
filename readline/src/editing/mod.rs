// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod action_kind;
pub mod edit_mode;

// Re-export.
pub use action_kind::*;
pub use edit_mode::*;
