// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::{Display, EnumString};

use crate::{ControlChars, EditModeKind};

pub const HISTORY_SIZE_MAX: usize = 500;
pub const COMPLETION_QUERY_ITEMS: usize = 100;
pub const CONTINUATION_PROMPT: &str = "> ";

/// What to do when an edit is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum BellStyle {
    #[default]
    Audible,
    None,
}

/// Settings for one [`crate::Readline`] engine. Build it with [`Default`] and the `with_*`
/// setters.
///
/// ```
/// use r3bl_readline::{BellStyle, EditModeKind, ReadlineConfig};
///
/// let config = ReadlineConfig::default()
///     .with_edit_mode(EditModeKind::Vi)
///     .with_history_size(100)
///     .with_bell_style(BellStyle::None);
/// assert_eq!(config.history_size, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadlineConfig {
    pub edit_mode: EditModeKind,
    pub control_chars: ControlChars,
    pub history_size: usize,
    pub continuation_prompt: String,
    pub bell_style: BellStyle,
    /// Ask before listing more than this many completion candidates.
    pub completion_query_items: usize,
}

impl Default for ReadlineConfig {
    fn default() -> Self {
        Self {
            edit_mode: EditModeKind::default(),
            control_chars: ControlChars::default(),
            history_size: HISTORY_SIZE_MAX,
            continuation_prompt: CONTINUATION_PROMPT.to_string(),
            bell_style: BellStyle::default(),
            completion_query_items: COMPLETION_QUERY_ITEMS,
        }
    }
}

impl ReadlineConfig {
    #[must_use]
    pub fn with_edit_mode(mut self, edit_mode: EditModeKind) -> Self {
        self.edit_mode = edit_mode;
        self
    }

    #[must_use]
    pub fn with_control_chars(mut self, control_chars: ControlChars) -> Self {
        self.control_chars = control_chars;
        self
    }

    #[must_use]
    pub fn with_history_size(mut self, history_size: usize) -> Self {
        self.history_size = history_size;
        self
    }

    #[must_use]
    pub fn with_continuation_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.continuation_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_bell_style(mut self, bell_style: BellStyle) -> Self {
        self.bell_style = bell_style;
        self
    }

    #[must_use]
    pub fn with_completion_query_items(mut self, items: usize) -> Self {
        self.completion_query_items = items;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReadlineConfig::default();
        assert_eq!(config.edit_mode, EditModeKind::Emacs);
        assert_eq!(config.history_size, HISTORY_SIZE_MAX);
        assert_eq!(config.continuation_prompt, "> ");
        assert_eq!(config.completion_query_items, 100);
        assert_eq!(config.control_chars.interrupt, '\u{3}');
    }

    #[test]
    fn test_bell_style_from_str() {
        assert_eq!(BellStyle::from_str("none").unwrap(), BellStyle::None);
        assert_eq!(BellStyle::from_str("audible").unwrap(), BellStyle::Audible);
        assert!(BellStyle::from_str("visible").is_err());
    }
}
