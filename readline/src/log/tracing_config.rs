// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tracing_core::LevelFilter;

pub const DEFAULT_LOG_FILE_NAME: &str = "readline_debug.log";

/// Where the logs go and how verbose they are.
///
/// Use [`crate::try_initialize_logging_global`] to install a subscriber built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    /// File path, eg: `/tmp/readline_debug.log`.
    File(String),
    DisplayAndFile(DisplayPreference, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayPreference {
    Stdout,
    #[default]
    Stderr,
}

impl Default for TracingConfig {
    fn default() -> Self { Self::new_file(None, LevelFilter::DEBUG) }
}

impl TracingConfig {
    #[must_use]
    pub fn new_file(file_path: Option<String>, level_filter: LevelFilter) -> Self {
        Self {
            writer_config: WriterConfig::File(
                file_path.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string()),
            ),
            level_filter,
        }
    }

    #[must_use]
    pub fn new_display(preferred_display: DisplayPreference, level_filter: LevelFilter) -> Self {
        Self {
            writer_config: WriterConfig::Display(preferred_display),
            level_filter,
        }
    }

    #[must_use]
    pub fn new_file_and_display(
        file_path: Option<String>,
        preferred_display: DisplayPreference,
        level_filter: LevelFilter,
    ) -> Self {
        Self {
            writer_config: WriterConfig::DisplayAndFile(
                preferred_display,
                file_path.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string()),
            ),
            level_filter,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            writer_config: WriterConfig::None,
            level_filter: LevelFilter::OFF,
        }
    }

    #[must_use]
    pub fn display_preference(&self) -> Option<DisplayPreference> {
        match &self.writer_config {
            WriterConfig::Display(it) | WriterConfig::DisplayAndFile(it, _) => Some(*it),
            WriterConfig::None | WriterConfig::File(_) => None,
        }
    }

    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        match &self.writer_config {
            WriterConfig::File(it) | WriterConfig::DisplayAndFile(_, it) => Some(it),
            WriterConfig::None | WriterConfig::Display(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_logs_debug_to_file() {
        let config = TracingConfig::default();
        assert_eq!(config.file_path(), Some(DEFAULT_LOG_FILE_NAME));
        assert_eq!(config.display_preference(), None);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
    }

    #[test]
    fn test_file_and_display() {
        let config = TracingConfig::new_file_and_display(
            Some("/tmp/x.log".into()),
            DisplayPreference::Stdout,
            LevelFilter::INFO,
        );
        assert_eq!(config.file_path(), Some("/tmp/x.log"));
        assert_eq!(config.display_preference(), Some(DisplayPreference::Stdout));
    }
}
