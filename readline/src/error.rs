// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::io;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that are reported to the caller of the engine.
///
/// Session ending conditions (accept, end of file, interrupt) are not errors. They are
/// delivered through the line callback passed to [`crate::Readline::readline`].
#[derive(Debug, Error, Diagnostic)]
pub enum ReadlineError {
    #[error("readline is already reading a line on this engine")]
    #[diagnostic(
        code(r3bl_readline::already_reading),
        help("wait for the line callback to run before calling readline again")
    )]
    AlreadyReading,

    #[error("there is no active interaction")]
    #[diagnostic(code(r3bl_readline::no_interaction))]
    NoInteraction,

    #[error("the active interaction is not paused")]
    #[diagnostic(code(r3bl_readline::not_paused))]
    NotPaused,

    #[error("the engine was called from inside one of its own actions")]
    #[diagnostic(
        code(r3bl_readline::reentrant),
        help("defer the call with Connection::execute or Connection::schedule")
    )]
    Reentrant,

    #[error(transparent)]
    #[diagnostic(code(r3bl_readline::io))]
    IO(#[from] io::Error),
}

/// Rejected [`crate::LineBuffer`] mutations. These never leave the engine, they are turned
/// into a bell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Diagnostic)]
pub enum EditError {
    #[error("invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Installs the default [`miette`] report handler. Call it once at startup. A second call
/// is ignored.
pub fn setup_default_miette_global_report_handler(issues_url: &'static str) {
    miette::set_hook(Box::new(|_report| {
        let terminal_width = crossterm::terminal::size()
            .map(|(columns, _rows)| usize::from(columns))
            .unwrap_or(80);
        tracing::debug!(terminal_width, "miette report handler");
        Box::new(
            miette::MietteHandlerOpts::new()
                .width(terminal_width)
                .wrap_lines(true)
                .unicode(true)
                .context_lines(3)
                .tab_width(4)
                .with_cause_chain()
                .footer(issues_url.to_string())
                .build(),
        )
    }))
    .ok();
}

#[cfg(test)]
mod tests {
    use miette::Diagnostic;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_io_error_converts_with_code() {
        let err = ReadlineError::from(io::Error::other("no tty"));
        assert!(matches!(err, ReadlineError::IO(_)));
        assert_eq!(err.to_string(), "no tty");
        assert_eq!(
            err.code().map(|it| it.to_string()),
            Some("r3bl_readline::io".to_string())
        );
    }

    #[test]
    fn test_io_error_becomes_a_report() {
        let result: miette::Result<()> =
            Err(ReadlineError::IO(io::Error::other("no tty")).into());
        let report = result.unwrap_err();
        assert_eq!(report.to_string(), "no tty");
    }
}
