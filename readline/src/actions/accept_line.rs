// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Action, ActionContext, ActionKind};

/// Whether accumulated input is complete, or continues on the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStatus {
    Complete,
    /// The input ends in an unescaped backslash.
    Escaping,
    /// A single or double quote is still open.
    Quoted,
}

impl QuoteStatus {
    /// Backslash escapes the next character, except inside single quotes.
    #[must_use]
    pub fn scan(text: &str) -> Self {
        let mut escaping = false;
        let mut quote: Option<char> = None;
        for code_point in text.chars() {
            if escaping {
                escaping = false;
                continue;
            }
            match code_point {
                '\\' if quote != Some('\'') => escaping = true,
                '"' | '\'' => match quote {
                    None => quote = Some(code_point),
                    Some(open) if open == code_point => quote = None,
                    Some(_) => {}
                },
                _ => {}
            }
        }
        if escaping {
            QuoteStatus::Escaping
        } else if quote.is_some() {
            QuoteStatus::Quoted
        } else {
            QuoteStatus::Complete
        }
    }
}

/// Enter. Accepts the line, or starts a continuation line.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptLine;

impl Action for AcceptLine {
    fn kind(&self) -> ActionKind { ActionKind::AcceptLine }

    fn apply(&mut self, cx: &mut ActionContext<'_>) {
        let interaction = &mut *cx.interaction;
        let text = interaction.buffer().text();
        interaction.new_line();
        if let Err(err) = interaction.line_mut().insert_str(&text) {
            tracing::warn!(%err, "buffer text rejected by line");
        }

        let status = QuoteStatus::scan(&interaction.line().text());
        match status {
            QuoteStatus::Escaping => {
                interaction.line_mut().delete(-1);
            }
            QuoteStatus::Quoted => {
                if let Err(err) = interaction.line_mut().insert('\n') {
                    tracing::warn!(%err, "newline rejected by line");
                }
            }
            QuoteStatus::Complete => {}
        }

        if status == QuoteStatus::Complete {
            let line = interaction.line().text();
            tracing::debug!(line = line.as_str(), "accept line");
            cx.history.push(line.clone());
            interaction.end(Some(line));
        } else {
            tracing::debug!(?status, "continuation line");
            let prompt = interaction.continuation_prompt().clone();
            interaction.set_current_prompt(prompt);
            interaction.reset_display();
        }

        cx.undo_manager.clear();
        cx.interaction.resume();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case("echo hi", QuoteStatus::Complete)]
    #[test_case("", QuoteStatus::Complete)]
    #[test_case(r"echo \", QuoteStatus::Escaping)]
    #[test_case(r"echo \\", QuoteStatus::Complete)]
    #[test_case(r#"echo "a"#, QuoteStatus::Quoted)]
    #[test_case(r#"echo "a""#, QuoteStatus::Complete)]
    #[test_case(r#"echo 'a"b"#, QuoteStatus::Quoted)]
    #[test_case(r#"echo "it's"#, QuoteStatus::Quoted)]
    #[test_case(r#"echo "it's""#, QuoteStatus::Complete)]
    #[test_case(r"echo '\'", QuoteStatus::Complete)]
    #[test_case(r#"echo \""#, QuoteStatus::Complete)]
    fn test_scan(text: &str, expected: QuoteStatus) {
        assert_eq!(QuoteStatus::scan(text), expected);
    }
}
