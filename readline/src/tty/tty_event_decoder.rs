// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::{Display, EnumIter};

/// Terminal signals that arrive in band, as control characters in the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TtyEvent {
    /// Usually Ctrl-C.
    Intr,
    /// Usually Ctrl-D.
    Eof,
    /// Usually Ctrl-Z.
    Susp,
}

/// The code points that trigger each [`TtyEvent`]. Matches the `VINTR`, `VEOF` and
/// `VSUSP` entries of a POSIX terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChars {
    pub interrupt: char,
    pub suspend: char,
    pub eof: char,
}

impl Default for ControlChars {
    fn default() -> Self {
        Self {
            interrupt: '\u{3}',
            suspend: '\u{1a}',
            eof: '\u{4}',
        }
    }
}

impl ControlChars {
    #[must_use]
    pub fn event_for(&self, code_point: char) -> Option<TtyEvent> {
        if code_point == self.interrupt {
            Some(TtyEvent::Intr)
        } else if code_point == self.eof {
            Some(TtyEvent::Eof)
        } else if code_point == self.suspend {
            Some(TtyEvent::Susp)
        } else {
            None
        }
    }
}

/// Splits a code point stream into ordinary input and [`TtyEvent`]s.
///
/// Ordinary input that precedes a control character is flushed first, then the event is
/// reported, then scanning continues with the rest of the chunk. Every code point goes to
/// exactly one of the two callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtyEventDecoder {
    control_chars: ControlChars,
}

impl TtyEventDecoder {
    #[must_use]
    pub fn new(control_chars: ControlChars) -> Self { Self { control_chars } }

    #[must_use]
    pub fn control_chars(&self) -> ControlChars { self.control_chars }

    /// Without an `on_event` callback nothing is split out, and the whole chunk is
    /// ordinary input.
    pub fn accept(
        &self,
        data: &[char],
        mut on_read: impl FnMut(&[char]),
        on_event: Option<&mut dyn FnMut(TtyEvent, char)>,
    ) {
        let Some(on_event) = on_event else {
            if !data.is_empty() {
                on_read(data);
            }
            return;
        };

        let mut start = 0;
        for (index, &code_point) in data.iter().enumerate() {
            if let Some(event) = self.control_chars.event_for(code_point) {
                if start < index {
                    on_read(&data[start..index]);
                }
                on_event(event, code_point);
                start = index + 1;
            }
        }
        if start < data.len() {
            on_read(&data[start..]);
        }
    }
}
