// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Streaming UTF-8 decoder. A read from the terminal can end in the middle of a multi
//! byte sequence, so the incomplete tail is kept in [`BinaryDecoder`] until the next read
//! completes it.
//!
//! Malformed input never reaches the caller as an error. Each broken sequence turns into
//! one [`REPLACEMENT_CHARACTER`].

use smallvec::SmallVec;

pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

pub const UTF8_1BYTE_MIN: u8 = 0b0000_0000;
pub const UTF8_1BYTE_MAX: u8 = 0b0111_1111;
pub const UTF8_2BYTE_MIN: u8 = 0b1100_0000;
pub const UTF8_2BYTE_MAX: u8 = 0b1101_1111;
pub const UTF8_3BYTE_MIN: u8 = 0b1110_0000;
pub const UTF8_3BYTE_MAX: u8 = 0b1110_1111;
pub const UTF8_4BYTE_MIN: u8 = 0b1111_0000;
pub const UTF8_4BYTE_MAX: u8 = 0b1111_0111;

/// Continuation bytes look like `10xx_xxxx`.
pub const UTF8_CONTINUATION_MASK: u8 = 0b1100_0000;
pub const UTF8_CONTINUATION_PATTERN: u8 = 0b1000_0000;
pub const UTF8_CONTINUATION_DATA_MASK: u8 = 0b0011_1111;

pub const UTF8_2BYTE_FIRST_MASK: u8 = 0b0001_1111;
pub const UTF8_3BYTE_FIRST_MASK: u8 = 0b0000_1111;
pub const UTF8_4BYTE_FIRST_MASK: u8 = 0b0000_0111;

#[derive(Debug, Default, Clone)]
pub struct BinaryDecoder {
    /// Bytes of a sequence that has started but is not complete yet.
    pending: SmallVec<[u8; 4]>,
}

impl BinaryDecoder {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Decode `bytes` into code points. An incomplete sequence at the end of `bytes` is
    /// held back and completed by the next call.
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<char> {
        let mut acc = Vec::with_capacity(bytes.len());
        for &byte in bytes {
            self.accept_byte(byte, &mut acc);
        }
        acc
    }

    /// Call at end of stream. A truncated sequence that is still pending becomes a single
    /// [`REPLACEMENT_CHARACTER`].
    pub fn finish(&mut self) -> Option<char> {
        if self.pending.is_empty() {
            None
        } else {
            self.pending.clear();
            Some(REPLACEMENT_CHARACTER)
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool { !self.pending.is_empty() }

    fn accept_byte(&mut self, byte: u8, acc: &mut Vec<char>) {
        if self.pending.is_empty() {
            self.start_sequence(byte, acc);
            return;
        }

        if !is_continuation(byte) {
            // The pending sequence is broken. Report it, then treat this byte as fresh.
            self.pending.clear();
            acc.push(REPLACEMENT_CHARACTER);
            self.start_sequence(byte, acc);
            return;
        }

        self.pending.push(byte);
        let Some(required_len) = get_utf8_length(self.pending[0]) else {
            self.pending.clear();
            acc.push(REPLACEMENT_CHARACTER);
            return;
        };
        if self.pending.len() == required_len {
            acc.push(decode_utf8(&self.pending).unwrap_or(REPLACEMENT_CHARACTER));
            self.pending.clear();
        }
    }

    fn start_sequence(&mut self, byte: u8, acc: &mut Vec<char>) {
        match get_utf8_length(byte) {
            Some(1) => acc.push(char::from(byte)),
            Some(_) => self.pending.push(byte),
            // Stray continuation byte, or a reserved lead byte.
            None => acc.push(REPLACEMENT_CHARACTER),
        }
    }
}

fn is_continuation(byte: u8) -> bool {
    (byte & UTF8_CONTINUATION_MASK) == UTF8_CONTINUATION_PATTERN
}

fn get_utf8_length(first_byte: u8) -> Option<usize> {
    match first_byte {
        UTF8_1BYTE_MIN..=UTF8_1BYTE_MAX => Some(1),
        UTF8_2BYTE_MIN..=UTF8_2BYTE_MAX => Some(2),
        UTF8_3BYTE_MIN..=UTF8_3BYTE_MAX => Some(3),
        UTF8_4BYTE_MIN..=UTF8_4BYTE_MAX => Some(4),
        _ => None,
    }
}

/// Decode one complete sequence. Overlong encodings, surrogates and values past
/// `U+10FFFF` are rejected.
fn decode_utf8(buffer: &[u8]) -> Option<char> {
    let first_byte = *buffer.first()?;
    let data = |index: usize| u32::from(buffer[index] & UTF8_CONTINUATION_DATA_MASK);

    let (codepoint, min) = match buffer.len() {
        2 => {
            let b1 = u32::from(first_byte & UTF8_2BYTE_FIRST_MASK);
            ((b1 << 6) | data(1), 0x80)
        }
        3 => {
            let b1 = u32::from(first_byte & UTF8_3BYTE_FIRST_MASK);
            ((b1 << 12) | (data(1) << 6) | data(2), 0x800)
        }
        4 => {
            let b1 = u32::from(first_byte & UTF8_4BYTE_FIRST_MASK);
            ((b1 << 18) | (data(1) << 12) | (data(2) << 6) | data(3), 0x1_0000)
        }
        _ => return None,
    };

    if codepoint < min {
        return None;
    }
    char::from_u32(codepoint)
}
