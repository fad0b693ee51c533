//! Text frame wire format.
//!
//! Every bus message except the bare ACK/NACK control bytes travels as one
//! CRLF-terminated ASCII line:
//!
//! ```text
//! c;XXXX;<payload>\r\n
//! ```
//!
//! `XXXX` is the [`CommandWord`] as 4 uppercase hex digits; the payload is
//! free-form ASCII interpreted per command id. There is no checksum or
//! sequence numbering — reliability is best-effort and malformed frames are
//! simply dropped.

use hanguard_core::constants::{FRAME_PART_COUNT, FRAME_PREFIX, FRAME_TERMINATOR};
use hanguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::word::CommandWord;

/// One decoded text frame: command word plus raw payload.
///
/// Frames are transient; they are decoded, dispatched and dropped, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFrame {
    pub word: CommandWord,
    pub payload: String,
}

impl TextFrame {
    pub fn new(word: CommandWord, payload: impl Into<String>) -> Self {
        TextFrame {
            word,
            payload: payload.into(),
        }
    }

    /// Encode to wire bytes including the CRLF terminator.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        format!(
            "{FRAME_PREFIX}{:04X};{}{FRAME_TERMINATOR}",
            self.word.raw(),
            self.payload
        )
        .into_bytes()
    }

    /// Decode a single line, with or without its CRLF terminator.
    ///
    /// # Errors
    /// Returns `Error::MalformedFrame` if the line does not carry the `c;`
    /// marker, does not split into exactly three `;`-separated parts, or its
    /// command word is not valid hex.
    pub fn decode(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);

        if !line.starts_with(FRAME_PREFIX) {
            return Err(Error::MalformedFrame {
                reason: format!("missing {FRAME_PREFIX:?} marker"),
            });
        }

        let parts: Vec<&str> = line.split(';').collect();
        if parts.len() != FRAME_PART_COUNT {
            return Err(Error::MalformedFrame {
                reason: format!("expected {FRAME_PART_COUNT} parts, got {}", parts.len()),
            });
        }

        let raw = u16::from_str_radix(parts[1], 16).map_err(|_| Error::MalformedFrame {
            reason: format!("command word {:?} is not hex", parts[1]),
        })?;

        Ok(TextFrame {
            word: CommandWord::from_raw(raw),
            payload: parts[2].to_string(),
        })
    }
}

impl fmt::Display for TextFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "c;{};{}", self.word, self.payload)
    }
}
