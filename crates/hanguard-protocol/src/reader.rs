//! Stateful frame reader for the door bus byte stream.
//!
//! The serial transport hands over raw byte chunks with no message
//! boundaries: a single read may contain a bare control byte, a partial
//! line, several concatenated frames, or garbage. The reader accumulates
//! bytes in an internal buffer and classifies them into discrete
//! [`BusEvent`]s:
//!
//! - `0x06` / `0x15` are out-of-band ACK/NACK, consumed one byte at a time;
//! - a `c;`-prefixed line is held until its terminating newline arrives and
//!   then decoded as a [`TextFrame`] (or reported as `Malformed`);
//! - any other leading byte is `Junk` — exactly one byte is dropped and
//!   scanning continues, so frames following junk in the same read survive.
//!
//! The reader never interprets command semantics; that is the dispatcher's
//! job.
//!
//! # Example
//!
//! ```
//! use hanguard_protocol::{BusEvent, FrameReader};
//!
//! let mut reader = FrameReader::new();
//! reader.feed(b"\x06c;00A2;05\r\n");
//!
//! assert!(matches!(reader.next_event(), Some(BusEvent::Ack)));
//! assert!(matches!(reader.next_event(), Some(BusEvent::Frame(_))));
//! assert!(reader.next_event().is_none());
//! ```

use bytes::BytesMut;
use std::collections::VecDeque;

use hanguard_core::constants::{ACK_BYTE, MAX_LINE_LENGTH, NACK_BYTE};

use crate::frame::TextFrame;

/// Initial buffer capacity for incoming serial data.
const INITIAL_BUFFER_CAPACITY: usize = 512;

/// Initial capacity of the event queue.
const INITIAL_EVENT_QUEUE_CAPACITY: usize = 4;

/// One classified unit of inbound bus traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// Out-of-band positive acknowledge (single `0x06` byte).
    Ack,

    /// Out-of-band negative acknowledge (single `0x15` byte).
    Nack,

    /// A complete, well-formed text frame.
    Frame(TextFrame),

    /// An unrecognized leading byte. One byte of transport noise.
    Junk(u8),

    /// A `c;`-prefixed line that failed to decode. The whole line has been
    /// discarded.
    Malformed { line: String, reason: String },
}

/// Stateful reader turning raw byte chunks into [`BusEvent`]s.
///
/// Feed it whatever the transport produced, then drain events with
/// [`next_event`](FrameReader::next_event). Partial lines stay buffered
/// across feeds.
#[derive(Debug, Default)]
pub struct FrameReader {
    /// Accumulates raw bytes until they can be classified.
    buffer: BytesMut,

    /// Classified events ready for the dispatcher.
    events: VecDeque<BusEvent>,
}

impl FrameReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            events: VecDeque::with_capacity(INITIAL_EVENT_QUEUE_CAPACITY),
        }
    }

    /// Feed a chunk of raw bytes and classify as much of the buffer as
    /// possible.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        self.scan();
    }

    /// Pop the next classified event, if any.
    pub fn next_event(&mut self) -> Option<BusEvent> {
        self.events.pop_front()
    }

    /// Number of events ready for extraction.
    #[must_use]
    pub fn events_available(&self) -> usize {
        self.events.len()
    }

    /// Number of bytes still buffered (partial line awaiting its terminator).
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Discard all buffered bytes and queued events.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.events.clear();
    }

    /// Classify buffered bytes until the buffer is empty or holds only an
    /// incomplete line.
    fn scan(&mut self) {
        loop {
            let Some(&first) = self.buffer.first() else {
                return;
            };

            match first {
                ACK_BYTE => {
                    let _ = self.buffer.split_to(1);
                    self.events.push_back(BusEvent::Ack);
                }
                NACK_BYTE => {
                    let _ = self.buffer.split_to(1);
                    self.events.push_back(BusEvent::Nack);
                }
                b'c' => {
                    if !self.take_frame_line() {
                        return;
                    }
                }
                other => {
                    let _ = self.buffer.split_to(1);
                    self.events.push_back(BusEvent::Junk(other));
                }
            }
        }
    }

    /// Handle a buffer starting with `c`.
    ///
    /// Returns `false` when more bytes are needed before anything can be
    /// classified.
    fn take_frame_line(&mut self) -> bool {
        // A lone 'c' is ambiguous until the next byte arrives.
        if self.buffer.len() < 2 {
            return false;
        }

        // 'c' not followed by ';' is ordinary junk.
        if self.buffer[1] != b';' {
            let _ = self.buffer.split_to(1);
            self.events.push_back(BusEvent::Junk(b'c'));
            return true;
        }

        let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') else {
            // Incomplete line. Cap the buffer so a sender that never
            // terminates cannot grow it without bound.
            if self.buffer.len() > MAX_LINE_LENGTH {
                let line = String::from_utf8_lossy(&self.buffer).into_owned();
                self.buffer.clear();
                self.events.push_back(BusEvent::Malformed {
                    line,
                    reason: format!("line exceeds {MAX_LINE_LENGTH} bytes without terminator"),
                });
                return true;
            }
            return false;
        };

        let raw = self.buffer.split_to(newline + 1);
        let line = String::from_utf8_lossy(&raw).into_owned();

        match TextFrame::decode(&line) {
            Ok(frame) => self.events.push_back(BusEvent::Frame(frame)),
            Err(e) => self.events.push_back(BusEvent::Malformed {
                line: line.trim_end_matches(['\r', '\n']).to_string(),
                reason: e.to_string(),
            }),
        }
        true
    }
}
