//! Transport abstraction over the half-duplex serial bus.
//!
//! The dispatcher only needs two operations: await the next chunk of raw
//! bytes (bounded by the transport's read timeout) and write raw bytes. The
//! real serial implementation lives in the binary crate; [`MockTransport`]
//! here backs the gateway tests with scripted traffic.

#![allow(async_fn_in_trait)]

use std::collections::VecDeque;

use hanguard_core::Result;

/// Byte-oriented bus access as the dispatcher sees it.
///
/// Uses native `async fn` methods (Edition 2024 RPITIT); implementations are
/// plugged in via generics, not trait objects.
pub trait BusTransport: Send {
    /// Await the next available chunk of raw bytes.
    ///
    /// Returns `Ok(None)` when the read timed out with nothing received;
    /// the dispatcher's outer loop simply re-polls. Chunk boundaries carry
    /// no meaning — framing is the reader's job.
    ///
    /// # Errors
    /// Returns an error only when the transport itself failed (closed port,
    /// dead reader thread). Such errors end the gateway loop.
    async fn read(&mut self) -> Result<Option<Vec<u8>>>;

    /// Write raw bytes to the bus.
    ///
    /// # Errors
    /// Returns an error when the transport failed; see [`read`](Self::read).
    async fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Scripted transport for tests.
///
/// Reads pop from a queue of prepared chunks (empty queue reads behave like
/// timeouts); writes are captured for inspection.
#[derive(Debug, Default)]
pub struct MockTransport {
    reads: VecDeque<Vec<u8>>,
    /// Everything the dispatcher wrote, one entry per `write` call.
    pub written: Vec<Vec<u8>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chunk to be returned by a future read.
    pub fn push_read(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.reads.push_back(bytes.into());
        self
    }

    /// Captured writes decoded as lossy UTF-8, convenient for assertions.
    #[must_use]
    pub fn written_text(&self) -> Vec<String> {
        self.written
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }
}

impl BusTransport for MockTransport {
    async fn read(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.reads.pop_front())
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.push(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reads_then_times_out() {
        let mut transport = MockTransport::new();
        transport.push_read(b"abc".as_slice());

        assert_eq!(transport.read().await.unwrap(), Some(b"abc".to_vec()));
        assert_eq!(transport.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mock_captures_writes() {
        let mut transport = MockTransport::new();
        transport.write(b"c;0014;\r\n").await.unwrap();

        assert_eq!(transport.written_text(), vec!["c;0014;\r\n".to_string()]);
    }
}
